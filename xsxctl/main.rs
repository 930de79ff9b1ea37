mod api;
mod config;
mod error;
mod panel;

use api::reply::{PlaybackStatus, TransportStatus};
use api::{Command, Dispatcher, HttpTransport, MatchQuery, Reply};
use clap::{Args, Parser, Subcommand};
use config::Config;
use error::App;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use log::error;
use panel::render::{render_playback, render_scanner};
use panel::screen::Screen;
use panel::slots::{Board, Slot};
use panel::Panel;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{mpsc, watch};

type StdResult<T> = std::result::Result<T, App>;

#[derive(Parser)]
#[command(
    name = "xsxctl",
    about = "Control an xine-server-x media server over its HTTP API.",
    version
)]
struct Cli {
    #[arg(
        short = 's',
        long = "server",
        global = true,
        help = "Server address, e.g. http://localhost:30000"
    )]
    server: Option<String>,
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        help = "Config file (default ~/.config/xsxctl/config.toml)"
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Resume playback")]
    Play,

    #[command(about = "Pause playback")]
    Pause,

    #[command(about = "Stop playback")]
    Stop,

    #[command(about = "Play the next playlist entry")]
    Next,

    #[command(about = "Play the previous playlist entry")]
    Prev,

    #[command(about = "Empty the playlist")]
    Clear,

    #[command(about = "Shut the server down")]
    Shutdown,

    #[command(about = "Rebuild the media index from scratch")]
    FullScan,

    #[command(about = "Index files changed since the last scan")]
    QuickScan,

    #[command(about = "Play a radio station from a station list")]
    PlayStation(StationCommand),

    #[command(about = "Replace the playlist with a directory and play it")]
    PlayDir(DirCommand),

    #[command(about = "Append a directory to the playlist")]
    AddDir(DirCommand),

    #[command(about = "Append a file to the playlist")]
    AddFile(FileCommand),

    #[command(about = "Replace the playlist with a file and play it")]
    PlayFile(FileCommand),

    #[command(about = "Play an album from the index")]
    PlayAlbum(AlbumCommand),

    #[command(about = "Jump to a playlist entry")]
    PlayIndex(IndexCommand),

    #[command(about = "Set the output volume")]
    Volume(VolumeCommand),

    #[command(about = "Append indexed tracks matching constraints")]
    AddMatching(MatchCommand),

    #[command(about = "Play indexed tracks matching constraints")]
    PlayMatching(MatchCommand),

    #[command(about = "Show playback status")]
    Status,

    #[command(about = "Show media scanner progress")]
    Scanner,

    #[command(about = "List directories under the media root")]
    ListDirs(ListDirsCommand),

    #[command(about = "List radio station lists")]
    StationLists,

    #[command(about = "List the stations in a station list")]
    Stations(StationsCommand),

    #[command(about = "List indexed albums")]
    Albums(MatchCommand),

    #[command(about = "Live status panel; type commands such as `next` or `volume 40`")]
    Panel,
}

#[derive(Parser)]
struct StationCommand {
    #[arg(help = "Station list name")]
    list: String,
    #[arg(help = "Station name")]
    name: String,
}

#[derive(Parser)]
struct DirCommand {
    #[arg(help = "Directory, relative to the server's media root")]
    dir: String,
}

#[derive(Parser)]
struct FileCommand {
    #[arg(help = "Audio file, relative to the server's media root")]
    file: String,
}

#[derive(Parser)]
struct AlbumCommand {
    #[arg(help = "Album name as indexed")]
    album: String,
}

#[derive(Parser)]
struct IndexCommand {
    #[arg(help = "Playlist position, counting from 0")]
    index: usize,
}

#[derive(Parser)]
struct VolumeCommand {
    #[arg(help = "Volume, 0-100", value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: u8,
}

#[derive(Parser)]
struct ListDirsCommand {
    #[arg(help = "Directory to list (default: media root)")]
    dir: Option<String>,
}

#[derive(Parser)]
struct StationsCommand {
    #[arg(help = "Station list name")]
    list: String,
}

#[derive(Args)]
struct MatchCommand {
    #[arg(
        short = 't',
        long = "term",
        conflicts_with_all = ["constraints", "raw"],
        help = "Match album, artist, composer, title or genre containing TERM"
    )]
    term: Option<String>,
    #[arg(
        short = 'w',
        long = "where",
        value_name = "FIELD-TEST=VALUE",
        help = "Constraint such as genre-is=Jazz (tests: is, contains, lessthan)"
    )]
    constraints: Vec<String>,
    #[arg(short = 'a', long = "any", help = "Match any constraint instead of all")]
    any: bool,
    #[arg(
        long = "raw",
        conflicts_with = "constraints",
        help = "Query string passed to the server as is"
    )]
    raw: Option<String>,
}

impl MatchCommand {
    fn query(self) -> StdResult<Option<MatchQuery>> {
        if let Some(raw) = self.raw {
            return MatchQuery::raw(&raw).map(Some);
        }
        if let Some(term) = self.term {
            return Ok(Some(MatchQuery::term(&term)));
        }
        if self.constraints.is_empty() {
            return Ok(None);
        }
        MatchQuery::from_specs(&self.constraints, self.any).map(Some)
    }

    fn required_query(self) -> StdResult<MatchQuery> {
        self.query()?.ok_or_else(|| {
            App::InvalidInput("give --term, --where or --raw to select tracks".to_string())
        })
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("xsxctl: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> StdResult<()> {
    let mut config = Config::load(cli.config.as_deref()).await?;
    if let Some(server) = cli.server {
        config.server = server;
    }
    let transport = Arc::new(HttpTransport::new(config.request_timeout())?);
    let dispatcher = Dispatcher::new(transport, config.api_root()?);

    if let Commands::Panel = cli.command {
        let _logger = start_file_logger(&config).await?;
        run_panel(&dispatcher, &config).await
    } else {
        let _logger = Logger::try_with_env_or_str("warn")?
            .log_to_stderr()
            .start()?;
        let request = to_request(cli.command)?;
        handle_command(&request, &dispatcher).await
    }
}

async fn start_file_logger(config: &Config) -> StdResult<LoggerHandle> {
    let log_dir = Config::config_dir()?.join("logs");
    fs::create_dir_all(&log_dir).await?;
    let handle = Logger::try_with_env_or_str(&config.log_level)?
        .log_to_file(FileSpec::default().directory(&log_dir))
        .rotate(
            Criterion::Size(1_000_000),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(3),
        )
        .duplicate_to_stderr(Duplicate::None)
        .start()?;
    Ok(handle)
}

async fn run_panel(dispatcher: &Dispatcher<HttpTransport>, config: &Config) -> StdResult<()> {
    let (stop_tx, stop) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                error!("Failed to listen for ctrl-c: {}", e);
                stop_tx.closed().await;
            }
        }
    });

    let mut panel = Panel::new(Screen::enter()?, config.message_timeout());
    let (inputs_tx, inputs) = mpsc::channel(32);
    panel::input::forward_keys(inputs_tx);
    let result = panel::run(&mut panel, dispatcher, config, inputs, stop).await;
    panel.into_surface().leave()?;
    result
}

fn to_request(command: Commands) -> StdResult<Command> {
    Ok(match command {
        Commands::Play => Command::Play,
        Commands::Pause => Command::Pause,
        Commands::Stop => Command::Stop,
        Commands::Next => Command::Next,
        Commands::Prev => Command::Prev,
        Commands::Clear => Command::Clear,
        Commands::Shutdown => Command::Shutdown,
        Commands::FullScan => Command::FullScan,
        Commands::QuickScan => Command::QuickScan,
        Commands::PlayStation(cmd) => Command::PlayStation {
            list: cmd.list,
            name: cmd.name,
        },
        Commands::PlayDir(cmd) => Command::PlayDir(cmd.dir),
        Commands::AddDir(cmd) => Command::AddDir(cmd.dir),
        Commands::AddFile(cmd) => Command::AddFile(cmd.file),
        Commands::PlayFile(cmd) => Command::PlayFile(cmd.file),
        Commands::PlayAlbum(cmd) => Command::PlayAlbum(cmd.album),
        Commands::PlayIndex(cmd) => Command::PlayIndex(cmd.index),
        Commands::Volume(cmd) => Command::SetVolume(cmd.volume),
        Commands::AddMatching(cmd) => Command::AddMatching(cmd.required_query()?),
        Commands::PlayMatching(cmd) => Command::PlayMatching(cmd.required_query()?),
        Commands::Status => Command::Status,
        Commands::Scanner => Command::ScannerStatus,
        Commands::ListDirs(cmd) => Command::ListDirs(cmd.dir),
        Commands::StationLists => Command::ListStationLists,
        Commands::Stations(cmd) => Command::ListStationNames(cmd.list),
        Commands::Albums(cmd) => Command::ListAlbums(cmd.query()?),
        Commands::Panel => {
            return Err(App::InvalidInput(
                "the panel is not a single request".to_string(),
            ))
        }
    })
}

async fn handle_command(request: &Command, dispatcher: &Dispatcher<HttpTransport>) -> StdResult<()> {
    match dispatcher.send(request).await? {
        Reply::Message(reply) => println!("{}", reply.into_result()?),
        Reply::Ignored => println!("{} sent", request.name()),
        Reply::Playback(status) => {
            for line in playback_lines(&status) {
                println!("{line}");
            }
        }
        Reply::Scanner(status) => {
            let mut board = Board::default();
            render_scanner(&status, &mut board);
            println!("{}", board.get(Slot::ScannerProgress));
        }
        Reply::List(entries) => {
            if entries.is_empty() {
                eprintln!("Nothing found");
            }
            for entry in entries {
                println!("{entry}");
            }
        }
    }
    Ok(())
}

fn playback_lines(status: &PlaybackStatus) -> Vec<String> {
    let mut board = Board::default();
    render_playback(status, &mut board);
    let mut lines = vec![
        format!("Status:   {}", board.get(Slot::TransportStatus)),
        format!(
            "Position: {} / {}",
            board.get(Slot::StreamPos),
            board.get(Slot::StreamLen)
        ),
        format!(
            "Track:    {} of {}",
            board.get(Slot::PlaylistIndex),
            board.get(Slot::PlaylistLength)
        ),
        format!("Title:    {}", board.get(Slot::Title)),
        format!("Album:    {}", board.get(Slot::Album)),
    ];
    let extras = [
        ("Artist:  ", &status.artist),
        ("Composer:", &status.composer),
        ("Genre:   ", &status.genre),
    ];
    for (label, value) in extras {
        if !value.is_empty() {
            lines.push(format!("{label} {value}"));
        }
    }
    if status.bitrate > 0 {
        lines.push(format!("Bitrate:  {} kbit/s", status.bitrate / 1000));
    }
    if status.transport_status != TransportStatus::Stopped {
        let seekable = if status.seekable { "yes" } else { "no" };
        lines.push(format!("Seekable: {seekable}"));
    }
    lines
}
