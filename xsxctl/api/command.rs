use crate::error::App;

/// Search tests understood by the server's constraint parser.
const MATCH_TESTS: [&str; 3] = ["is", "contains", "lessthan"];
/// Fields a free-text search term is matched against.
const TERM_FIELDS: [&str; 5] = ["album", "artist", "composer", "title", "genre"];

pub const MAX_VOLUME: u8 = 100;

/// What the dispatcher does with a reply body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// `{status, message}` shown in the message banner.
    Message,
    /// Body is dropped without looking at it.
    Ignore,
    Playback,
    Scanner,
    List,
}

/// Query string of one request, before the cache-busting token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Name/value pairs, URL-encoded in this order.
    Pairs(Vec<(String, String)>),
    /// Already-encoded fragment passed through untouched.
    Raw(String),
}

impl Query {
    fn none() -> Self {
        Query::Pairs(Vec::new())
    }

    fn one(name: &str, value: impl ToString) -> Self {
        Query::Pairs(vec![(name.to_string(), value.to_string())])
    }
}

/// Constraints for `add_matching`, `play_matching` and `list_albums`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchQuery {
    Raw(String),
    Constraints {
        pairs: Vec<(String, String)>,
        disjunct: bool,
    },
}

impl MatchQuery {
    pub fn raw(fragment: &str) -> Result<Self, App> {
        let fragment = fragment.trim().trim_start_matches('?');
        if fragment.is_empty() {
            return Err(App::InvalidInput(
                "matching needs at least one search constraint".to_string(),
            ));
        }
        Ok(MatchQuery::Raw(fragment.to_string()))
    }

    /// Matches `term` against album, artist, composer, title or genre.
    pub fn term(term: &str) -> Self {
        MatchQuery::Constraints {
            pairs: TERM_FIELDS
                .iter()
                .map(|field| (format!("{field}-contains"), term.to_string()))
                .collect(),
            disjunct: true,
        }
    }

    /// Builds from `field-test=value` specs such as `genre-is=Jazz`.
    pub fn from_specs(specs: &[String], disjunct: bool) -> Result<Self, App> {
        if specs.is_empty() {
            return Err(App::InvalidInput(
                "matching needs at least one search constraint".to_string(),
            ));
        }
        let pairs = specs
            .iter()
            .map(|spec| parse_constraint(spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MatchQuery::Constraints { pairs, disjunct })
    }

    fn query(&self) -> Query {
        match self {
            MatchQuery::Raw(fragment) => Query::Raw(fragment.clone()),
            MatchQuery::Constraints { pairs, disjunct } => {
                let mut pairs = pairs.clone();
                if *disjunct {
                    pairs.push(("disjunct".to_string(), "1".to_string()));
                }
                Query::Pairs(pairs)
            }
        }
    }
}

fn parse_constraint(spec: &str) -> Result<(String, String), App> {
    let invalid = || {
        App::InvalidInput(format!(
            "constraint `{spec}` is not field-test=value (test: is, contains, lessthan)"
        ))
    };
    let (key, value) = spec.split_once('=').ok_or_else(invalid)?;
    let (field, test) = key.split_once('-').ok_or_else(invalid)?;
    if field.is_empty() || !MATCH_TESTS.contains(&test) {
        return Err(invalid());
    }
    Ok((key.to_string(), value.to_string()))
}

/// One request against the server API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Stop,
    Play,
    Pause,
    Clear,
    Shutdown,
    FullScan,
    QuickScan,
    PlayStation { list: String, name: String },
    PlayDir(String),
    AddDir(String),
    AddFile(String),
    PlayFile(String),
    PlayAlbum(String),
    PlayIndex(usize),
    SetVolume(u8),
    AddMatching(MatchQuery),
    PlayMatching(MatchQuery),
    Status,
    ScannerStatus,
    ListDirs(Option<String>),
    ListStationLists,
    ListStationNames(String),
    ListAlbums(Option<MatchQuery>),
}

impl Command {
    /// API function name, the last path segment of the request URL.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Next => "next",
            Command::Prev => "prev",
            Command::Stop => "stop",
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Clear => "clear",
            Command::Shutdown => "shutdown",
            Command::FullScan => "full_scan",
            Command::QuickScan => "quick_scan",
            Command::PlayStation { .. } => "play_station",
            Command::PlayDir(_) => "play_dir",
            Command::AddDir(_) => "add_dir",
            Command::AddFile(_) => "add_file",
            Command::PlayFile(_) => "play_file",
            Command::PlayAlbum(_) => "play_album",
            Command::PlayIndex(_) => "play_index",
            Command::SetVolume(_) => "set_volume",
            Command::AddMatching(_) => "add_matching",
            Command::PlayMatching(_) => "play_matching",
            Command::Status => "status",
            Command::ScannerStatus => "scanner_status",
            Command::ListDirs(_) => "list_dirs",
            Command::ListStationLists => "list_station_lists",
            Command::ListStationNames(_) => "list_station_names",
            Command::ListAlbums(_) => "list_albums",
        }
    }

    pub fn query(&self) -> Query {
        match self {
            Command::PlayStation { list, name } => Query::Pairs(vec![
                ("list".to_string(), list.clone()),
                ("name".to_string(), name.clone()),
            ]),
            Command::PlayDir(dir) | Command::AddDir(dir) => Query::one("dir", dir),
            Command::ListDirs(Some(dir)) => Query::one("dir", dir),
            Command::AddFile(file) | Command::PlayFile(file) => Query::one("file", file),
            Command::PlayAlbum(album) => Query::one("album", album),
            Command::PlayIndex(index) => Query::one("index", index),
            Command::SetVolume(volume) => Query::one("volume", volume),
            Command::ListStationNames(list) => Query::one("list", list),
            Command::AddMatching(matching)
            | Command::PlayMatching(matching)
            | Command::ListAlbums(Some(matching)) => matching.query(),
            _ => Query::none(),
        }
    }

    pub fn reply_kind(&self) -> ReplyKind {
        match self {
            Command::SetVolume(_) => ReplyKind::Ignore,
            Command::Status => ReplyKind::Playback,
            Command::ScannerStatus => ReplyKind::Scanner,
            Command::ListDirs(_)
            | Command::ListStationLists
            | Command::ListStationNames(_)
            | Command::ListAlbums(_) => ReplyKind::List,
            _ => ReplyKind::Message,
        }
    }

    /// Parses one line of panel input: a verb, then its argument as the
    /// rest of the line. `play_station` takes the list name as its first
    /// word and the station name as the remainder.
    pub fn parse_line(line: &str) -> Result<Self, App> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.replace('-', "_");
        let arg = |what: &str| -> Result<String, App> {
            if rest.is_empty() {
                Err(App::InvalidInput(format!("`{verb}` needs {what}")))
            } else {
                Ok(rest.to_string())
            }
        };
        let command = match verb.as_str() {
            "next" => Command::Next,
            "prev" | "previous" => Command::Prev,
            "stop" => Command::Stop,
            "play" => Command::Play,
            "pause" => Command::Pause,
            "clear" => Command::Clear,
            "shutdown" => Command::Shutdown,
            "full_scan" => Command::FullScan,
            "quick_scan" => Command::QuickScan,
            "status" => Command::Status,
            "scanner_status" | "scanner" => Command::ScannerStatus,
            "play_dir" => Command::PlayDir(arg("a directory")?),
            "add_dir" => Command::AddDir(arg("a directory")?),
            "add_file" => Command::AddFile(arg("a file")?),
            "play_file" => Command::PlayFile(arg("a file")?),
            "play_album" => Command::PlayAlbum(arg("an album")?),
            "play_index" => Command::PlayIndex(parse_number(&arg("an index")?)?),
            "set_volume" | "volume" => Command::SetVolume(parse_volume(&arg("a volume")?)?),
            "add_matching" => Command::AddMatching(MatchQuery::raw(rest)?),
            "play_matching" => Command::PlayMatching(MatchQuery::raw(rest)?),
            "play_station" => {
                let station = arg("a station list and a station name")?;
                let (list, name) = station
                    .split_once(char::is_whitespace)
                    .map(|(list, name)| (list.to_string(), name.trim().to_string()))
                    .ok_or_else(|| {
                        App::InvalidInput("`play_station` needs <list> <name>".to_string())
                    })?;
                Command::PlayStation { list, name }
            }
            "" => return Err(App::InvalidInput("empty command".to_string())),
            other => return Err(App::InvalidInput(format!("unknown command `{other}`"))),
        };
        Ok(command)
    }
}

fn parse_number(text: &str) -> Result<usize, App> {
    text.parse()
        .map_err(|_| App::InvalidInput(format!("`{text}` is not a playlist index")))
}

pub fn parse_volume(text: &str) -> Result<u8, App> {
    match text.parse::<u8>() {
        Ok(volume) if volume <= MAX_VOLUME => Ok(volume),
        _ => Err(App::InvalidInput(format!(
            "volume must be 0-{MAX_VOLUME}, got `{text}`"
        ))),
    }
}
