use crate::api::command::{Command, Query, ReplyKind};
use crate::api::reply::{
    CommandReply, Envelope, ListReply, PlaybackStatus, ScannerStatus,
};
use crate::api::transport::{HttpReply, Transport};
use crate::error::App;
use log::debug;
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Decoded reply, shaped by the command's reply kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(CommandReply),
    Ignored,
    Playback(PlaybackStatus),
    Scanner(ScannerStatus),
    List(Vec<String>),
}

/// A finished request, queued back to whoever owns the display.
#[derive(Debug)]
pub struct Completion {
    pub command: Command,
    pub result: Result<Reply, App>,
}

pub struct Dispatcher<T> {
    transport: Arc<T>,
    root: Url,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            root: self.root.clone(),
        }
    }
}

impl<T: Transport> Dispatcher<T> {
    /// `root` is the API base, e.g. `http://host:30000/api/`.
    pub fn new(transport: Arc<T>, root: Url) -> Self {
        Self { transport, root }
    }

    /// Request URL for `command`; `token` defeats caches between the panel
    /// and the server.
    pub fn url(&self, command: &Command, token: u64) -> Result<Url, App> {
        let mut url = self
            .root
            .join(command.name())
            .map_err(|e| App::InvalidInput(format!("{}: {e}", command.name())))?;
        if let Query::Raw(fragment) = command.query() {
            url.set_query(Some(&fragment));
        }
        {
            let mut query = url.query_pairs_mut();
            if let Query::Pairs(pairs) = command.query() {
                for (name, value) in &pairs {
                    query.append_pair(name, value);
                }
            }
            query.append_pair("random", &token.to_string());
        }
        Ok(url)
    }

    pub async fn send(&self, command: &Command) -> Result<Reply, App> {
        let url = self.url(command, rand::random())?;
        let reply = self.transport.get(url).await?;
        decode(command.reply_kind(), &reply)
    }

    /// Runs `command` on its own task and reports on `done`; the caller is
    /// never blocked by a slow server.
    pub fn spawn(&self, command: Command, done: mpsc::Sender<Completion>) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let result = dispatcher.send(&command).await;
            if done.send(Completion { command, result }).await.is_err() {
                debug!("Completion dropped, nobody is listening");
            }
        });
    }
}

fn decode(kind: ReplyKind, reply: &HttpReply) -> Result<Reply, App> {
    if kind == ReplyKind::Ignore {
        return Ok(Reply::Ignored);
    }
    let envelope = match Envelope::parse(&reply.body) {
        Ok(envelope) => envelope,
        // An error page from something in front of the server.
        Err(_) if !(200..300).contains(&reply.code) => return Err(App::HttpStatus(reply.code)),
        Err(e) => return Err(e),
    };
    Ok(match kind {
        ReplyKind::Message => Reply::Message(envelope.into_command_reply()),
        ReplyKind::Playback => Reply::Playback(envelope.into_payload()?),
        ReplyKind::Scanner => Reply::Scanner(envelope.into_payload()?),
        ReplyKind::List => Reply::List(envelope.into_payload::<ListReply>()?.list),
        ReplyKind::Ignore => Reply::Ignored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::command::MatchQuery;
    use crate::api::reply::TransportStatus;
    use crate::api::transport::fake::FakeServer;
    use crate::error::Class;

    fn dispatcher(server: &Arc<FakeServer>) -> Dispatcher<FakeServer> {
        Dispatcher::new(
            Arc::clone(server),
            Url::parse("http://media.local:30000/api/").unwrap(),
        )
    }

    #[test]
    fn urls_carry_encoded_parameters_then_token() {
        let dispatcher = dispatcher(&FakeServer::new());
        let cases = [
            (Command::Next, "http://media.local:30000/api/next?random=42"),
            (
                Command::PlayStation {
                    list: "bbc".into(),
                    name: "Radio 3".into(),
                },
                "http://media.local:30000/api/play_station?list=bbc&name=Radio+3&random=42",
            ),
            (
                Command::AddDir("/music/Rock & Roll".into()),
                "http://media.local:30000/api/add_dir?dir=%2Fmusic%2FRock+%26+Roll&random=42",
            ),
            (
                Command::PlayIndex(4),
                "http://media.local:30000/api/play_index?index=4&random=42",
            ),
            (
                Command::SetVolume(75),
                "http://media.local:30000/api/set_volume?volume=75&random=42",
            ),
            (
                Command::AddMatching(MatchQuery::Raw("artist-is=Bach&disjunct=1".into())),
                "http://media.local:30000/api/add_matching?artist-is=Bach&disjunct=1&random=42",
            ),
        ];
        for (command, expected) in cases {
            assert_eq!(dispatcher.url(&command, 42).unwrap().as_str(), expected);
        }
    }

    #[test]
    fn tokens_change_between_requests() {
        let dispatcher = dispatcher(&FakeServer::new());
        let first = dispatcher.url(&Command::Play, rand::random()).unwrap();
        let second = dispatcher.url(&Command::Play, rand::random()).unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn decodes_each_reply_kind() {
        let server = FakeServer::new();
        server.reply("pause", r#"{ "status": 0, "message": "OK" }"#);
        server.reply(
            "status",
            r#"{"status":0,"transport_status":2,"pos":5,"len":9,"title":"t",
                "album":"a","playlist_index":0,"playlist_length":1}"#,
        );
        server.reply("list_station_lists", r#"{"status": 0, "list": ["bbc","jazz"]}"#);
        let dispatcher = dispatcher(&server);

        assert_eq!(
            dispatcher.send(&Command::Pause).await.unwrap(),
            Reply::Message(CommandReply {
                status: 0,
                message: "OK".into()
            })
        );
        match dispatcher.send(&Command::Status).await.unwrap() {
            Reply::Playback(status) => {
                assert_eq!(status.transport_status, TransportStatus::Paused);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            dispatcher.send(&Command::ListStationLists).await.unwrap(),
            Reply::List(vec!["bbc".into(), "jazz".into()])
        );
        assert_eq!(
            dispatcher.send(&Command::SetVolume(3)).await.unwrap(),
            Reply::Ignored
        );
        assert_eq!(server.count("set_volume"), 1);
    }

    #[tokio::test]
    async fn refusals_and_failures_are_classified() {
        let server = FakeServer::new();
        server.reply_with(
            "play_dir",
            400,
            r#"{ "status": 101, "message": "Bad or missing API argument" }"#,
        );
        server.reply_with("status", 502, "<html>Bad Gateway</html>");
        server.reply("scanner_status", "not json");
        let dispatcher = dispatcher(&server);

        match dispatcher.send(&Command::PlayDir(String::new())).await.unwrap() {
            Reply::Message(reply) => assert_eq!(reply.status, 101),
            other => panic!("unexpected {other:?}"),
        }
        let gateway = dispatcher.send(&Command::Status).await.unwrap_err();
        assert_eq!(gateway.class(), Class::Network);
        let garbage = dispatcher.send(&Command::ScannerStatus).await.unwrap_err();
        assert_eq!(garbage.class(), Class::Parse);
        let unknown = dispatcher.send(&Command::ListStationLists).await.unwrap_err();
        assert_eq!(unknown.class(), Class::Application);
    }

    #[tokio::test]
    async fn spawned_requests_report_back() {
        let server = FakeServer::new();
        server.reply("stop", r#"{ "status": 0, "message": "OK" }"#);
        let (done, mut completions) = mpsc::channel(4);
        dispatcher(&server).spawn(Command::Stop, done);
        let completion = completions.recv().await.unwrap();
        assert_eq!(completion.command, Command::Stop);
        assert!(completion.result.is_ok());
    }
}
