use crate::error::App;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Playback engine state, wire values 0 to 3.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "i64")]
pub enum TransportStatus {
    Stopped,
    Playing,
    Paused,
    Buffering,
}

impl TryFrom<i64> for TransportStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransportStatus::Stopped),
            1 => Ok(TransportStatus::Playing),
            2 => Ok(TransportStatus::Paused),
            3 => Ok(TransportStatus::Buffering),
            other => Err(format!("unknown transport status {other}")),
        }
    }
}

impl TransportStatus {
    pub fn label(self) -> &'static str {
        match self {
            TransportStatus::Stopped => "stopped",
            TransportStatus::Playing => "playing",
            TransportStatus::Paused => "paused",
            TransportStatus::Buffering => "buffering",
        }
    }
}

/// Numbers are C `int`s on the server side; anything wider is a schema error.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub transport_status: TransportStatus,
    pub pos: i32,
    pub len: i32,
    pub title: String,
    pub album: String,
    pub playlist_index: i32,
    pub playlist_length: i32,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub composer: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub bitrate: i32,
    #[serde(default, deserialize_with = "flag")]
    pub seekable: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScannerStatus {
    #[serde(deserialize_with = "flag")]
    pub running: bool,
    #[serde(default)]
    pub scanned: u64,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub modified: u64,
    #[serde(default)]
    pub deleted: u64,
    #[serde(default)]
    pub extracted: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListReply {
    pub list: Vec<String>,
}

/// Reply of a command endpoint. Carries refusals too, since their message
/// is what the user gets to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub status: i64,
    pub message: String,
}

impl CommandReply {
    pub fn is_ok(&self) -> bool {
        self.status == 0
    }

    pub fn into_result(self) -> Result<String, App> {
        if self.is_ok() {
            Ok(self.message)
        } else {
            Err(App::Server {
                code: self.status,
                message: self.message,
            })
        }
    }
}

// The server writes booleans as 0/1.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

/// A parsed reply body with its `status` split off.
#[derive(Debug)]
pub struct Envelope {
    pub status: i64,
    message: Option<String>,
    body: Value,
}

impl Envelope {
    pub fn parse(body: &str) -> Result<Self, App> {
        let body: Value = serde_json::from_str(body)?;
        if !body.is_object() {
            return Err(App::Schema("reply is not a JSON object".to_string()));
        }
        let status = match body.get("status") {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| App::Schema(format!("`status` {n} is not an integer")))?,
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| App::Schema(format!("`status` \"{s}\" is not an integer")))?,
            _ => return Err(App::Schema("reply has no `status` field".to_string())),
        };
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            status,
            message,
            body,
        })
    }

    fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| describe(self.status).to_string())
    }

    pub fn into_command_reply(self) -> CommandReply {
        CommandReply {
            status: self.status,
            message: self.message(),
        }
    }

    /// Deserializes the payload of a successful reply.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, App> {
        if self.status != 0 {
            return Err(App::Server {
                code: self.status,
                message: self.message(),
            });
        }
        serde_json::from_value(self.body).map_err(|e| App::Schema(e.to_string()))
    }
}

/// Text for a server error code, used when a reply carries no message.
pub fn describe(code: i64) -> &'static str {
    match code {
        0 => "OK",
        1 => "Internal error: bad syntax in communication with xine-server",
        2 => "Unspecified problem with audio playback",
        3 => "Attempt to play a non-existent local file",
        4 => "Internal error: bad command in communication with xine-server",
        5 => "Internal error: bad argument in communication with xine-server",
        6 => "Playlist index out of range",
        7 => "Playlist is empty",
        8 => "Can't play beyond the end of the playlist",
        9 => "Can't play beyond the start of the playlist",
        10 => "Can't communicate with xine-server",
        11 => "Unexpected response from xine-server",
        100 => "Unknown API function name",
        101 => "Bad or missing API argument",
        102 => "Can't list directory contents",
        103 => "No playable audio files in directory",
        104 => "Can't open station list",
        105 => "Can't find station name in station list",
        106 => "Can't interpret the scanner status file",
        107 => "Operation requires an index file, but none was specified",
        108 => "General database error (no more information available)",
        _ => "Unknown error",
    }
}
