use flexi_logger::FlexiLoggerError;
use reqwest::Error as ReqwestError;
use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum App {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ReqwestError),
    #[error("Server answered HTTP {0} without an API reply")]
    HttpStatus(u16),
    #[error("Malformed JSON reply: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected reply: {0}")]
    Schema(String),
    #[error("Server error {code}: {message}")]
    Server { code: i64, message: String },
    #[error("I/O operation failed: {0}")]
    Io(#[from] IoError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Config parsing error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
    #[error("Logger initialization error: {0}")]
    Logger(#[from] FlexiLoggerError),
}

/// How a failure relates to the server conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Network,
    Parse,
    Application,
    Local,
}

impl App {
    pub fn class(&self) -> Class {
        match self {
            App::HttpRequest(_) | App::HttpStatus(_) => Class::Network,
            App::Json(_) | App::Schema(_) => Class::Parse,
            App::Server { .. } => Class::Application,
            App::Io(_)
            | App::InvalidInput(_)
            | App::Config(_)
            | App::EnvVar(_)
            | App::Logger(_) => Class::Local,
        }
    }
}
