use crate::error::App;
use log::debug;
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const DEFAULT_SERVER: &str = "http://localhost:30000";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: String,
    pub api_base: String,
    pub playback_poll_ms: u64,
    pub scanner_poll_ms: u64,
    pub message_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            api_base: "/api/".to_string(),
            playback_poll_ms: 5000,
            scanner_poll_ms: 2000,
            message_timeout_ms: 3000,
            request_timeout_ms: 10_000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf, App> {
        let home_dir = std::env::var("HOME")?;
        Ok(PathBuf::from(format!("{home_dir}/.config/xsxctl")))
    }

    /// Reads `path`, or `$HOME/.config/xsxctl/config.toml` when no path is
    /// given. Only the default location is allowed to be missing, and so is
    /// `$HOME` itself.
    pub async fn load(path: Option<&Path>) -> Result<Self, App> {
        match path {
            Some(path) => Self::read(path).await,
            None => Self::load_default(Self::config_dir()).await,
        }
    }

    async fn load_default(dir: Result<PathBuf, App>) -> Result<Self, App> {
        let path = match dir {
            Ok(dir) => dir.join("config.toml"),
            Err(App::EnvVar(e)) => {
                debug!("No config directory ({e}), using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::read(&path).await
    }

    async fn read(path: &Path) -> Result<Self, App> {
        let content = fs::read_to_string(path).await?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, App> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), App> {
        let intervals = [
            ("playback_poll_ms", self.playback_poll_ms),
            ("scanner_poll_ms", self.scanner_poll_ms),
            ("message_timeout_ms", self.message_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ];
        for (key, value) in intervals {
            if value == 0 {
                return Err(App::InvalidInput(format!("{key} must be positive")));
            }
        }
        self.api_root().map(|_| ())
    }

    /// Absolute URL every API function name is resolved against.
    pub fn api_root(&self) -> Result<Url, App> {
        let server = Url::parse(&self.server)
            .map_err(|e| App::InvalidInput(format!("server `{}`: {e}", self.server)))?;
        if !matches!(server.scheme(), "http" | "https") || server.host_str().is_none() {
            return Err(App::InvalidInput(format!(
                "server `{}` is not an http(s) address",
                self.server
            )));
        }
        let mut base = self.api_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        server
            .join(&base)
            .map_err(|e| App::InvalidInput(format!("api_base `{}`: {e}", self.api_base)))
    }

    pub fn playback_poll(&self) -> Duration {
        Duration::from_millis(self.playback_poll_ms)
    }

    pub fn scanner_poll(&self) -> Duration {
        Duration::from_millis(self.scanner_poll_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_browser_client() {
        let config = Config::default();
        assert_eq!(config.playback_poll(), Duration::from_millis(5000));
        assert_eq!(config.scanner_poll(), Duration::from_millis(2000));
        assert_eq!(config.message_timeout(), Duration::from_millis(3000));
        assert_eq!(
            config.api_root().unwrap().as_str(),
            "http://localhost:30000/api/"
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            "server = \"http://media.local:8080\"\napi_base = \"/xsx/api\"\nscanner_poll_ms = 500\n",
        )
        .unwrap();
        assert_eq!(config.scanner_poll_ms, 500);
        assert_eq!(config.playback_poll_ms, 5000);
        assert_eq!(
            config.api_root().unwrap().as_str(),
            "http://media.local:8080/xsx/api/"
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_toml("playback_poll_ms = 0"),
            Err(App::InvalidInput(_))
        ));
        assert!(matches!(
            Config::from_toml("server = \"ftp://media.local\""),
            Err(App::InvalidInput(_))
        ));
        assert!(matches!(
            Config::from_toml("poll = 3"),
            Err(App::Config(_))
        ));
    }

    #[tokio::test]
    async fn explicit_missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/xsxctl/config.toml");
        assert!(matches!(Config::load(Some(missing)).await, Err(App::Io(_))));
    }

    #[tokio::test]
    async fn missing_home_falls_back_to_defaults() {
        let config = Config::load_default(Err(App::EnvVar(std::env::VarError::NotPresent)))
            .await
            .unwrap();
        assert_eq!(config, Config::default());

        let config = Config::load_default(Ok(PathBuf::from("/nonexistent/xsxctl")))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }
}
