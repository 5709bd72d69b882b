//! Host configuration from flags, environment and an optional `.env` file.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use todo_core::UserId;

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-host", about = "Serve the todo list UI against a remote todo API")]
pub struct Config {
    /// Base URL of the todo API.
    #[arg(long, env = "TODO_API_URL", default_value = "http://127.0.0.1:3000")]
    pub api_url: String,

    /// Owner whose todos are shown. Without it only a warning screen is served.
    #[arg(long, env = "TODO_USER_ID")]
    pub user_id: Option<UserId>,

    #[arg(long, env = "TODO_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    #[arg(long, env = "TODO_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Config {
    /// Parse the process arguments after loading `.env`, if present.
    pub fn load() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env loaded");
        }
        Self::parse()
    }

    /// The configured owner, if it is usable.
    pub fn owner(&self) -> Option<UserId> {
        self.user_id.filter(|id| *id > 0)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_apply() {
        let config = Config::try_parse_from(["todo-host", "--user-id", "5"]).unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:3000");
        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.owner(), Some(5));
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    fn non_positive_owner_is_unusable(#[case] raw: &str) {
        let flag = format!("--user-id={raw}");
        let config = Config::try_parse_from(["todo-host", flag.as_str()]).unwrap();
        assert_eq!(config.owner(), None);
    }

    #[test]
    fn bad_listen_address_is_rejected() {
        assert!(Config::try_parse_from(["todo-host", "--listen", "nowhere"]).is_err());
    }
}
