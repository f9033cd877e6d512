use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailConfig {
    /// Mail relay endpoint that accepts JSON messages.
    #[serde(default)]
    pub relay_url: Option<String>,
    /// Bearer token for the relay. Supply through the environment.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Log reminders instead of sending them.
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReminderConfig {
    /// Sweeps remind records with at most this many days remaining.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

fn default_storage_path() -> String {
    "data/renewals.json".to_string()
}

fn default_from() -> String {
    "Service Renewal Center <noreply@example.com>".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_horizon_days() -> i64 {
    crate::renewal::urgency::FLAG_HORIZON_DAYS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            api_key: None,
            from: default_from(),
            timeout_secs: default_timeout_secs(),
            dry_run: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
        }
    }
}

impl Config {
    /// Load `path` (optional), then `RENEWAL__SECTION__KEY` environment
    /// overrides. A `.env` file is read first if present.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("RENEWAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// The default configuration as TOML, for `init`.
    pub fn default_toml() -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let config = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.mail.timeout_secs, 10);
        assert_eq!(config.reminders.horizon_days, 30);
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[storage]
backend = "sqlite"
path = "renewals.db"

[mail]
relay_url = "https://mail.internal/send"
dry_run = true

[reminders]
horizon_days = 15
"#,
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path, "renewals.db");
        assert_eq!(config.mail.relay_url.as_deref(), Some("https://mail.internal/send"));
        assert!(config.mail.dry_run);
        assert_eq!(config.reminders.horizon_days, 15);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn default_toml_round_trips_without_secrets() {
        let rendered = Config::default_toml().unwrap();
        assert!(!rendered.contains("api_key"));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.storage.path, "data/renewals.json");
    }
}
