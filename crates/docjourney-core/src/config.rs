//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATABASE_PATH: &str = "data/ai_documentation.db";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SIMLI_API_URL: &str = "https://api.simli.ai/textToVideoStream";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Paths to all DocJourney on-disk state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// SQLite database file holding the script cache.
    pub database: PathBuf,
    /// Static-asset root, mounted at `/static`.
    pub static_dir: PathBuf,
    /// Generated avatar videos (`<static>/videos`).
    pub videos: PathBuf,
}

impl DataPaths {
    /// Build data paths. Creates directories if needed.
    pub fn new(database: impl AsRef<Path>, static_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let static_dir = static_dir.as_ref().to_path_buf();
        let paths = Self {
            database: database.as_ref().to_path_buf(),
            videos: static_dir.join("videos"),
            static_dir,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.database.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::create_dir_all(&self.videos)?;
        Ok(())
    }
}

/// Avatar-provider settings, including the readiness poll that waits for
/// the provider to finalize a rendered video.
#[derive(Clone, Serialize, Deserialize)]
pub struct AvatarSettings {
    #[serde(skip_serializing)]
    pub simli_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub elevenlabs_api_key: Option<String>,
    pub api_url: String,
    /// Maximum number of download probes.
    pub poll_attempts: u32,
    /// Delay before the second probe; doubles on each retry.
    pub poll_interval: Duration,
    /// Upper bound for a single backoff delay.
    pub poll_max_interval: Duration,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            simli_api_key: None,
            elevenlabs_api_key: None,
            api_url: DEFAULT_SIMLI_API_URL.into(),
            poll_attempts: 6,
            poll_interval: Duration::from_millis(1000),
            poll_max_interval: Duration::from_secs(8),
        }
    }
}

/// Top-level DocJourney configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DocJourneyConfig {
    pub host: String,
    pub port: u16,
    pub data_paths: DataPaths,
    /// The single origin allowed to call the API cross-origin.
    pub frontend_origin: String,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    /// Timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,
    pub avatar: AvatarSettings,
}

impl DocJourneyConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> std::io::Result<Self> {
        let port = env_parse("PORT").unwrap_or(DEFAULT_PORT);
        let host = env_string("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let database = env_string("DATABASE_URL")
            .map(|url| database_path_from_url(&url))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
        let static_dir = env_string("DOCJOURNEY_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));
        let data_paths = DataPaths::new(database, static_dir)?;

        let defaults = AvatarSettings::default();
        let avatar = AvatarSettings {
            simli_api_key: env_string("SIMLIAI_API_KEY"),
            elevenlabs_api_key: env_string("ELEVENLABS_API_KEY"),
            api_url: env_string("SIMLI_API_URL").unwrap_or(defaults.api_url),
            poll_attempts: env_parse("AVATAR_POLL_ATTEMPTS").unwrap_or(defaults.poll_attempts),
            poll_interval: env_parse("AVATAR_POLL_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            poll_max_interval: defaults.poll_max_interval,
        };

        Ok(Self {
            host,
            port,
            data_paths,
            frontend_origin: env_string("FRONTEND_ORIGIN")
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.into()),
            openai_api_key: env_string("OPENAI_API_KEY"),
            openai_base_url: env_string("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            http_timeout: Duration::from_secs(
                env_parse("HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            avatar,
        })
    }
}

fn redacted(key: &Option<String>) -> &'static str {
    match key {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

impl std::fmt::Debug for AvatarSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarSettings")
            .field("simli_api_key", &redacted(&self.simli_api_key))
            .field("elevenlabs_api_key", &redacted(&self.elevenlabs_api_key))
            .field("api_url", &self.api_url)
            .field("poll_attempts", &self.poll_attempts)
            .field("poll_interval", &self.poll_interval)
            .field("poll_max_interval", &self.poll_max_interval)
            .finish()
    }
}

impl std::fmt::Debug for DocJourneyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocJourneyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_paths", &self.data_paths)
            .field("frontend_origin", &self.frontend_origin)
            .field("openai_api_key", &redacted(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("avatar", &self.avatar)
            .finish()
    }
}

/// Map a `DATABASE_URL` value to a SQLite file path.
///
/// Accepts `sqlite:///path`, `sqlite+aiosqlite:///path`, `sqlite://path`,
/// or a bare filesystem path.
pub fn database_path_from_url(url: &str) -> PathBuf {
    let url = url.trim();
    let rest = match url.split_once("://") {
        Some((scheme, rest)) if scheme.starts_with("sqlite") => rest,
        _ => return PathBuf::from(url),
    };
    // `sqlite:///./data/x.db` is relative, `sqlite:////abs/x.db` absolute.
    let path = rest.strip_prefix('/').unwrap_or(rest);
    PathBuf::from(path)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_from_url() {
        assert_eq!(
            database_path_from_url("sqlite+aiosqlite:///./backend/data/ai_documentation.db"),
            PathBuf::from("./backend/data/ai_documentation.db")
        );
        assert_eq!(
            database_path_from_url("sqlite:////var/lib/docjourney.db"),
            PathBuf::from("/var/lib/docjourney.db")
        );
        assert_eq!(
            database_path_from_url("data/cache.db"),
            PathBuf::from("data/cache.db")
        );
    }

    #[test]
    fn test_data_paths_creates_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = DataPaths::new(
            dir.path().join("db/scripts.db"),
            dir.path().join("static"),
        )
        .unwrap();

        assert!(dir.path().join("db").is_dir());
        assert!(paths.videos.is_dir());
        assert_eq!(paths.videos, dir.path().join("static").join("videos"));
    }

    #[test]
    fn test_debug_redacts_api_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DocJourneyConfig {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            data_paths: DataPaths::new(dir.path().join("db.sqlite"), dir.path().join("static"))
                .unwrap(),
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.into(),
            openai_api_key: Some("sk-secret-openai".into()),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            avatar: AvatarSettings {
                simli_api_key: Some("simli-secret".into()),
                elevenlabs_api_key: None,
                ..Default::default()
            },
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret-openai"));
        assert!(!rendered.contains("simli-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<unset>"));
        assert!(rendered.contains(DEFAULT_FRONTEND_ORIGIN));
    }
}
