// Layered configuration: defaults, then TOML file, then RESUME_MATCH__ env vars

use config::{Config, ConfigError, Environment, File};
use resume_match_core::domain::MatchPair;
use resume_match_infra_http::{HttpClientConfig, DEFAULT_BASE_URL};
use resume_match_infra_local::paths;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "RESUME_MATCH";
pub const ENV_SEPARATOR: &str = "__";

/// Shortcut for `logging.format`, kept for parity with other tools
pub const LOG_FORMAT_ENV: &str = "RESUME_MATCH_LOG_FORMAT";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub matching: MatchingSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Fixed pair sent with every match request
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    pub resume_id: i64,
    pub job_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportSettings {
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Settings {
    /// Load from the process environment
    ///
    /// An explicit file must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = Self::build(explicit, None)?;
        settings.apply_log_format(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
        Ok(settings)
    }

    /// Load with an injected environment map (`None` reads the process env)
    pub fn build(
        explicit: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", 30)?
            .set_default("matching.resume_id", MatchPair::EXAMPLE.resume_id)?
            .set_default("matching.job_id", MatchPair::EXAMPLE.job_id)?
            .set_default("logging.format", "pretty")?;

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => match paths::default_config_path() {
                Ok(path) => builder.add_source(File::from(path).required(false)),
                Err(_) => builder,
            },
        };

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(env);

        builder.add_source(environment).build()?.try_deserialize()
    }

    fn apply_log_format(&mut self, value: Option<&str>) {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => self.logging.format = LogFormat::Json,
            Some("pretty") => self.logging.format = LogFormat::Pretty,
            _ => {}
        }
    }

    pub fn http_client(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
        }
    }

    pub fn match_pair(&self) -> MatchPair {
        MatchPair::new(self.matching.resume_id, self.matching.job_id)
    }

    pub fn export_dir(&self) -> resume_match_core::Result<PathBuf> {
        match &self.export.directory {
            Some(dir) => Ok(expand(dir)),
            None => paths::default_export_dir(),
        }
    }

    pub fn session_path(&self) -> resume_match_core::Result<PathBuf> {
        match &self.session.path {
            Some(path) => Ok(expand(path)),
            None => paths::default_session_path(),
        }
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging.directory.as_deref().map(expand)
    }
}

pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
