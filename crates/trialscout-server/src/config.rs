use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};
use trialscout_search::{CLINICAL_TRIALS_API_BASE_URL, SearchOptions};

use crate::analyzer::ModelOverrides;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Clinical trial registry access
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Transcript analysis (language model) access
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Where the transcript fixtures live
    #[serde(default)]
    pub transcripts: TranscriptsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        // Registry validations
        if self.registry.page_size == 0 || self.registry.page_size > 1000 {
            return Err("registry.page_size must be between 1 and 1000".into());
        }
        if self.registry.sort.trim().is_empty() {
            return Err("registry.sort must not be empty".into());
        }
        if self.registry.base_url.trim().is_empty() {
            return Err("registry.base_url must not be empty".into());
        }
        // Analyzer validations
        if let Some(t) = self.analyzer.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err("analyzer.temperature must be between 0 and 2".into());
            }
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_true")]
    pub count_total: bool,
    /// Per HTTP request; 0 disables the limit.
    #[serde(default = "default_registry_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Per cascade candidate, including decoding. Unset means unbounded.
    #[serde(default)]
    pub candidate_timeout_ms: Option<u64>,
}

fn default_registry_url() -> String {
    CLINICAL_TRIALS_API_BASE_URL.into()
}
fn default_page_size() -> u32 {
    5
}
fn default_sort() -> String {
    "@relevance".into()
}
fn default_true() -> bool {
    true
}
fn default_registry_timeout_ms() -> u64 {
    30_000
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            page_size: default_page_size(),
            sort: default_sort(),
            count_total: default_true(),
            request_timeout_ms: default_registry_timeout_ms(),
            candidate_timeout_ms: None,
        }
    }
}

impl RegistryConfig {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            include_total: self.count_total,
            page_size: self.page_size,
            sort: self.sort.clone(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn candidate_timeout(&self) -> Option<Duration> {
        self.candidate_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// OpenAI-compatible API root; requests go to `{base_url}/responses`.
    #[serde(default = "default_analyzer_url")]
    pub base_url: String,
    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub store: Option<bool>,
    #[serde(default = "default_analyzer_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_analyzer_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_analyzer_timeout_ms() -> u64 {
    120_000
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: default_analyzer_url(),
            api_key: None,
            model: None,
            temperature: None,
            store: None,
            request_timeout_ms: default_analyzer_timeout_ms(),
        }
    }
}

impl AnalyzerConfig {
    pub fn overrides(&self) -> ModelOverrides {
        ModelOverrides {
            model: self.model.clone(),
            temperature: self.temperature,
            store: self.store,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptsConfig {
    /// JSON array of transcripts
    #[serde(default = "default_transcripts_path")]
    pub transcripts_path: String,
    /// JSON object mapping transcript id to its messages
    #[serde(default = "default_messages_path")]
    pub messages_path: String,
}

fn default_transcripts_path() -> String {
    "data/parsed-transcripts.json".into()
}
fn default_messages_path() -> String {
    "data/parsed-messages.json".into()
}

impl Default for TranscriptsConfig {
    fn default() -> Self {
        Self {
            transcripts_path: default_transcripts_path(),
            messages_path: default_messages_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Colored terminal output
    #[serde(default = "default_true")]
    pub ansi: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            ansi: default_true(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "trialscout.toml";
    pub const CONFIG_PATH_ENV: &str = "TRIALSCOUT_CONFIG";

    /// Where the config file is looked up.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ConfigLocation {
        /// `--config <path>` or `--config=<path>`
        Flag(String),
        /// `TRIALSCOUT_CONFIG`
        Env(String),
        Default,
    }

    impl ConfigLocation {
        /// The command-line flag wins over the environment; an empty value
        /// counts as unset.
        pub fn resolve<I>(args: I, env_value: Option<String>) -> Self
        where
            I: IntoIterator<Item = String>,
        {
            let mut args = args.into_iter();
            while let Some(arg) = args.next() {
                let value = match arg.strip_prefix("--config") {
                    Some("") => args.next(),
                    Some(rest) => rest.strip_prefix('=').map(str::to_owned),
                    None => continue,
                };
                if let Some(path) = value.filter(|p| !p.is_empty()) {
                    return Self::Flag(path);
                }
            }
            match env_value.filter(|p| !p.is_empty()) {
                Some(path) => Self::Env(path),
                None => Self::Default,
            }
        }

        pub fn path(&self) -> &str {
            match self {
                Self::Flag(path) | Self::Env(path) => path,
                Self::Default => DEFAULT_CONFIG_FILE,
            }
        }

        pub fn source(&self) -> &'static str {
            match self {
                Self::Flag(_) => "--config",
                Self::Env(_) => CONFIG_PATH_ENV,
                Self::Default => "default",
            }
        }
    }

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., TRIALSCOUT__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("TRIALSCOUT")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let mut merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        if merged.analyzer.api_key.is_none() {
            merged.analyzer.api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.registry.search_options(), SearchOptions::default());
        assert_eq!(cfg.registry.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.registry.candidate_timeout(), None);
    }

    #[test]
    fn zero_timeout_disables_limit() {
        let mut cfg = AppConfig::default();
        cfg.registry.request_timeout_ms = 0;
        assert_eq!(cfg.registry.request_timeout(), None);
    }

    #[test]
    fn config_location_prefers_flag_then_env() {
        use loader::ConfigLocation;

        let args = |list: &[&str]| list.iter().map(|a| a.to_string()).collect::<Vec<_>>();

        let loc = ConfigLocation::resolve(args(&["--config", "a.toml"]), Some("b.toml".into()));
        assert_eq!(loc, ConfigLocation::Flag("a.toml".into()));
        assert_eq!(loc.source(), "--config");

        let loc = ConfigLocation::resolve(args(&["--config=c.toml"]), None);
        assert_eq!(loc.path(), "c.toml");

        let loc = ConfigLocation::resolve(args(&["--verbose"]), Some("b.toml".into()));
        assert_eq!(loc, ConfigLocation::Env("b.toml".into()));
        assert_eq!(loc.source(), "TRIALSCOUT_CONFIG");

        // dangling flag and empty env fall through
        let loc = ConfigLocation::resolve(args(&["--config"]), Some(String::new()));
        assert_eq!(loc, ConfigLocation::Default);
        assert_eq!(loc.path(), "trialscout.toml");

        let loc = ConfigLocation::resolve(args(&["--configure", "x"]), None);
        assert_eq!(loc, ConfigLocation::Default);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = AppConfig::default();
        cfg.registry.page_size = 0;
        assert!(cfg.validate().unwrap_err().contains("page_size"));

        let mut cfg = AppConfig::default();
        cfg.analyzer.temperature = Some(3.5);
        assert!(cfg.validate().unwrap_err().contains("temperature"));

        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().unwrap_err().contains("logging.level"));
    }
}
