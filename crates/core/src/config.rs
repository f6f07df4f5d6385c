use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["dopgen.toml", "config/dopgen.toml"];

/// Environment variables read for each config key, highest priority first.
pub const ENV_BINDINGS: &[(&str, &[&str])] = &[
    ("telegram.bot_token", &["DOPGEN_TELEGRAM_BOT_TOKEN", "BOT_TOKEN"]),
    ("telegram.api_base_url", &["DOPGEN_TELEGRAM_API_BASE_URL"]),
    ("telegram.poll_timeout_secs", &["DOPGEN_TELEGRAM_POLL_TIMEOUT_SECS"]),
    ("catalog.data_dir", &["DOPGEN_CATALOG_DATA_DIR"]),
    ("catalog.clients_file", &["DOPGEN_CATALOG_CLIENTS_FILE"]),
    ("catalog.clients_json_b64", &["DOPGEN_CATALOG_CLIENTS_JSON_B64", "CLIENTS_JSON_B64"]),
    ("templates.dir", &["DOPGEN_TEMPLATES_DIR"]),
    ("server.bind_address", &["DOPGEN_SERVER_BIND_ADDRESS"]),
    ("server.health_check_port", &["DOPGEN_SERVER_HEALTH_CHECK_PORT", "PORT"]),
    ("logging.level", &["DOPGEN_LOGGING_LEVEL", "DOPGEN_LOG_LEVEL"]),
    ("logging.format", &["DOPGEN_LOGGING_FORMAT", "DOPGEN_LOG_FORMAT"]),
];

pub fn env_keys_for(key_path: &str) -> &'static [&'static str] {
    ENV_BINDINGS
        .iter()
        .find(|(path, _)| *path == key_path)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub catalog: CatalogConfig,
    pub templates: TemplatesConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub api_base_url: String,
    pub poll_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub data_dir: PathBuf,
    pub clients_file: PathBuf,
    pub clients_json_b64: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct TemplatesConfig {
    pub dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Health endpoint only runs when a port is configured.
    pub health_check_port: Option<u16>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bot_token: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub clients_file: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub health_check_port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig {
                bot_token: String::new().into(),
                api_base_url: "https://api.telegram.org".to_string(),
                poll_timeout_secs: 30,
            },
            catalog: CatalogConfig {
                data_dir: PathBuf::from("data"),
                clients_file: PathBuf::from("data/clients.json"),
                clients_json_b64: None,
            },
            templates: TemplatesConfig { dir: PathBuf::from("templates/agreements") },
            server: ServerConfig { bind_address: "0.0.0.0".to_string(), health_check_port: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATHS[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(telegram) = patch.telegram {
            if let Some(bot_token_value) = telegram.bot_token {
                self.telegram.bot_token = secret_value(bot_token_value);
            }
            if let Some(api_base_url) = telegram.api_base_url {
                self.telegram.api_base_url = api_base_url;
            }
            if let Some(poll_timeout_secs) = telegram.poll_timeout_secs {
                self.telegram.poll_timeout_secs = poll_timeout_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(data_dir) = catalog.data_dir {
                self.catalog.data_dir = data_dir;
            }
            if let Some(clients_file) = catalog.clients_file {
                self.catalog.clients_file = clients_file;
            }
            if let Some(clients_json_b64) = catalog.clients_json_b64 {
                self.catalog.clients_json_b64 = Some(secret_value(clients_json_b64));
            }
        }

        if let Some(templates) = patch.templates {
            if let Some(dir) = templates.dir {
                self.templates.dir = dir;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = Some(health_check_port);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_bound_env("telegram.bot_token") {
            self.telegram.bot_token = secret_value(value.1);
        }
        if let Some(value) = read_bound_env("telegram.api_base_url") {
            self.telegram.api_base_url = value.1;
        }
        if let Some((key, value)) = read_bound_env("telegram.poll_timeout_secs") {
            self.telegram.poll_timeout_secs = parse_u64(key, &value)?;
        }

        if let Some(value) = read_bound_env("catalog.data_dir") {
            self.catalog.data_dir = PathBuf::from(value.1);
        }
        if let Some(value) = read_bound_env("catalog.clients_file") {
            self.catalog.clients_file = PathBuf::from(value.1);
        }
        if let Some(value) = read_bound_env("catalog.clients_json_b64") {
            self.catalog.clients_json_b64 = Some(secret_value(value.1));
        }

        if let Some(value) = read_bound_env("templates.dir") {
            self.templates.dir = PathBuf::from(value.1);
        }

        if let Some(value) = read_bound_env("server.bind_address") {
            self.server.bind_address = value.1;
        }
        if let Some((key, value)) = read_bound_env("server.health_check_port") {
            self.server.health_check_port = Some(parse_u16(key, &value)?);
        }

        if let Some(value) = read_bound_env("logging.level") {
            self.logging.level = value.1;
        }
        if let Some(value) = read_bound_env("logging.format") {
            self.logging.format = value.1.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bot_token) = overrides.bot_token {
            self.telegram.bot_token = secret_value(bot_token);
        }
        if let Some(data_dir) = overrides.data_dir {
            self.catalog.data_dir = data_dir;
        }
        if let Some(clients_file) = overrides.clients_file {
            self.catalog.clients_file = clients_file;
        }
        if let Some(templates_dir) = overrides.templates_dir {
            self.templates.dir = templates_dir;
        }
        if let Some(health_check_port) = overrides.health_check_port {
            self.server.health_check_port = Some(health_check_port);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_telegram(&self.telegram)?;
        validate_catalog(&self.catalog)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_PATHS.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_telegram(telegram: &TelegramConfig) -> Result<(), ConfigError> {
    let bot_token = telegram.bot_token.expose_secret();
    if bot_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "telegram.bot_token is required. Get it from @BotFather (set DOPGEN_TELEGRAM_BOT_TOKEN or BOT_TOKEN)".to_string(),
        ));
    }
    let well_formed = bot_token
        .split_once(':')
        .map(|(id, secret)| {
            !id.is_empty() && id.chars().all(|ch| ch.is_ascii_digit()) && !secret.is_empty()
        })
        .unwrap_or(false);
    if !well_formed {
        return Err(ConfigError::Validation(
            "telegram.bot_token must look like `<bot id>:<secret>` as issued by @BotFather"
                .to_string(),
        ));
    }

    let base_url = telegram.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "telegram.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if telegram.poll_timeout_secs == 0 || telegram.poll_timeout_secs > 50 {
        return Err(ConfigError::Validation(
            "telegram.poll_timeout_secs must be in range 1..=50".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.data_dir must not be empty".to_string()));
    }

    let inline_empty = catalog
        .clients_json_b64
        .as_ref()
        .map(|value| value.expose_secret().trim().is_empty())
        .unwrap_or(false);
    if inline_empty {
        return Err(ConfigError::Validation(
            "catalog.clients_json_b64 is set but empty".to_string(),
        ));
    }

    if catalog.clients_json_b64.is_none() && catalog.clients_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "either catalog.clients_json_b64 or catalog.clients_file is required".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.health_check_port == Some(0) {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// First non-empty variable bound to `key_path`, with the variable name.
fn read_bound_env(key_path: &str) -> Option<(&'static str, String)> {
    env_keys_for(key_path).iter().find_map(|key| read_env(key).map(|value| (*key, value)))
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    telegram: Option<TelegramPatch>,
    catalog: Option<CatalogPatch>,
    templates: Option<TemplatesPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramPatch {
    bot_token: Option<String>,
    api_base_url: Option<String>,
    poll_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    data_dir: Option<PathBuf>,
    clients_file: Option<PathBuf>,
    clients_json_b64: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TemplatesPatch {
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
