use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dopgen_core::config::{env_keys_for, AppConfig, LoadOptions, DEFAULT_CONFIG_PATHS};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let line = |key_path: &str, value: &str| {
        render_line(
            key_path,
            value,
            field_source(key_path, config_file_doc.as_ref(), config_file_path.as_deref()),
        )
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(line(
        "telegram.bot_token",
        &redact_token(config.telegram.bot_token.expose_secret()),
    ));
    lines.push(line("telegram.api_base_url", &config.telegram.api_base_url));
    lines.push(line(
        "telegram.poll_timeout_secs",
        &config.telegram.poll_timeout_secs.to_string(),
    ));

    lines.push(line("catalog.data_dir", &config.catalog.data_dir.display().to_string()));
    lines.push(line("catalog.clients_file", &config.catalog.clients_file.display().to_string()));
    let inline_roster =
        if config.catalog.clients_json_b64.is_some() { "<redacted>" } else { "<unset>" };
    lines.push(line("catalog.clients_json_b64", inline_roster));

    lines.push(line("templates.dir", &config.templates.dir.display().to_string()));

    lines.push(line("server.bind_address", &config.server.bind_address));
    let health_check_port = config
        .server
        .health_check_port
        .map(|port| port.to_string())
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(line("server.health_check_port", &health_check_port));

    lines.push(line("logging.level", &config.logging.level));
    lines.push(line("logging.format", &format!("{:?}", config.logging.format)));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    DEFAULT_CONFIG_PATHS.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_key = env_keys_for(key_path).iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    });
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the bot id, hides the secret half.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((bot_id, _)) = trimmed.split_once(':') {
        return format!("{bot_id}:***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_token};

    #[test]
    fn redact_token_keeps_only_the_bot_id() {
        assert_eq!(redact_token("123456:AAE-secret"), "123456:***");
        assert_eq!(redact_token("  "), "<empty>");
        assert_eq!(redact_token("opaque"), "<redacted>");
    }

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: Value = "[telegram]\nbot_token = \"1:x\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "telegram.bot_token"));
        assert!(!contains_path(&doc, "telegram.api_base_url"));
        assert!(!contains_path(&doc, "logging.level"));
    }
}
