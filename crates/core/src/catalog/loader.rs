use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use super::{normalize, Catalog, ClientRecord};
use crate::config::CatalogConfig;

pub const ALIASES_FILE: &str = "aliases.json";
pub const PRODUCTS_FILE: &str = "products.json";
pub const LOCATIONS_FILE: &str = "locations.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{origin}: {message}")]
    Shape { origin: String, message: String },
    #[error("inline client roster is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("inline client roster is not valid UTF-8")]
    Utf8,
}

#[derive(Clone, Debug)]
pub struct CatalogSources {
    pub data_dir: PathBuf,
    pub clients_file: PathBuf,
    pub clients_json_b64: Option<SecretString>,
}

impl CatalogSources {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            clients_file: config.clients_file.clone(),
            clients_json_b64: config.clients_json_b64.clone(),
        }
    }

    pub fn clients_origin(&self) -> String {
        if self.clients_json_b64.is_some() {
            "inline client roster".to_owned()
        } else {
            self.clients_file.display().to_string()
        }
    }
}

pub fn load_catalog(sources: &CatalogSources) -> Result<Catalog, CatalogError> {
    let aliases = load_aliases(&sources.data_dir.join(ALIASES_FILE))?;
    let products = load_label_map(&sources.data_dir.join(PRODUCTS_FILE))?;
    let locations = load_label_map(&sources.data_dir.join(LOCATIONS_FILE))?;

    let clients = match &sources.clients_json_b64 {
        Some(encoded) => {
            let json = decode_inline_roster(encoded.expose_secret())?;
            parse_clients(&json, "inline client roster")?
        }
        None => {
            let json = read_text(&sources.clients_file)?;
            parse_clients(&json, &sources.clients_file.display().to_string())?
        }
    };

    info!(
        event_name = "catalog.loaded",
        aliases = aliases.len(),
        clients = clients.len(),
        products = products.len(),
        locations = locations.len(),
        "catalog loaded"
    );

    Ok(Catalog { aliases, clients, products, locations })
}

/// URL-safe base64 of the roster JSON, without padding. The decoder accepts
/// either form.
pub fn encode_inline_roster(json: &str) -> String {
    URL_SAFE_NO_PAD.encode(json.trim_start_matches('\u{feff}').as_bytes())
}

fn decode_inline_roster(encoded: &str) -> Result<String, CatalogError> {
    let trimmed = encoded.trim().trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(trimmed)?;
    let text = String::from_utf8(bytes).map_err(|_| CatalogError::Utf8)?;
    Ok(strip_bom(&text).to_owned())
}

fn read_text(path: &Path) -> Result<String, CatalogError> {
    let text = fs::read_to_string(path)
        .map_err(|source| CatalogError::Read { path: path.to_path_buf(), source })?;
    Ok(strip_bom(&text).to_owned())
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn parse_object(json: &str, origin: &str) -> Result<Map<String, Value>, CatalogError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|source| CatalogError::Json { origin: origin.to_owned(), source })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CatalogError::Shape {
            origin: origin.to_owned(),
            message: "expected a JSON object at the top level".to_owned(),
        }),
    }
}

fn load_aliases(path: &Path) -> Result<HashMap<String, String>, CatalogError> {
    let origin = path.display().to_string();
    let root = parse_object(&read_text(path)?, &origin)?;

    let Some(Value::Object(companies)) = root.get("companies") else {
        return Err(CatalogError::Shape {
            origin,
            message: "missing `companies` object".to_owned(),
        });
    };

    let mut aliases = HashMap::with_capacity(companies.len());
    for (alias, target) in companies {
        let Some(target) = target.as_str() else {
            warn!(
                event_name = "catalog.alias_skipped",
                alias = %alias,
                "alias target is not a string"
            );
            continue;
        };
        aliases.insert(normalize(alias), target.to_owned());
    }
    Ok(aliases)
}

fn load_label_map(path: &Path) -> Result<IndexMap<String, String>, CatalogError> {
    let origin = path.display().to_string();
    let root = parse_object(&read_text(path)?, &origin)?;

    let mut labels = IndexMap::with_capacity(root.len());
    for (key, value) in root {
        let label = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            other => {
                return Err(CatalogError::Shape {
                    origin,
                    message: format!("label for `{key}` must be a string, got {other}"),
                });
            }
        };
        labels.insert(key, label);
    }
    Ok(labels)
}

fn parse_clients(json: &str, origin: &str) -> Result<IndexMap<String, ClientRecord>, CatalogError> {
    let root = parse_object(json, origin)?;

    let mut clients = IndexMap::with_capacity(root.len());
    for (key, value) in root {
        let Value::Object(record) = value else {
            warn!(
                event_name = "catalog.client_skipped",
                client = %key,
                "client entry is not an object"
            );
            continue;
        };
        clients.insert(
            key,
            ClientRecord {
                company_name: text_field(&record, "company_name"),
                contract: text_field(&record, "contract"),
                director_position: text_field(&record, "director_position"),
                director_fio: text_field(&record, "director_fio"),
                initials: text_field(&record, "initials"),
            },
        );
    }
    Ok(clients)
}

fn text_field(record: &Map<String, Value>, name: &str) -> String {
    match record.get(name) {
        Some(Value::String(text)) => text.trim().to_owned(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use secrecy::SecretString;
    use tempfile::TempDir;

    use super::{encode_inline_roster, load_catalog, CatalogError, CatalogSources};

    const CLIENTS: &str = r#"{
        "sib": {"company_name": "Сибирская компания", "contract": "№ 15/2023",
                "director_position": "Генеральный директор",
                "director_fio": "Иванова Ивана Ивановича", "initials": "И.И. Иванов"},
        "broken": "not an object",
        "ural": {"company_name": "Уральский завод", "contract": 7}
    }"#;

    fn write_data_dir(dir: &Path) {
        fs::write(dir.join("aliases.json"), r#"{"companies": {"СИБ": "Сибирская компания"}}"#)
            .expect("write aliases");
        fs::write(
            dir.join("products.json"),
            "\u{feff}{\"дтл\": \"Дизельное топливо летнее\", \"аи92\": \"Бензин АИ-92\"}",
        )
        .expect("write products");
        fs::write(
            dir.join("locations.json"),
            r#"{"база2": "Нефтебаза №2", "база1": "Нефтебаза №1"}"#,
        )
        .expect("write locations");
    }

    fn sources(dir: &Path, inline: Option<String>) -> CatalogSources {
        CatalogSources {
            data_dir: dir.to_path_buf(),
            clients_file: dir.join("clients.json"),
            clients_json_b64: inline.map(SecretString::from),
        }
    }

    #[test]
    fn loads_files_in_source_order() {
        let temp_dir = TempDir::new().expect("temp dir");
        write_data_dir(temp_dir.path());
        fs::write(temp_dir.path().join("clients.json"), CLIENTS).expect("write clients");

        let catalog = load_catalog(&sources(temp_dir.path(), None)).expect("catalog loads");

        assert_eq!(catalog.aliases.get("сиб").map(String::as_str), Some("Сибирская компания"));
        let locations: Vec<_> = catalog.locations.keys().map(String::as_str).collect();
        assert_eq!(locations, vec!["база2", "база1"]);
        assert_eq!(catalog.product_label("дтл"), Some("Дизельное топливо летнее"));

        let clients: Vec<_> = catalog.clients.keys().map(String::as_str).collect();
        assert_eq!(clients, vec!["sib", "ural"]);
        let ural = catalog.client("ural").expect("ural present");
        assert_eq!(ural.contract, "7");
        assert_eq!(ural.initials, "");
    }

    #[test]
    fn inline_roster_takes_precedence_with_or_without_padding() {
        let temp_dir = TempDir::new().expect("temp dir");
        write_data_dir(temp_dir.path());

        let encoded = encode_inline_roster(CLIENTS);
        let catalog =
            load_catalog(&sources(temp_dir.path(), Some(encoded.clone()))).expect("unpadded");
        assert_eq!(catalog.clients.len(), 2);

        let padding = "=".repeat((4 - encoded.len() % 4) % 4);
        let padded = format!("{encoded}{padding}");
        let catalog = load_catalog(&sources(temp_dir.path(), Some(padded))).expect("padded");
        assert!(catalog.client("sib").is_some());
    }

    #[test]
    fn aliases_without_companies_object_are_rejected() {
        let temp_dir = TempDir::new().expect("temp dir");
        write_data_dir(temp_dir.path());
        fs::write(temp_dir.path().join("aliases.json"), r#"{"сиб": "x"}"#).expect("overwrite");
        fs::write(temp_dir.path().join("clients.json"), CLIENTS).expect("write clients");

        let error = load_catalog(&sources(temp_dir.path(), None)).expect_err("must fail");
        assert!(matches!(error, CatalogError::Shape { .. }));
    }

    #[test]
    fn missing_client_file_is_fatal() {
        let temp_dir = TempDir::new().expect("temp dir");
        write_data_dir(temp_dir.path());

        let error = load_catalog(&sources(temp_dir.path(), None)).expect_err("must fail");
        assert!(matches!(error, CatalogError::Read { .. }));
        assert!(error.to_string().contains("clients.json"));
    }

    #[test]
    fn garbage_inline_roster_is_rejected() {
        let temp_dir = TempDir::new().expect("temp dir");
        write_data_dir(temp_dir.path());

        let error = load_catalog(&sources(temp_dir.path(), Some("@@not base64@@".to_owned())))
            .expect_err("must fail");
        assert!(matches!(error, CatalogError::Base64(_)));
    }
}
