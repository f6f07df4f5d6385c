pub mod loader;
pub mod resolver;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use loader::{encode_inline_roster, load_catalog, CatalogError, CatalogSources};
pub use resolver::{resolve, MatchCandidate, MATCH_LIMIT};

/// Lowercase, trim and fold `ё` into `е`. Both sides of every lookup go
/// through this.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace('ё', "е")
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub company_name: String,
    pub contract: String,
    pub director_position: String,
    pub director_fio: String,
    pub initials: String,
}

/// Reference data shared read-only by every session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Normalized alias to canonical company name.
    pub aliases: HashMap<String, String>,
    /// Keyed maps keep the order of the source files.
    pub clients: IndexMap<String, ClientRecord>,
    pub products: IndexMap<String, String>,
    pub locations: IndexMap<String, String>,
}

impl Catalog {
    pub fn client(&self, key: &str) -> Option<&ClientRecord> {
        self.clients.get(key)
    }

    pub fn product_label(&self, key: &str) -> Option<&str> {
        self.products.get(key).map(String::as_str)
    }

    pub fn location_label(&self, key: &str) -> Option<&str> {
        self.locations.get(key).map(String::as_str)
    }

    pub fn find_companies(&self, query: &str) -> Vec<MatchCandidate> {
        let normalized = normalize(query);
        let effective = self.aliases.get(&normalized).map(String::as_str).unwrap_or(query);
        resolve(
            effective,
            self.clients.iter().map(|(key, client)| (key.as_str(), client.company_name.as_str())),
            MATCH_LIMIT,
        )
    }

    pub fn find_products(&self, query: &str) -> Vec<MatchCandidate> {
        resolve(
            query,
            self.products.iter().map(|(key, label)| (key.as_str(), label.as_str())),
            MATCH_LIMIT,
        )
    }

    pub fn find_locations(&self, query: &str) -> Vec<MatchCandidate> {
        resolve(
            query,
            self.locations.iter().map(|(key, label)| (key.as_str(), label.as_str())),
            MATCH_LIMIT,
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::HashMap;

    use indexmap::IndexMap;

    use super::{Catalog, ClientRecord};

    fn client(name: &str, contract: &str, fio: &str, initials: &str) -> ClientRecord {
        ClientRecord {
            company_name: name.to_owned(),
            contract: contract.to_owned(),
            director_position: "Генеральный директор".to_owned(),
            director_fio: fio.to_owned(),
            initials: initials.to_owned(),
        }
    }

    fn labels(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries.iter().map(|(key, label)| ((*key).to_owned(), (*label).to_owned())).collect()
    }

    pub(crate) fn sample_catalog() -> Catalog {
        let mut aliases = HashMap::new();
        aliases.insert("сиб".to_owned(), "Сибирская компания".to_owned());

        Catalog {
            aliases,
            clients: IndexMap::from([
                (
                    "sib".to_owned(),
                    client(
                        "Сибирская компания",
                        "№ 15/2023",
                        "Иванова Ивана Ивановича",
                        "И.И. Иванов",
                    ),
                ),
                (
                    "ural".to_owned(),
                    client("Уральский завод", "7-П", "Петрова Петра Петровича", "П.П. Петров"),
                ),
            ]),
            products: labels(&[
                ("дтл", "Дизельное топливо летнее"),
                ("дтз", "Дизельное топливо зимнее"),
                ("дте", "Дизельное топливо евро"),
                ("аи92", "Бензин АИ-92"),
            ]),
            locations: labels(&[
                ("база1", "Нефтебаза №1, г. Омск"),
                ("база2", "Нефтебаза №2, г. Тюмень"),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_catalog;
    use super::normalize;

    #[test]
    fn normalize_folds_case_whitespace_and_yo() {
        assert_eq!(normalize("  Ёлка  "), "елка");
        assert_eq!(normalize("ДТЛ"), "дтл");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn alias_resolves_to_canonical_client() {
        let catalog = sample_catalog();

        let matches = catalog.find_companies("Сиб");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].key, "sib");
        assert_eq!(matches[0].label, "Сибирская компания");
    }

    #[test]
    fn product_query_can_match_several_labels() {
        let catalog = sample_catalog();

        let keys: Vec<_> =
            catalog.find_products("дизель").into_iter().map(|candidate| candidate.key).collect();
        assert_eq!(keys, vec!["дтл", "дтз", "дте"]);
        assert!(catalog.find_locations("владивосток").is_empty());
    }
}
