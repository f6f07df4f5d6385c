use serde::{Deserialize, Serialize};

use super::normalize;

pub const MATCH_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub key: String,
    pub label: String,
}

/// Exact key matches first, then keys or labels containing the query.
/// Both passes keep catalog order; the result is cut at `limit`.
pub fn resolve<'a, I>(query: &str, entries: I, limit: usize) -> Vec<MatchCandidate>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let query = normalize(query);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let entries: Vec<(&str, &str)> = entries.into_iter().collect();
    let mut taken = vec![false; entries.len()];
    let mut matches = Vec::new();

    for (position, (key, label)) in entries.iter().enumerate() {
        if normalize(key) == query {
            taken[position] = true;
            matches.push(candidate(key, label));
        }
    }

    for (position, (key, label)) in entries.iter().enumerate() {
        if taken[position] {
            continue;
        }
        if normalize(key).contains(&query) || normalize(label).contains(&query) {
            matches.push(candidate(key, label));
        }
    }

    matches.truncate(limit);
    matches
}

fn candidate(key: &str, label: &str) -> MatchCandidate {
    MatchCandidate { key: key.to_owned(), label: label.to_owned() }
}

#[cfg(test)]
mod tests {
    use super::{resolve, MATCH_LIMIT};
    use crate::catalog::normalize;

    #[test]
    fn empty_query_matches_nothing() {
        let entries = [("a", "Alpha")];
        assert!(resolve("   ", entries, MATCH_LIMIT).is_empty());
    }

    #[test]
    fn exact_key_precedes_substring_matches() {
        let entries = [("база10", "Склад"), ("база", "Основная база"), ("x", "Старая база")];

        let keys: Vec<_> =
            resolve("БАЗА", entries, MATCH_LIMIT).into_iter().map(|found| found.key).collect();
        assert_eq!(keys, vec!["база", "база10", "x"]);
    }

    #[test]
    fn yo_and_e_are_interchangeable() {
        let entries = [("k1", "Тёплый склад")];
        assert_eq!(resolve("теплый", entries, MATCH_LIMIT).len(), 1);
    }

    #[test]
    fn result_is_capped_and_every_hit_contains_query() {
        let owned: Vec<(String, String)> =
            (0..25).map(|n| (format!("k{n}"), format!("Продукт {n}"))).collect();
        let entries = owned.iter().map(|(key, label)| (key.as_str(), label.as_str()));

        let found = resolve("продукт", entries, MATCH_LIMIT);
        assert_eq!(found.len(), MATCH_LIMIT);
        assert_eq!(found[0].key, "k0");
        for hit in &found {
            let query = normalize("продукт");
            assert!(normalize(&hit.key).contains(&query) || normalize(&hit.label).contains(&query));
        }
    }
}
