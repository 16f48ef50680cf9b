//! Localized strings keyed by locale and key.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::{parse_table, ConfigError, Table};

/// Locale to key to string mapping. Every locale defines the same keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TextTable(BTreeMap<String, BTreeMap<String, String>>);

impl TextTable {
    /// Text for `key` in `locale`.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.0
            .get(locale)
            .and_then(|strings| strings.get(key))
            .map(String::as_str)
    }

    /// Locales in lexical order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

pub(crate) fn parse(json: &str) -> Result<TextTable, ConfigError> {
    let table: TextTable = parse_table(Table::Texts, json)?;
    if table.0.is_empty() {
        return Err(ConfigError::EmptyTexts);
    }

    let keys: BTreeSet<&String> = table.0.values().flat_map(BTreeMap::keys).collect();
    for (locale, strings) in &table.0 {
        if let Some(key) = keys.iter().find(|key| !strings.contains_key(key.as_str())) {
            return Err(ConfigError::MissingText {
                locale: locale.clone(),
                key: (*key).clone(),
            });
        }
    }
    Ok(table)
}
