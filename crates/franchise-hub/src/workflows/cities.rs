//! City normalization used both when routing enquiries and when indexing franchises.

use std::collections::BTreeMap;

const BUILTIN_ALIASES: &[(&str, &str)] = &[("banglore", "bengaluru"), ("bangalore", "bengaluru")];

/// Alias table mapping a normalized spelling to its canonical city name.
///
/// Canonical names are themselves normalized, and chains are flattened on insert, so
/// `normalize` is idempotent for every table built through this API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityAliases {
    aliases: BTreeMap<String, String>,
}

impl CityAliases {
    /// A table with no aliases; only case and whitespace are normalized.
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        BUILTIN_ALIASES
            .iter()
            .fold(Self::empty(), |table, (alias, canonical)| {
                table.with_alias(alias, canonical)
            })
    }

    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        let alias = clean(alias);
        let canonical = self.resolve(clean(canonical));
        if alias.is_empty() || canonical.is_empty() || alias == canonical {
            return self;
        }

        for target in self.aliases.values_mut() {
            if *target == alias {
                *target = canonical.clone();
            }
        }
        self.aliases.insert(alias, canonical);
        self
    }

    /// Lower-cased, whitespace-collapsed, alias-resolved form. `None` for blank input.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let cleaned = clean(raw);
        if cleaned.is_empty() {
            None
        } else {
            Some(self.resolve(cleaned))
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    fn resolve(&self, cleaned: String) -> String {
        match self.aliases.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned,
        }
    }
}

impl Default for CityAliases {
    fn default() -> Self {
        Self::builtin()
    }
}

fn clean(value: &str) -> String {
    let stripped = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}
