//! Canonical geography keys.
//!
//! Brand data and boundary files spell the same region differently
//! ("UASIN-GISHU" vs "UASIN GISHU", "MURANGA" vs "MURANG'A"). Every label is
//! trimmed, upper-cased and passed through an [`AliasTable`] so both sides
//! agree on a single join key.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::ConfigError;

/// Known spelling differences between the sales tables and the county
/// boundary files. Identity rows are kept as documentation of names that
/// were checked and already agree.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("ELGEYO", "ELGEYO-MARAKWET"),
    ("MURANGA", "MURANG'A"),
    ("TAITA TAVETA", "TAITA-TAVETA"),
    ("THARAKA NITHI", "THARAKA-NITHI"),
    ("HOMA BAY", "HOMA BAY"),
    ("UASIN-GISHU", "UASIN GISHU"),
    ("TRANS-NZOIA", "TRANS NZOIA"),
    ("TANA RIVER", "TANA RIVER"),
    ("NAIROBI CITY", "NAIROBI"),
];

static BUILTIN: LazyLock<AliasTable> = LazyLock::new(AliasTable::builtin);

/// Canonicalizes `name` with the built-in alias table.
///
/// Total and deterministic: empty or whitespace-only input yields `""`.
#[must_use]
pub fn canonicalize(name: &str) -> String {
    BUILTIN.canonicalize(name)
}

/// The process-wide built-in alias table.
#[must_use]
pub fn builtin_aliases() -> &'static AliasTable {
    &BUILTIN
}

fn normalize_label(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

/// Mapping from a source-region spelling to its canonical region name.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// A table with no aliases; [`AliasTable::canonicalize`] only trims and
    /// upper-cases.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in county aliases.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = DEFAULT_ALIASES
            .iter()
            .map(|(source, target)| (normalize_label(source), normalize_label(target)))
            .collect();
        Self { entries }
    }

    /// Built-in aliases extended with the entries of a YAML alias file.
    ///
    /// File entries override built-in entries with the same source key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or if an
    /// entry has an empty source or target.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut table = Self::builtin();
        table.extend_from_file(path)?;
        Ok(table)
    }

    /// Adds the entries of a YAML alias file (`aliases: { SOURCE: TARGET }`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or if an
    /// entry has an empty source or target.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AliasFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: AliasFile = serde_yaml::from_str(&content).map_err(ConfigError::AliasFileParse)?;

        let count = file.aliases.len();
        for (source, target) in file.aliases {
            self.insert(&source, &target)?;
        }
        tracing::debug!(path = %path.display(), count, "loaded geography aliases");
        Ok(())
    }

    /// Inserts or replaces one alias.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if either side is empty after
    /// trimming.
    pub fn insert(&mut self, source: &str, target: &str) -> Result<(), ConfigError> {
        let source = normalize_label(source);
        let target = normalize_label(target);
        if source.is_empty() || target.is_empty() {
            return Err(ConfigError::Validation(format!(
                "alias entries must be non-empty (got '{source}' -> '{target}')"
            )));
        }
        self.entries.insert(source, target);
        Ok(())
    }

    /// The direct alias target for an already-normalized key, if any.
    #[must_use]
    pub fn target(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(source, target)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Trims, upper-cases and resolves `name` to its canonical key.
    ///
    /// Alias chains are followed to their end, so the result is always a
    /// fixed point: `canonicalize(canonicalize(x)) == canonicalize(x)`.
    /// A cycle resolves to its lexicographically smallest member.
    #[must_use]
    pub fn canonicalize(&self, name: &str) -> String {
        let mut current = normalize_label(name);
        if current.is_empty() {
            return current;
        }

        let mut seen: HashSet<String> = HashSet::new();
        loop {
            let Some(next) = self.entries.get(&current) else {
                return current;
            };
            if *next == current {
                return current;
            }
            if !seen.insert(current.clone()) {
                return self.cycle_representative(&current);
            }
            current.clone_from(next);
        }
    }

    fn cycle_representative(&self, start: &str) -> String {
        let mut smallest = start.to_string();
        let mut current = start;
        while let Some(next) = self.entries.get(current) {
            if next == start {
                break;
            }
            if next.as_str() < smallest.as_str() {
                smallest.clone_from(next);
            }
            current = next;
        }
        smallest
    }
}
