//! Boundary feature collections decorated with canonical join keys.
//!
//! Only `properties` are read or written; `geometry` and any other feature
//! members pass through untouched so the augmented collection can be handed
//! straight to a map widget.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use mapdash_core::{builtin_aliases, slugify, AliasTable};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::GeoError;

/// Property written on every feature with its canonical join key.
pub const CANONICAL_KEY_PROPERTY: &str = "canonicalKey";
/// Property written on every feature with the slug of its canonical key.
pub const SLUG_ID_PROPERTY: &str = "slugId";

const TERRITORY_NAME_PROPERTIES: &[&str] = &[
    "TERRITORY", "Territory", "territory", "PROVINCE", "Province", "province", "NAME_1",
    "ADM1_EN", "NAME", "Name", "name", "COUNTY", "County", "county",
];

const COUNTY_NAME_PROPERTIES: &[&str] = &[
    "COUNTY_NAM", "COUNTY", "County", "county", "ADM1_EN", "NAME", "NAME_1", "Name", "name",
];

/// Granularity of a boundary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryLevel {
    Territory,
    County,
}

impl BoundaryLevel {
    /// Candidate display-name properties, in priority order.
    #[must_use]
    pub fn name_properties(self) -> &'static [&'static str] {
        match self {
            BoundaryLevel::Territory => TERRITORY_NAME_PROPERTIES,
            BoundaryLevel::County => COUNTY_NAME_PROPERTIES,
        }
    }
}

impl fmt::Display for BoundaryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryLevel::Territory => write!(f, "territory"),
            BoundaryLevel::County => write!(f, "county"),
        }
    }
}

impl FromStr for BoundaryLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "territory" | "province" => Ok(BoundaryLevel::Territory),
            "county" => Ok(BoundaryLevel::County),
            other => Err(format!("unknown boundary level '{other}'")),
        }
    }
}

/// One polygon region's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicFeature {
    pub raw_name: String,
    pub canonical_key: String,
    pub slug_id: String,
}

/// A loaded boundary file. Immutable once built.
#[derive(Debug, Clone)]
pub struct BoundarySet {
    level: BoundaryLevel,
    collection: Value,
    features: Vec<GeographicFeature>,
}

impl BoundarySet {
    /// Decorates an in-memory feature collection.
    ///
    /// `source` names the collection in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Parse`] if `collection` is not an object with a
    /// `features` array of feature objects.
    pub fn from_value(
        source: &str,
        mut collection: Value,
        level: BoundaryLevel,
        aliases: &AliasTable,
    ) -> Result<Self, GeoError> {
        let features =
            decorate(&mut collection, level, aliases).map_err(|reason| GeoError::Parse {
                path: source.to_string(),
                reason,
            })?;
        Ok(Self {
            level,
            collection,
            features,
        })
    }

    #[must_use]
    pub fn level(&self) -> BoundaryLevel {
        self.level
    }

    /// Features in file order.
    #[must_use]
    pub fn features(&self) -> &[GeographicFeature] {
        &self.features
    }

    /// The augmented feature collection, geometry included.
    #[must_use]
    pub fn collection(&self) -> &Value {
        &self.collection
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.canonical_key.as_str())
    }

    #[must_use]
    pub fn find(&self, canonical_key: &str) -> Option<&GeographicFeature> {
        self.features
            .iter()
            .find(|f| f.canonical_key == canonical_key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Loads a boundary file using the built-in alias table.
///
/// # Errors
///
/// - [`GeoError::NotFound`] if `path` does not exist.
/// - [`GeoError::Parse`] if the file is not a JSON feature collection.
/// - [`GeoError::Io`] on any other read failure.
pub fn load_boundaries(path: &Path, level: BoundaryLevel) -> Result<BoundarySet, GeoError> {
    load_boundaries_with(path, level, builtin_aliases())
}

/// Loads a boundary file, canonicalizing names with `aliases`.
///
/// # Errors
///
/// Same as [`load_boundaries`].
pub fn load_boundaries_with(
    path: &Path,
    level: BoundaryLevel,
    aliases: &AliasTable,
) -> Result<BoundarySet, GeoError> {
    let label = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GeoError::NotFound {
                path: label.clone(),
            }
        } else {
            GeoError::Io {
                path: label.clone(),
                source: e,
            }
        }
    })?;

    let collection: Value = serde_json::from_str(&content).map_err(|e| GeoError::Parse {
        path: label.clone(),
        reason: e.to_string(),
    })?;

    let set = BoundarySet::from_value(&label, collection, level, aliases)?;
    let unnamed = set.features.iter().filter(|f| f.raw_name.is_empty()).count();
    tracing::debug!(
        path = %label,
        %level,
        features = set.len(),
        unnamed,
        "loaded boundary file"
    );
    Ok(set)
}

fn decorate(
    collection: &mut Value,
    level: BoundaryLevel,
    aliases: &AliasTable,
) -> Result<Vec<GeographicFeature>, String> {
    let root = collection
        .as_object_mut()
        .ok_or_else(|| "top-level value is not an object".to_string())?;
    let features = root
        .get_mut("features")
        .ok_or_else(|| "missing `features` array".to_string())?
        .as_array_mut()
        .ok_or_else(|| "`features` is not an array".to_string())?;

    let mut out = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter_mut().enumerate() {
        let feature = feature
            .as_object_mut()
            .ok_or_else(|| format!("feature {idx} is not an object"))?;

        let properties = feature
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if properties.is_null() {
            *properties = Value::Object(Map::new());
        }
        let properties = properties
            .as_object_mut()
            .ok_or_else(|| format!("feature {idx} has non-object properties"))?;

        let raw_name = first_present(properties, level.name_properties()).unwrap_or_default();
        let canonical_key = aliases.canonicalize(&raw_name);
        let slug_id = slugify(&canonical_key);

        properties.insert(
            CANONICAL_KEY_PROPERTY.to_string(),
            Value::String(canonical_key.clone()),
        );
        properties.insert(SLUG_ID_PROPERTY.to_string(), Value::String(slug_id.clone()));

        out.push(GeographicFeature {
            raw_name,
            canonical_key,
            slug_id,
        });
    }
    Ok(out)
}

/// First candidate property holding a usable name: a non-blank string or a
/// number. `null`, blanks, booleans and nested values are skipped.
fn first_present(properties: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
