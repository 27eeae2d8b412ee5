//! Feature and variant models.
//!
//! A feature is a named product attribute definition (e.g. "Color"),
//! independent of any specific product; a variant is one permitted value
//! of a feature (e.g. "Red"). The backend returns features without their
//! variant sets, so the catalog enriches every record with a [`VariantSet`]
//! before anything downstream joins against it.

use serde::{Deserialize, Serialize};

/// Feature type tag as encoded by the backend.
///
/// Unknown tags decode as [`FeatureType::Other`]; the original byte is not
/// preserved. All downstream logic matches on this enum instead of the raw
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeatureType {
    /// Free text value.
    Text,
    /// Numeric value, wire-encoded as a string in `value_int`.
    Number,
    /// Multi-select; may carry its own variant map when the picker is on.
    MultiSelect,
    /// Single reference to one variant of the feature.
    VariantRef,
    /// Anything the backend sends that we do not recognize.
    #[default]
    Other,
}

impl FeatureType {
    /// The backend's one-letter tag for this type.
    pub fn as_tag(self) -> &'static str {
        match self {
            FeatureType::Text => "T",
            FeatureType::Number => "N",
            FeatureType::MultiSelect => "M",
            FeatureType::VariantRef => "V",
            FeatureType::Other => "O",
        }
    }
}

impl From<String> for FeatureType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "T" => FeatureType::Text,
            "N" => FeatureType::Number,
            "M" => FeatureType::MultiSelect,
            "V" => FeatureType::VariantRef,
            _ => FeatureType::Other,
        }
    }
}

impl From<FeatureType> for String {
    fn from(kind: FeatureType) -> Self {
        kind.as_tag().to_string()
    }
}

/// One permitted value of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant identifier, unique within its feature.
    pub id: u64,
    /// Human-readable label (e.g. "Red").
    pub label: String,
}

/// Outcome of resolving a feature's variant set.
///
/// Every catalog feature carries one of these; there is no "missing" state,
/// so joins never fail on an absent key. `Failed` records a resolution
/// error without pretending the feature has no variants; it is not cached,
/// so the next catalog refresh retries the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "items", rename_all = "snake_case")]
pub enum VariantSet {
    /// Variants were resolved (possibly to an empty set).
    Resolved(Vec<Variant>),
    /// The backend call for this feature's variants failed.
    Failed,
}

impl VariantSet {
    /// The resolved variants, empty for `Failed`.
    pub fn variants(&self) -> &[Variant] {
        match self {
            VariantSet::Resolved(v) => v,
            VariantSet::Failed => &[],
        }
    }

    /// Label of the variant with the given id, if resolved and present.
    pub fn find_label(&self, variant_id: u64) -> Option<&str> {
        self.variants()
            .iter()
            .find(|v| v.id == variant_id)
            .map(|v| v.label.as_str())
    }
}

/// A feature as returned by the backend list endpoint, before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Feature identifier. The backend occasionally emits records without
    /// one; those enrich to an empty variant set and are never looked up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Display name shown to users.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub feature_type: FeatureType,
}

/// A catalog feature enriched with its variant set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub feature_type: FeatureType,
    /// Always present; see [`VariantSet`].
    pub variants: VariantSet,
}

impl Feature {
    /// Attach a variant set to a raw record.
    pub fn from_record(record: FeatureRecord, variants: VariantSet) -> Self {
        Self {
            id: record.id,
            description: record.description,
            feature_type: record.feature_type,
            variants,
        }
    }
}
