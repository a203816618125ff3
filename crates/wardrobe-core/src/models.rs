//! Domain types for attribute catalogs, merged options, and item tag sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seasons::Season;

// =============================================================================
// ATTRIBUTE KINDS
// =============================================================================

/// One of the three parallel user-extensible attribute taxonomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Color,
    Material,
    Occasion,
}

impl AttributeKind {
    /// All kinds, in the order item tags are synced.
    pub const ALL: [AttributeKind; 3] = [
        AttributeKind::Color,
        AttributeKind::Material,
        AttributeKind::Occasion,
    ];

    /// Singular label used in log fields and user-facing messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Material => "material",
            Self::Occasion => "occasion",
        }
    }

    /// The item payload field carrying tags of this kind.
    pub fn field(&self) -> TagField {
        match self {
            Self::Color => TagField::Colors,
            Self::Material => TagField::Materials,
            Self::Occasion => TagField::Occasions,
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttributeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "color" | "colors" => Ok(Self::Color),
            "material" | "materials" => Ok(Self::Material),
            "occasion" | "occasions" => Ok(Self::Occasion),
            _ => Err(format!("Invalid attribute kind: {}", s)),
        }
    }
}

/// A tag list on an item payload. Seasons ride alongside the three kinds but
/// go through the fixed-vocabulary linker instead of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagField {
    Colors,
    Materials,
    Occasions,
    Seasons,
}

impl std::fmt::Display for TagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Colors => write!(f, "colors"),
            Self::Materials => write!(f, "materials"),
            Self::Occasions => write!(f, "occasions"),
            Self::Seasons => write!(f, "seasons"),
        }
    }
}

// =============================================================================
// CATALOG ENTRIES
// =============================================================================

/// Curated reference attribute shared by all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MasterAttribute {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

/// A user's own attribute entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserAttribute {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub is_active: bool,
    /// Master entry whose name matched when this row was created or renamed.
    pub mapped_master_id: Option<Uuid>,
    pub created_at_utc: DateTime<Utc>,
}

/// Reference from a user entry to the master entry it resembles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MappedTo {
    pub id: Uuid,
    pub name: String,
}

/// User entry with its master mapping resolved (input to the options merge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedUserAttribute {
    pub id: Uuid,
    pub name: String,
    pub mapped_to: Option<MappedTo>,
}

/// Where a merged option came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OptionSource {
    Master,
    User,
}

/// One entry of the merged option list a user picks from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AttributeOption {
    pub id: Uuid,
    pub name: String,
    pub source: OptionSource,
    pub mapped_to: Option<MappedTo>,
}

// =============================================================================
// ITEM TAGS
// =============================================================================

/// The four tag-name lists extracted from an item create payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTags {
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub occasions: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<String>,
}

impl ItemTags {
    /// Names supplied for one attribute kind.
    pub fn names(&self, kind: AttributeKind) -> &[String] {
        match kind {
            AttributeKind::Color => &self.colors,
            AttributeKind::Material => &self.materials,
            AttributeKind::Occasion => &self.occasions,
        }
    }
}

/// Tag fields present in an item update. `None` means the field was absent
/// from the payload and its links are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTagChanges {
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub materials: Option<Vec<String>>,
    #[serde(default)]
    pub occasions: Option<Vec<String>>,
    #[serde(default)]
    pub seasons: Option<Vec<String>>,
}

impl ItemTagChanges {
    /// Names supplied for one attribute kind, if the field was present.
    pub fn names(&self, kind: AttributeKind) -> Option<&[String]> {
        match kind {
            AttributeKind::Color => self.colors.as_deref(),
            AttributeKind::Material => self.materials.as_deref(),
            AttributeKind::Occasion => self.occasions.as_deref(),
        }
    }

    /// True when no tag field is present.
    pub fn is_empty(&self) -> bool {
        self.colors.is_none()
            && self.materials.is_none()
            && self.occasions.is_none()
            && self.seasons.is_none()
    }
}

/// Tag sets currently linked to an item, read back through the pivot tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemTagSet {
    pub colors: Vec<String>,
    pub materials: Vec<String>,
    pub occasions: Vec<String>,
    pub seasons: Vec<Season>,
}
