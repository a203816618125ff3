//! Fixed season vocabulary.
//!
//! Seasons are not user-extensible: free-text labels are mapped onto four
//! canonical values and anything unrecognized is dropped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_label;

/// Canonical season.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

/// Accepted spellings, keyed by normalized label.
const SEASON_ALIASES: &[(&str, Season)] = &[
    ("spring", Season::Spring),
    ("summer", Season::Summer),
    ("autumn", Season::Autumn),
    ("fall", Season::Autumn),
    ("winter", Season::Winter),
];

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    /// Canonical name as stored in the `seasons` table.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        }
    }

    /// Map a free-text label onto the vocabulary. `"Fall"` is `Autumn`.
    pub fn from_label(label: &str) -> Option<Season> {
        let key = normalize_label(label);
        SEASON_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, season)| *season)
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Store ids of the canonical seasons, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct SeasonCatalog {
    ids: HashMap<Season, i32>,
}

impl SeasonCatalog {
    /// Build from `(name, id)` rows of the seasons table. Rows whose name is
    /// not a canonical season are ignored.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        let ids = rows
            .into_iter()
            .filter_map(|(name, id)| Season::from_label(name.as_ref()).map(|s| (s, id)))
            .collect();
        Self { ids }
    }

    pub fn id_of(&self, season: Season) -> Option<i32> {
        self.ids.get(&season).copied()
    }

    pub fn season_of(&self, id: i32) -> Option<Season> {
        self.ids
            .iter()
            .find(|(_, season_id)| **season_id == id)
            .map(|(season, _)| *season)
    }

    /// Canonical seasons missing from the store.
    pub fn missing(&self) -> Vec<Season> {
        Season::ALL
            .into_iter()
            .filter(|s| !self.ids.contains_key(s))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolve labels to seasons, dropping unrecognized ones and repeats while
/// keeping first-seen order.
pub fn resolve_seasons<S: AsRef<str>>(labels: &[S]) -> Vec<Season> {
    let mut seen = Vec::with_capacity(labels.len());
    for label in labels {
        if let Some(season) = Season::from_label(label.as_ref()) {
            if !seen.contains(&season) {
                seen.push(season);
            }
        }
    }
    seen
}
