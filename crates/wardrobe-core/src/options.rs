//! Merged option lists: master entries plus a user's own entries.

use std::collections::HashMap;

use crate::models::{AttributeOption, MappedTo, MappedUserAttribute, MasterAttribute, OptionSource};
use crate::normalize::{display_label, normalize_label};

/// Merge master and user entries into one option per normalized name.
///
/// Master entries are inserted first and win: a user entry whose normalized
/// name matches an existing key is hidden, not merged. Names (and mapped-to
/// names) are rendered with [`display_label`]. The result is sorted
/// case-insensitively by display name.
///
/// Callers filter by `is_active` before merging; this function does not.
pub fn merge_options(
    masters: Vec<MasterAttribute>,
    users: Vec<MappedUserAttribute>,
) -> Vec<AttributeOption> {
    let mut merged: HashMap<String, AttributeOption> =
        HashMap::with_capacity(masters.len() + users.len());

    for master in masters {
        let key = normalize_label(&master.name);
        merged.entry(key).or_insert_with(|| AttributeOption {
            id: master.id,
            name: display_label(&master.name),
            source: OptionSource::Master,
            mapped_to: None,
        });
    }

    for user in users {
        let key = normalize_label(&user.name);
        if merged.contains_key(&key) {
            continue;
        }
        let mapped_to = user.mapped_to.map(|m| MappedTo {
            id: m.id,
            name: display_label(&m.name),
        });
        merged.insert(
            key,
            AttributeOption {
                id: user.id,
                name: display_label(&user.name),
                source: OptionSource::User,
                mapped_to,
            },
        );
    }

    let mut options: Vec<AttributeOption> = merged.into_values().collect();
    options.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    options
}
