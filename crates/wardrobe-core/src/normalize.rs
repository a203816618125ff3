//! Label canonicalization for attribute names.
//!
//! Three forms of the same label exist:
//! - the comparison key ([`normalize_label`]), used only for equality and
//!   dedup, never stored;
//! - the stored name ([`clean_label`] for catalog entries, [`clean_tag`] for
//!   free-text item tags), trimmed with whitespace collapsed;
//! - the display name ([`display_label`]), title-cased so the same attribute
//!   renders identically no matter who typed it.
//!
//! The SQL function `wardrobe_label_key` in the migrations must stay in step
//! with [`normalize_label`].

use crate::defaults::MAX_LABEL_LEN;
use crate::error::{Error, Result};

/// Comparison key: lowercase, trimmed, internal whitespace runs collapsed.
pub fn normalize_label(label: &str) -> String {
    collapse_whitespace(label).to_lowercase()
}

/// Display form: whitespace collapsed, each word title-cased.
pub fn display_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stored form of a user-supplied name.
///
/// Fails with [`Error::InvalidInput`] when the name is blank after trimming
/// or longer than [`MAX_LABEL_LEN`] characters.
pub fn clean_label(label: &str) -> Result<String> {
    let clean = clean_tag(label)?;
    if clean.chars().count() > MAX_LABEL_LEN {
        return Err(Error::InvalidInput(format!(
            "Attribute name must be {} characters or less",
            MAX_LABEL_LEN
        )));
    }
    Ok(clean)
}

/// Stored form of a free-text tag from an item payload.
///
/// Same trimming as [`clean_label`] but without the length cap: item tags
/// are upserted as supplied. Fails only when the tag is blank.
pub fn clean_tag(label: &str) -> Result<String> {
    let clean = collapse_whitespace(label);
    if clean.is_empty() {
        return Err(Error::InvalidInput(
            "Attribute name cannot be empty".to_string(),
        ));
    }
    Ok(clean)
}

/// Whether two labels name the same attribute.
pub fn same_label(a: &str, b: &str) -> bool {
    normalize_label(a) == normalize_label(b)
}

fn collapse_whitespace(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_label("  Blue "), "blue");
        assert_eq!(normalize_label("BLUE"), "blue");
    }

    #[test]
    fn test_normalize_collapses_internal_whitespace() {
        assert_eq!(normalize_label("Navy   \t Blue"), "navy blue");
    }

    #[test]
    fn test_display_title_cases_each_word() {
        assert_eq!(display_label("navy BLUE"), "Navy Blue");
        assert_eq!(display_label("  off-white "), "Off-white");
    }

    #[test]
    fn test_display_is_stable_across_variants() {
        let variants = ["Blue", " blue ", "BLUE", "bLuE"];
        for v in variants {
            assert_eq!(display_label(v), "Blue");
        }
    }

    #[test]
    fn test_display_handles_non_ascii() {
        assert_eq!(display_label("élastane"), "Élastane");
    }

    #[test]
    fn test_clean_label_rejects_blank() {
        assert!(matches!(clean_label("   "), Err(Error::InvalidInput(_))));
        assert!(matches!(clean_label(""), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_clean_label_rejects_too_long() {
        let long = "x".repeat(MAX_LABEL_LEN + 1);
        assert!(matches!(clean_label(&long), Err(Error::InvalidInput(_))));

        let exact = "x".repeat(MAX_LABEL_LEN);
        assert_eq!(clean_label(&exact).unwrap(), exact);
    }

    #[test]
    fn test_clean_label_keeps_casing() {
        assert_eq!(clean_label("  Navy  Blue ").unwrap(), "Navy Blue");
    }

    #[test]
    fn test_clean_tag_has_no_length_cap() {
        let long = format!("Deep   {}", "blue ".repeat(12));
        let clean = clean_tag(&long).unwrap();
        assert!(clean.chars().count() > MAX_LABEL_LEN);
        assert!(clean.starts_with("Deep blue blue"));
        assert!(!clean.ends_with(' '));
        assert!(matches!(clean_tag(" \t "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_same_label() {
        assert!(same_label("Light Grey", "light   grey"));
        assert!(!same_label("Grey", "Gray"));
    }
}
