//! Category colours.
//!
//! Known categories have fixed palette colours. Any other category gets a
//! pastel colour whose hue is derived from a hash of its name, so the same
//! custom category always renders the same way.

use crate::tasks::models::canonical_category;

/// Saturation of generated colours, in percent.
const GENERATED_SATURATION: u8 = 70;

/// Lightness of generated colours, in percent.
const GENERATED_LIGHTNESS: u8 = 80;

/// Fixed colours for the known categories.
const PALETTE: &[(&str, &str)] = &[
    ("Venue", "#F8BBD0"),
    ("Catering", "#FFE0B2"),
    ("Attire", "#E1BEE7"),
    ("Photography", "#B3E5FC"),
    ("Music", "#C5CAE9"),
    ("Flowers", "#C8E6C9"),
    ("Decor", "#FFF9C4"),
    ("Invitations", "#D7CCC8"),
    ("Transportation", "#B2DFDB"),
    ("Beauty", "#F48FB1"),
    ("Rings", "#FFECB3"),
    ("Honeymoon", "#B2EBF2"),
    ("Legal", "#CFD8DC"),
    ("Other", "#E0E0E0"),
];

/// Colour for a category, as a CSS colour string.
///
/// Known categories (matched ignoring case) return their palette entry;
/// anything else returns `hsl(<hue>, 70%, 80%)`.
#[must_use]
pub fn category_color(category: &str) -> String {
    if let Some(color) = palette_color(category) {
        return color.to_string();
    }
    format!("hsl({}, {GENERATED_SATURATION}%, {GENERATED_LIGHTNESS}%)", category_hue(category))
}

fn palette_color(category: &str) -> Option<&'static str> {
    let known = canonical_category(category)?;
    PALETTE.iter().find(|(name, _)| *name == known).map(|(_, color)| *color)
}

/// Hue in `0..360` derived from the category name.
#[must_use]
pub fn category_hue(category: &str) -> u32 {
    hash_name(category).unsigned_abs() % 360
}

/// 32-bit rolling hash over UTF-16 code units: `hash * 31 + code`, wrapping.
fn hash_name(name: &str) -> i32 {
    name.encode_utf16().fold(0i32, |hash, code| {
        i32::from(code).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::KNOWN_CATEGORIES;

    #[test]
    fn test_every_known_category_has_a_palette_colour() {
        for category in KNOWN_CATEGORIES {
            assert!(palette_color(category).is_some(), "{category} has no colour");
        }
    }

    #[test]
    fn test_known_category_ignores_case() {
        assert_eq!(category_color("venue"), "#F8BBD0");
        assert_eq!(category_color("VENUE"), category_color("Venue"));
    }

    #[test]
    fn test_unknown_category_is_deterministic() {
        let first = category_color("Cake tasting");
        let second = category_color("Cake tasting");
        assert_eq!(first, second);
        assert!(first.starts_with("hsl("));
        assert!(first.ends_with(", 70%, 80%)"));
    }

    #[test]
    fn test_hash_matches_reference_values() {
        // "a" = 97
        assert_eq!(hash_name("a"), 97);
        // "ab" = 97 * 31 + 98
        assert_eq!(hash_name("ab"), 3105);
        assert_eq!(category_hue("ab"), 3105 % 360);
        assert_eq!(hash_name(""), 0);
    }

    #[test]
    fn test_hash_wraps_and_hue_stays_in_range() {
        let long = "Destination welcome bags for out-of-town guests".repeat(4);
        assert!(category_hue(&long) < 360);
        assert!(category_hue("日本の装飾") < 360);
    }

    #[test]
    fn test_hash_handles_minimum_value() {
        assert_eq!(i32::MIN.unsigned_abs() % 360, 128);
    }
}
