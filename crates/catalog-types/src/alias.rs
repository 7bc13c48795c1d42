//! Positional alias encoding.
//!
//! Each catalog level labels its records by rank (1-based position among
//! siblings in creation order) using its own numbering system:
//! - Topic: bijective base-26 letters (`A`..`Z`, `AA`, `AB`, ...)
//! - Style: plain decimal (`1`, `2`, ...)
//! - Place: Roman numerals (`I`, `II`, `IV`, ...)
//!
//! All encoders are pure and never touch storage.

use serde::{Deserialize, Serialize};

/// Roman numeral symbols in greedy consumption order.
const ROMAN_TABLE: &[(&str, i64)] = &[
    ("M", 1000),
    ("CM", 900),
    ("D", 500),
    ("CD", 400),
    ("C", 100),
    ("XC", 90),
    ("L", 50),
    ("XL", 40),
    ("X", 10),
    ("IX", 9),
    ("V", 5),
    ("IV", 4),
    ("I", 1),
];

/// Encode a rank as bijective base-26 letters.
///
/// `1 -> "A"`, `26 -> "Z"`, `27 -> "AA"`, `703 -> "AAA"`. There is no zero
/// digit. Non-positive ranks yield `"A"`.
pub fn base26(rank: i64) -> String {
    let mut rank = rank;
    let mut letters = Vec::new();
    while rank > 0 {
        rank -= 1;
        letters.push((b'A' + (rank % 26) as u8) as char);
        rank /= 26;
    }
    if letters.is_empty() {
        return "A".to_string();
    }
    letters.iter().rev().collect()
}

/// Inverse of [`base26`]: `"A" -> 1`, `"AA" -> 27`.
///
/// Returns `None` for an empty string, anything outside `A`..`Z`, or a
/// value too large for `i64`.
pub fn base26_rank(alias: &str) -> Option<i64> {
    if alias.is_empty() {
        return None;
    }
    alias.bytes().try_fold(0i64, |acc, b| {
        if !b.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(i64::from(b - b'A' + 1))
    })
}

/// Encode a rank as a decimal string. No padding.
pub fn decimal(rank: i64) -> String {
    rank.to_string()
}

/// Encode a rank as a subtractive-notation Roman numeral.
///
/// Non-positive ranks yield an empty string.
pub fn roman(rank: i64) -> String {
    let mut remaining = rank;
    let mut out = String::new();
    for (symbol, value) in ROMAN_TABLE {
        while remaining >= *value {
            out.push_str(symbol);
            remaining -= value;
        }
    }
    out
}

/// Numbering system used to derive an alias from a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasScheme {
    Base26,
    Decimal,
    Roman,
}

impl AliasScheme {
    /// Encode `rank` in this scheme.
    pub fn encode(self, rank: i64) -> String {
        match self {
            AliasScheme::Base26 => base26(rank),
            AliasScheme::Decimal => decimal(rank),
            AliasScheme::Roman => roman(rank),
        }
    }
}

/// Level of the catalog hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogLevel {
    Topic,
    Style,
    Place,
    Item,
}

impl CatalogLevel {
    /// Alias scheme for this level. Items carry no generated alias.
    pub fn scheme(self) -> Option<AliasScheme> {
        match self {
            CatalogLevel::Topic => Some(AliasScheme::Base26),
            CatalogLevel::Style => Some(AliasScheme::Decimal),
            CatalogLevel::Place => Some(AliasScheme::Roman),
            CatalogLevel::Item => None,
        }
    }

    /// Short name used in storage keys and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            CatalogLevel::Topic => "topic",
            CatalogLevel::Style => "style",
            CatalogLevel::Place => "place",
            CatalogLevel::Item => "item",
        }
    }
}

impl std::fmt::Display for CatalogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLevel::Topic => write!(f, "Topic"),
            CatalogLevel::Style => write!(f, "Style"),
            CatalogLevel::Place => write!(f, "Place"),
            CatalogLevel::Item => write!(f, "Item"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base26_known_values() {
        assert_eq!(base26(1), "A");
        assert_eq!(base26(2), "B");
        assert_eq!(base26(26), "Z");
        assert_eq!(base26(27), "AA");
        assert_eq!(base26(28), "AB");
        assert_eq!(base26(52), "AZ");
        assert_eq!(base26(53), "BA");
        assert_eq!(base26(702), "ZZ");
        assert_eq!(base26(703), "AAA");
    }

    #[test]
    fn test_base26_roundtrip_first_thousand() {
        for rank in 1..=1000 {
            let encoded = base26(rank);
            assert!(encoded.bytes().all(|b| b.is_ascii_uppercase()));
            assert_eq!(base26_rank(&encoded), Some(rank), "rank {} -> {}", rank, encoded);
        }
    }

    #[test]
    fn test_base26_non_positive_defaults_to_a() {
        assert_eq!(base26(0), "A");
        assert_eq!(base26(-5), "A");
    }

    #[test]
    fn test_base26_rank_rejects_foreign_aliases() {
        assert_eq!(base26_rank(""), None);
        assert_eq!(base26_rank("a"), None);
        assert_eq!(base26_rank("A1"), None);
        assert_eq!(base26_rank(&"Z".repeat(20)), None);
        assert_eq!(base26_rank("ZZ"), Some(702));
    }

    #[test]
    fn test_decimal() {
        assert_eq!(decimal(1), "1");
        assert_eq!(decimal(10), "10");
        assert_eq!(decimal(0), "0");
    }

    #[test]
    fn test_roman_canonical_table() {
        let expected = [
            "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII",
            "XIV", "XV", "XVI", "XVII", "XVIII", "XIX", "XX",
        ];
        for (i, numeral) in expected.iter().enumerate() {
            assert_eq!(roman(i as i64 + 1), *numeral);
        }
        assert_eq!(roman(40), "XL");
        assert_eq!(roman(90), "XC");
        assert_eq!(roman(1994), "MCMXCIV");
    }

    #[test]
    fn test_roman_non_positive_is_empty() {
        assert_eq!(roman(0), "");
        assert_eq!(roman(-3), "");
    }

    #[test]
    fn test_level_schemes() {
        assert_eq!(CatalogLevel::Topic.scheme(), Some(AliasScheme::Base26));
        assert_eq!(CatalogLevel::Style.scheme(), Some(AliasScheme::Decimal));
        assert_eq!(CatalogLevel::Place.scheme(), Some(AliasScheme::Roman));
        assert_eq!(CatalogLevel::Item.scheme(), None);
        assert_eq!(AliasScheme::Roman.encode(4), "IV");
    }
}
