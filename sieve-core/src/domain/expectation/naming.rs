// sieve-core/src/domain/expectation/naming.rs
//
// External engines report expectation types in snake_case
// (`expect_column_values_to_not_be_null`) while configs use PascalCase.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)] // literal patterns
static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid acronym boundary regex"));

#[allow(clippy::expect_used)]
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid camel boundary regex"));

/// `expect_column_to_exist` -> `ExpectColumnToExist`
pub fn to_pascal_case(name: &str) -> String {
    name.trim()
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// `ExpectColumnToExist` -> `expect_column_to_exist`
pub fn to_snake_case(name: &str) -> String {
    let split_acronyms = ACRONYM_BOUNDARY.replace_all(name.trim(), "${1}_${2}");
    CAMEL_BOUNDARY
        .replace_all(&split_acronyms, "${1}_${2}")
        .to_lowercase()
}

/// Canonical registry spelling for a user- or engine-supplied name.
pub fn canonical_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let starts_lower = trimmed.chars().next().is_some_and(char::is_lowercase);
    if trimmed.contains('_') || starts_lower {
        to_pascal_case(trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(
            to_pascal_case("expect_column_values_to_not_be_null"),
            "ExpectColumnValuesToNotBeNull"
        );
        assert_eq!(to_pascal_case("  expect__column "), "ExpectColumn");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(
            to_snake_case("ExpectColumnValuesToBeUnique"),
            "expect_column_values_to_be_unique"
        );
    }

    #[test]
    fn test_canonical_name_keeps_pascal() {
        assert_eq!(canonical_name("ExpectColumnToExist"), "ExpectColumnToExist");
        assert_eq!(canonical_name("expect_column_to_exist"), "ExpectColumnToExist");
    }

    #[test]
    fn test_round_trip_through_snake_case() {
        let name = "ExpectColumnValueZScoresToBeLessThan";
        assert_eq!(to_snake_case(name), "expect_column_value_z_scores_to_be_less_than");
        assert_eq!(to_pascal_case(&to_snake_case(name)), name);
    }
}
