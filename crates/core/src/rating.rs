//! Match ratings used both to validate candidates and to rank completions.
//!
//! Every enum here lists its variants best first, so the derived `Ord` sorts
//! the most suitable candidate to the front.

use crate::types;
use exprscope_api::{HostTypeSystem, TypeRef};

/// How well a candidate name matches what has been typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StringMatch {
    Full,
    Prefix,
    FullIgnoreCase,
    PrefixIgnoreCase,
    /// Camel-hump abbreviation or substring match
    Fragment,
    None,
}

/// How well a candidate's type fits the expected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeMatch {
    Full,
    Inheritance,
    PrimitiveConversion,
    Boxing,
    /// Boxing or unboxing combined with widening or inheritance
    BoxingAndConversion,
    None,
}

/// Combined rating; sorts by name match, then type match, then accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchRating {
    pub string_match: StringMatch,
    pub type_match: TypeMatch,
    pub access_discouraged: bool,
}

impl MatchRating {
    pub fn new(string_match: StringMatch, type_match: TypeMatch, access_discouraged: bool) -> Self {
        Self {
            string_match,
            type_match,
            access_discouraged,
        }
    }

    /// Rating for candidates without a type, like packages and keywords.
    pub fn name_only(string_match: StringMatch) -> Self {
        Self::new(string_match, TypeMatch::None, false)
    }

    pub fn is_name_match(&self) -> bool {
        self.string_match != StringMatch::None
    }
}

pub fn rate_string_match(actual: &str, expected: &str) -> StringMatch {
    if actual == expected {
        return StringMatch::Full;
    }
    if actual.starts_with(expected) {
        return StringMatch::Prefix;
    }
    let actual_lower = actual.to_lowercase();
    let expected_lower = expected.to_lowercase();
    if actual_lower == expected_lower {
        return StringMatch::FullIgnoreCase;
    }
    if actual_lower.starts_with(&expected_lower) {
        return StringMatch::PrefixIgnoreCase;
    }
    if matches_camel_humps(actual, expected) || actual_lower.contains(&expected_lower) {
        return StringMatch::Fragment;
    }
    StringMatch::None
}

fn camel_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if (c.is_uppercase() || c == '_') && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        if c != '_' {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `gSN` matches `getSimpleName`: each typed hump must prefix a later word.
fn matches_camel_humps(actual: &str, expected: &str) -> bool {
    let expected_words = camel_words(expected);
    if expected_words.len() < 2 {
        return false;
    }
    let actual_words = camel_words(actual);
    let mut actual_iter = actual_words.iter();
    expected_words.iter().all(|hump| {
        let hump = hump.to_lowercase();
        actual_iter
            .by_ref()
            .any(|word| word.to_lowercase().starts_with(&hump))
    })
}

/// Best type match of `actual` against any of the expected types.
///
/// Without expectations every type rates [`TypeMatch::None`], which keeps name
/// matching the only ranking criterion.
pub fn rate_type_match(
    expected: Option<&[TypeRef]>,
    actual: &TypeRef,
    ts: &dyn HostTypeSystem,
) -> TypeMatch {
    expected
        .into_iter()
        .flatten()
        .map(|ty| types::rate_conversion(actual, ty, ts))
        .min()
        .unwrap_or(TypeMatch::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_match_grades_are_strictly_ordered() {
        assert_eq!(rate_string_match("xy", "xy"), StringMatch::Full);
        assert_eq!(rate_string_match("xyz", "xy"), StringMatch::Prefix);
        assert_eq!(rate_string_match("XY", "xy"), StringMatch::FullIgnoreCase);
        assert_eq!(rate_string_match("XYZ", "xy"), StringMatch::PrefixIgnoreCase);
        assert_eq!(rate_string_match("getSimpleName", "gSN"), StringMatch::Fragment);
        assert_eq!(rate_string_match("toUpperCase", "upper"), StringMatch::Fragment);
        assert_eq!(rate_string_match("abc", "xyz"), StringMatch::None);
        assert!(StringMatch::Full < StringMatch::Prefix);
        assert!(StringMatch::Prefix < StringMatch::FullIgnoreCase);
        assert!(StringMatch::PrefixIgnoreCase < StringMatch::Fragment);
    }

    #[test]
    fn test_empty_query_is_prefix_of_everything() {
        assert_eq!(rate_string_match("anything", ""), StringMatch::Prefix);
    }

    #[test]
    fn test_rating_order_name_then_type_then_access() {
        let exact_name = MatchRating::new(StringMatch::Full, TypeMatch::None, true);
        let prefix_name = MatchRating::new(StringMatch::Prefix, TypeMatch::Full, false);
        assert!(exact_name < prefix_name);

        let better_type = MatchRating::new(StringMatch::Prefix, TypeMatch::Inheritance, true);
        let worse_type = MatchRating::new(StringMatch::Prefix, TypeMatch::Boxing, false);
        assert!(better_type < worse_type);

        let accessible = MatchRating::new(StringMatch::Prefix, TypeMatch::Boxing, false);
        let discouraged = MatchRating::new(StringMatch::Prefix, TypeMatch::Boxing, true);
        assert!(accessible < discouraged);
    }
}
