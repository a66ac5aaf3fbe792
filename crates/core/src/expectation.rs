//! What a nested parse is asked to produce.
//!
//! An expectation is immutable; parsers derive new ones with the `with_*`
//! builders before delegating to a sub-parser.

use crate::parser::result::ResultCategory;
use crate::types;
use exprscope_api::{HostTypeSystem, TypeRef};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseExpectation {
    pub category: ResultCategory,
    /// Acceptable types; `None` means any type
    pub expected_types: Option<Vec<TypeRef>>,
    /// The whole remaining input must be consumed
    pub must_consume: bool,
    /// `expected_types` rejects results instead of only ranking completions
    pub hard: bool,
}

impl ParseExpectation {
    fn of(category: ResultCategory) -> Self {
        Self {
            category,
            expected_types: None,
            must_consume: false,
            hard: false,
        }
    }

    pub fn value() -> Self {
        Self::of(ResultCategory::Value)
    }

    pub fn type_reference() -> Self {
        Self::of(ResultCategory::TypeReference)
    }

    pub fn package_reference() -> Self {
        Self::of(ResultCategory::PackageReference)
    }

    pub fn with_category(&self, category: ResultCategory) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    /// Ranking hint only.
    pub fn with_hint(&self, types: Vec<TypeRef>) -> Self {
        Self {
            expected_types: Some(types),
            hard: false,
            ..self.clone()
        }
    }

    /// Hard constraint: results of other types are rejected.
    pub fn with_required(&self, types: Vec<TypeRef>) -> Self {
        Self {
            expected_types: Some(types),
            hard: true,
            ..self.clone()
        }
    }

    pub fn without_types(&self) -> Self {
        Self {
            expected_types: None,
            hard: false,
            ..self.clone()
        }
    }

    pub fn consuming(&self, must_consume: bool) -> Self {
        Self {
            must_consume,
            ..self.clone()
        }
    }

    /// Expectation for a nested unit: same constraints, minimal extent.
    pub fn nested(&self) -> Self {
        self.consuming(false)
    }

    /// Expectation for an operand: a value ranked by the same types, never a
    /// hard constraint and never required to reach the end of input.
    pub fn operand(&self) -> Self {
        Self {
            category: ResultCategory::Value,
            expected_types: self.expected_types.clone(),
            must_consume: false,
            hard: false,
        }
    }

    pub fn expected_types(&self) -> Option<&[TypeRef]> {
        self.expected_types.as_deref()
    }

    /// Whether a value of type `ty` satisfies a hard constraint.
    pub fn accepts_type(&self, ty: &TypeRef, ts: &dyn HostTypeSystem) -> bool {
        match (&self.expected_types, self.hard) {
            (Some(types), true) => types.iter().any(|expected| types::is_convertible(ty, expected, ts)),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_does_not_mutate() {
        let top = ParseExpectation::value().consuming(true);
        let hinted = top.with_hint(vec![TypeRef::INT]);
        let nested = hinted.nested();
        assert!(top.must_consume);
        assert!(top.expected_types.is_none());
        assert!(!nested.must_consume);
        assert_eq!(nested.expected_types(), Some(&[TypeRef::INT][..]));
        assert!(!nested.hard);
        assert!(hinted.with_required(vec![TypeRef::LONG]).hard);
        assert_eq!(
            top.with_category(ResultCategory::TypeReference).category,
            ResultCategory::TypeReference
        );
    }
}
