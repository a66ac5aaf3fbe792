//! Completion candidates and their assembly into a ranked list.

use crate::rating::{MatchRating, StringMatch, TypeMatch, rate_string_match, rate_type_match};
use crate::settings::CompletionMode;
use crate::tokenizer::CompletionInfo;
use exprscope_api::{
    ExecutableInfo, FieldInfo, HostTypeSystem, Modifiers, OBJECT_CLASS, TypeRef, package_of,
    simple_class_name,
};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Field,
    Method,
    Class,
    Package,
    Keyword,
    Variable,
    HierarchyNode,
}

impl CompletionKind {
    pub fn label(self) -> &'static str {
        match self {
            CompletionKind::Field => "field",
            CompletionKind::Method => "method",
            CompletionKind::Class => "class",
            CompletionKind::Package => "package",
            CompletionKind::Keyword => "keyword",
            CompletionKind::Variable => "variable",
            CompletionKind::HierarchyNode => "node",
        }
    }
}

/// A single suggestion: replace `[insertion_start, insertion_end)` with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeCompletion {
    pub kind: CompletionKind,
    pub text: String,
    pub display_text: String,
    pub insertion_start: usize,
    pub insertion_end: usize,
    #[serde(skip)]
    pub rating: MatchRating,
}

impl CodeCompletion {
    /// Apply this completion to `input`, returning the new text and caret.
    pub fn apply(&self, input: &str) -> (String, usize) {
        let start = self.insertion_start.min(input.len());
        let end = self.insertion_end.clamp(start, input.len());
        let mut result = String::with_capacity(input.len() + self.text.len());
        result.push_str(&input[..start]);
        result.push_str(&self.text);
        result.push_str(&input[end..]);
        (result, start + self.text.len())
    }
}

/// Completions collected at one caret position, possibly from several parsers.
#[derive(Debug, Clone, Default)]
pub struct CompletionSuggestions {
    pub position: usize,
    pub completions: Vec<CodeCompletion>,
}

impl CompletionSuggestions {
    pub fn empty(position: usize) -> Self {
        Self {
            position,
            completions: Vec::new(),
        }
    }

    pub fn new(position: usize, completions: Vec<CodeCompletion>) -> Self {
        Self {
            position,
            completions,
        }
    }

    pub fn merge(mut self, other: CompletionSuggestions) -> Self {
        self.completions.extend(other.completions);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }

    /// Move every span by `offset`, for suggestions computed on a substring.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.position += offset;
        for completion in &mut self.completions {
            completion.insertion_start += offset;
            completion.insertion_end += offset;
        }
        self
    }

    /// Deduplicate and sort best first; equal ratings are ordered by text.
    pub fn into_ranked(self) -> Vec<CodeCompletion> {
        let mut completions = self.completions;
        completions.sort_by(|a, b| {
            a.rating
                .cmp(&b.rating)
                .then_with(|| a.text.cmp(&b.text))
                .then_with(|| a.display_text.cmp(&b.display_text))
        });
        let mut seen = HashSet::new();
        completions.retain(|c| {
            seen.insert((
                c.kind,
                c.text.clone(),
                c.display_text.clone(),
                c.insertion_start,
                c.insertion_end,
            ))
        });
        completions
    }
}

/// Methods of `java.lang.Object` that are legal but rarely meant.
const DISCOURAGED_OBJECT_METHODS: &[&str] = &["wait", "notify", "notifyAll", "finalize"];

pub fn is_access_discouraged(modifiers: &Modifiers, name: &str, declaring_type: &str) -> bool {
    modifiers.access < exprscope_api::AccessModifier::Public
        || (declaring_type == OBJECT_CLASS && DISCOURAGED_OBJECT_METHODS.contains(&name))
}

/// Builds rated completions for one completion request.
pub struct CompletionFactory<'a> {
    info: &'a CompletionInfo,
    mode: CompletionMode,
    expected_types: Option<&'a [TypeRef]>,
    ts: &'a dyn HostTypeSystem,
}

impl<'a> CompletionFactory<'a> {
    pub fn new(
        info: &'a CompletionInfo,
        mode: CompletionMode,
        expected_types: Option<&'a [TypeRef]>,
        ts: &'a dyn HostTypeSystem,
    ) -> Self {
        Self {
            info,
            mode,
            expected_types,
            ts,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.info.prefix
    }

    fn insertion_end(&self) -> usize {
        match self.mode {
            CompletionMode::ReplaceUntilCaret => self.info.caret,
            CompletionMode::ReplaceWholeToken => self.info.token_end,
        }
    }

    fn build(
        &self,
        kind: CompletionKind,
        text: String,
        display_text: String,
        rating: MatchRating,
    ) -> CodeCompletion {
        CodeCompletion {
            kind,
            text,
            display_text,
            insertion_start: self.info.token_start,
            insertion_end: self.insertion_end(),
            rating,
        }
    }

    fn name_match(&self, name: &str) -> Option<StringMatch> {
        let string_match = rate_string_match(name, &self.info.prefix);
        (string_match != StringMatch::None).then_some(string_match)
    }

    fn type_match(&self, ty: &TypeRef) -> TypeMatch {
        rate_type_match(self.expected_types, ty, self.ts)
    }

    pub fn suggestions(&self, completions: Vec<CodeCompletion>) -> CompletionSuggestions {
        CompletionSuggestions::new(self.info.token_start, completions)
    }

    pub fn fields<'f>(
        &self,
        fields: impl IntoIterator<Item = &'f FieldInfo>,
    ) -> Vec<CodeCompletion> {
        fields
            .into_iter()
            .filter_map(|field| {
                let string_match = self.name_match(&field.name)?;
                let rating = MatchRating::new(
                    string_match,
                    self.type_match(&field.type_ref),
                    is_access_discouraged(&field.modifiers, &field.name, &field.declaring_type),
                );
                let display = format!(
                    "{} : {} ({})",
                    field.name,
                    field.type_ref.simple_name(),
                    simple_class_name(&field.declaring_type)
                );
                Some(self.build(CompletionKind::Field, field.name.clone(), display, rating))
            })
            .collect()
    }

    pub fn methods<'m>(
        &self,
        methods: impl IntoIterator<Item = &'m ExecutableInfo>,
    ) -> Vec<CodeCompletion> {
        methods
            .into_iter()
            .filter_map(|method| {
                let string_match = self.name_match(&method.name)?;
                let rating = MatchRating::new(
                    string_match,
                    self.type_match(&method.return_type),
                    is_access_discouraged(&method.modifiers, &method.name, &method.declaring_type),
                );
                let text = if method.parameters.is_empty() {
                    format!("{}()", method.name)
                } else {
                    format!("{}(", method.name)
                };
                let display = format!(
                    "{} : {} ({})",
                    method.signature(),
                    method.return_type.simple_name(),
                    simple_class_name(&method.declaring_type)
                );
                Some(self.build(CompletionKind::Method, text, display, rating))
            })
            .collect()
    }

    /// Class completions; `qualified` inserts the fully qualified name instead
    /// of the simple name (used for classes that are not imported).
    pub fn classes<'c>(
        &self,
        classes: impl IntoIterator<Item = &'c str>,
        qualified: bool,
    ) -> Vec<CodeCompletion> {
        classes
            .into_iter()
            .filter_map(|fqn| {
                let simple = simple_class_name(fqn);
                let string_match = self.name_match(simple)?;
                let discouraged = self
                    .ts
                    .class_info(fqn)
                    .is_some_and(|info| info.modifiers.access < exprscope_api::AccessModifier::Public);
                let rating =
                    MatchRating::new(string_match, self.type_match(&TypeRef::class(fqn)), discouraged);
                let text = if qualified {
                    fqn.replace('$', ".")
                } else {
                    simple.to_string()
                };
                let package = package_of(fqn);
                let display = if package.is_empty() {
                    simple.to_string()
                } else {
                    format!("{simple} ({package})")
                };
                Some(self.build(CompletionKind::Class, text, display, rating))
            })
            .collect()
    }

    /// Primitive type names, offered where a type is expected.
    pub fn primitive_types(&self) -> Vec<CodeCompletion> {
        exprscope_api::PrimitiveKind::ALL
            .iter()
            .filter(|kind| !matches!(kind, exprscope_api::PrimitiveKind::Void))
            .filter_map(|kind| {
                let string_match = self.name_match(kind.name())?;
                Some(self.build(
                    CompletionKind::Keyword,
                    kind.name().to_string(),
                    kind.name().to_string(),
                    MatchRating::name_only(string_match),
                ))
            })
            .collect()
    }

    /// Package completions; `packages` are full names, the last segment is inserted.
    pub fn packages<'p>(&self, packages: impl IntoIterator<Item = &'p str>) -> Vec<CodeCompletion> {
        packages
            .into_iter()
            .filter_map(|package| {
                let last = package.rsplit('.').next().unwrap_or(package);
                let string_match = self.name_match(last)?;
                Some(self.build(
                    CompletionKind::Package,
                    last.to_string(),
                    package.to_string(),
                    MatchRating::name_only(string_match),
                ))
            })
            .collect()
    }

    pub fn keywords<'k>(
        &self,
        keywords: impl IntoIterator<Item = (&'k str, Option<TypeRef>)>,
    ) -> Vec<CodeCompletion> {
        keywords
            .into_iter()
            .filter_map(|(keyword, ty)| {
                let string_match = self.name_match(keyword)?;
                let type_match = ty.map_or(TypeMatch::None, |ty| self.type_match(&ty));
                Some(self.build(
                    CompletionKind::Keyword,
                    keyword.to_string(),
                    keyword.to_string(),
                    MatchRating::new(string_match, type_match, false),
                ))
            })
            .collect()
    }

    pub fn variable(&self, name: &str, ty: &TypeRef) -> Option<CodeCompletion> {
        let string_match = self.name_match(name)?;
        Some(self.build(
            CompletionKind::Variable,
            name.to_string(),
            format!("{name} : {}", ty.simple_name()),
            MatchRating::new(string_match, self.type_match(ty), false),
        ))
    }

    pub fn hierarchy_node(&self, name: &str, ty: Option<&TypeRef>) -> Option<CodeCompletion> {
        let string_match = self.name_match(name)?;
        let type_match = ty.map_or(TypeMatch::None, |ty| self.type_match(ty));
        Some(self.build(
            CompletionKind::HierarchyNode,
            name.to_string(),
            name.to_string(),
            MatchRating::new(string_match, type_match, false),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(text: &str, rating: MatchRating) -> CodeCompletion {
        CodeCompletion {
            kind: CompletionKind::Field,
            text: text.to_string(),
            display_text: text.to_string(),
            insertion_start: 0,
            insertion_end: 1,
            rating,
        }
    }

    #[test]
    fn test_ranking_and_dedup() {
        let prefix = MatchRating::name_only(StringMatch::Prefix);
        let full = MatchRating::name_only(StringMatch::Full);
        let suggestions = CompletionSuggestions::new(
            0,
            vec![
                completion("xyz", prefix),
                completion("xy", prefix),
                completion("x", full),
                completion("xy", prefix),
            ],
        );
        let texts: Vec<_> = suggestions
            .into_ranked()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["x", "xy", "xyz"]);
    }

    #[test]
    fn test_apply_replaces_span() {
        let c = CodeCompletion {
            kind: CompletionKind::Method,
            text: "length()".to_string(),
            display_text: String::new(),
            insertion_start: 2,
            insertion_end: 4,
            rating: MatchRating::name_only(StringMatch::Prefix),
        };
        assert_eq!(c.apply("s.le"), ("s.length()".to_string(), 10));
    }
}
