//! Overload resolution.
//!
//! Arguments are parsed one at a time; between arguments the parser narrows
//! the candidate set with [`accepts_argument_count`] and
//! [`accepts_argument_at`]. After the closing parenthesis [`resolve`] runs the
//! graduated phases: fixed arity before variable arity, and within each the
//! strict, loose and boxing steps. The first non-empty step wins and its most
//! specific candidate is selected.

use crate::object_info::ObjectInfo;
use crate::rating::TypeMatch;
use crate::types;
use exprscope_api::{ExecutableInfo, HostTypeSystem, JavaArray, TypeRef, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Resolution {
    pub executable: Arc<ExecutableInfo>,
    /// Trailing arguments are packed into the variadic array
    pub expanded_varargs: bool,
}

#[derive(Debug, Clone)]
pub enum ResolveError {
    NoMatch,
    Ambiguous(Vec<Arc<ExecutableInfo>>),
}

impl ResolveError {
    pub fn describe(&self, name: &str, arg_types: &[TypeRef]) -> String {
        match self {
            ResolveError::NoMatch => {
                let args = arg_types
                    .iter()
                    .map(TypeRef::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("No member '{name}' matches the given arguments ({args})")
            }
            ResolveError::Ambiguous(candidates) => {
                let listed = candidates
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Ambiguous call of '{name}', candidates: {listed}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Strict,
    Loose,
    Boxing,
}

impl Step {
    const ALL: [Step; 3] = [Step::Strict, Step::Loose, Step::Boxing];

    fn allows(self, rating: TypeMatch) -> bool {
        match self {
            Step::Strict => rating == TypeMatch::Full,
            Step::Loose => rating <= TypeMatch::PrimitiveConversion,
            Step::Boxing => rating != TypeMatch::None,
        }
    }
}

fn variadic_element(executable: &ExecutableInfo) -> Option<&TypeRef> {
    if !executable.is_varargs {
        return None;
    }
    executable.parameters.last()?.type_ref.element_type()
}

/// Whether `executable` can take an argument at position `index`.
pub fn accepts_argument_count(executable: &ExecutableInfo, index: usize) -> bool {
    index < executable.parameters.len() || variadic_element(executable).is_some()
}

/// Whether `executable` can be called with exactly `count` arguments.
pub fn accepts_total_count(executable: &ExecutableInfo, count: usize) -> bool {
    let params = executable.parameters.len();
    count == params || (variadic_element(executable).is_some() && count + 1 >= params)
}

/// Parameter types an argument at `index` may be converted to.
fn parameter_types_at(executable: &ExecutableInfo, index: usize) -> Vec<&TypeRef> {
    let params = &executable.parameters;
    match variadic_element(executable) {
        Some(element) if index + 1 == params.len() => vec![&params[index].type_ref, element],
        Some(element) if index >= params.len() => vec![element],
        _ => params.get(index).map(|p| &p.type_ref).into_iter().collect(),
    }
}

/// Union of the types the live candidates accept at `index`.
pub fn expected_argument_types(candidates: &[Arc<ExecutableInfo>], index: usize) -> Vec<TypeRef> {
    let mut types: Vec<TypeRef> = Vec::new();
    for candidate in candidates {
        for ty in parameter_types_at(candidate, index) {
            if !types.contains(ty) {
                types.push(ty.clone());
            }
        }
    }
    types
}

pub fn accepts_argument_at(
    executable: &ExecutableInfo,
    index: usize,
    arg_type: &TypeRef,
    ts: &dyn HostTypeSystem,
) -> bool {
    parameter_types_at(executable, index)
        .into_iter()
        .any(|param| types::is_convertible(arg_type, param, ts))
}

fn matches_fixed_arity<F>(executable: &ExecutableInfo, arg_types: &[TypeRef], mut matches: F) -> bool
where
    F: FnMut(&TypeRef, &TypeRef) -> bool,
{
    executable.parameters.len() == arg_types.len()
        && executable
            .parameter_types()
            .zip(arg_types)
            .all(|(param, arg)| matches(arg, param))
}

fn matches_variable_arity<F>(executable: &ExecutableInfo, arg_types: &[TypeRef], mut matches: F) -> bool
where
    F: FnMut(&TypeRef, &TypeRef) -> bool,
{
    let Some(element) = variadic_element(executable) else {
        return false;
    };
    let fixed_count = executable.parameters.len() - 1;
    if arg_types.len() < fixed_count {
        return false;
    }
    executable
        .parameter_types()
        .take(fixed_count)
        .zip(arg_types)
        .all(|(param, arg)| matches(arg, param))
        && arg_types[fixed_count..].iter().all(|arg| matches(arg, element))
}

fn collect_matching<F>(candidates: &[Arc<ExecutableInfo>], mut matches: F) -> Vec<Arc<ExecutableInfo>>
where
    F: FnMut(&ExecutableInfo) -> bool,
{
    candidates.iter().filter(|c| matches(c)).cloned().collect()
}

/// Parameter types as seen by `arg_count` arguments (variadic tail expanded).
fn effective_param_types(executable: &ExecutableInfo, arg_count: usize, expanded: bool) -> Vec<TypeRef> {
    match (expanded, variadic_element(executable)) {
        (true, Some(element)) => {
            let fixed = executable.parameters.len() - 1;
            executable
                .parameter_types()
                .take(fixed)
                .cloned()
                .chain(std::iter::repeat_n(element.clone(), arg_count.saturating_sub(fixed)))
                .collect()
        }
        _ => executable.parameter_types().cloned().collect(),
    }
}

fn is_more_specific_than(
    ts: &dyn HostTypeSystem,
    left: &ExecutableInfo,
    right: &ExecutableInfo,
    arg_count: usize,
    expanded: bool,
) -> bool {
    let left_types = effective_param_types(left, arg_count, expanded);
    let right_types = effective_param_types(right, arg_count, expanded);
    left_types.len() == right_types.len()
        && left_types.iter().zip(&right_types).all(|(l, r)| {
            l == r
                || matches!(
                    types::rate_conversion(l, r, ts),
                    TypeMatch::Inheritance | TypeMatch::PrimitiveConversion
                )
        })
}

fn select_most_specific(
    ts: &dyn HostTypeSystem,
    candidates: Vec<Arc<ExecutableInfo>>,
    arg_count: usize,
    expanded: bool,
) -> Result<Arc<ExecutableInfo>, ResolveError> {
    if let [single] = candidates.as_slice() {
        return Ok(single.clone());
    }
    let maximal: Vec<&Arc<ExecutableInfo>> = candidates
        .iter()
        .filter(|candidate| {
            candidates.iter().all(|other| {
                Arc::ptr_eq(candidate, other)
                    || is_more_specific_than(ts, candidate, other, arg_count, expanded)
            })
        })
        .collect();
    match maximal.as_slice() {
        [best] => Ok((*best).clone()),
        _ => Err(ResolveError::Ambiguous(candidates)),
    }
}

/// Select the executable to invoke for arguments of the given types.
pub fn resolve(
    candidates: &[Arc<ExecutableInfo>],
    arg_types: &[TypeRef],
    ts: &dyn HostTypeSystem,
) -> Result<Resolution, ResolveError> {
    for expanded in [false, true] {
        for step in Step::ALL {
            let matching = collect_matching(candidates, |candidate| {
                let matches = |arg: &TypeRef, param: &TypeRef| {
                    step.allows(types::rate_conversion(arg, param, ts))
                };
                if expanded {
                    matches_variable_arity(candidate, arg_types, matches)
                } else {
                    matches_fixed_arity(candidate, arg_types, matches)
                }
            });
            if matching.is_empty() {
                continue;
            }
            debug!(
                "overload phase (variadic: {expanded}, step: {step:?}) left {} candidate(s)",
                matching.len()
            );
            let executable = select_most_specific(ts, matching, arg_types.len(), expanded)?;
            return Ok(Resolution {
                executable,
                expanded_varargs: expanded,
            });
        }
    }
    Err(ResolveError::NoMatch)
}

/// Convert argument values to the selected parameter types, packing the
/// variadic tail into an array. Indeterminate arguments stay indeterminate.
pub fn prepare_arguments(resolution: &Resolution, args: &[ObjectInfo]) -> Vec<Option<Value>> {
    let executable = &resolution.executable;
    let convert = |arg: &ObjectInfo, ty: &TypeRef| {
        arg.value().map(|value| types::convert_for_assignment(value, ty))
    };
    let element = match (resolution.expanded_varargs, variadic_element(executable)) {
        (true, Some(element)) => element,
        _ => {
            return args
                .iter()
                .zip(executable.parameter_types())
                .map(|(arg, ty)| convert(arg, ty))
                .collect();
        }
    };
    let fixed = executable.parameters.len() - 1;
    let mut prepared: Vec<Option<Value>> = args
        .iter()
        .zip(executable.parameter_types())
        .take(fixed)
        .map(|(arg, ty)| convert(arg, ty))
        .collect();
    let tail: Option<Vec<Value>> = args[fixed.min(args.len())..]
        .iter()
        .map(|arg| convert(arg, element))
        .collect();
    prepared.push(tail.map(|values| Value::Array(JavaArray::new(element.clone(), values))));
    prepared
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprscope_api::{
        ClassInfo, ExecutableKind, FieldInfo, InheritanceProvider, MemberProvider, Modifiers,
        PackageProvider, ParameterInfo, TypeProvider,
    };

    struct Boxes;

    impl TypeProvider for Boxes {
        fn class_info(&self, _fqn: &str) -> Option<ClassInfo> {
            None
        }
        fn inner_classes(&self, _fqn: &str) -> Vec<String> {
            vec![]
        }
    }
    impl PackageProvider for Boxes {
        fn package_exists(&self, _package: &str) -> bool {
            false
        }
        fn subpackages(&self, _package: &str) -> Vec<String> {
            vec![]
        }
        fn classes_in_package(&self, _package: &str) -> Vec<String> {
            vec![]
        }
        fn all_top_level_classes(&self) -> Vec<String> {
            vec![]
        }
    }
    impl InheritanceProvider for Boxes {
        fn superclass(&self, fqn: &str) -> Option<String> {
            (fqn != "java.lang.Object").then(|| "java.lang.Object".to_string())
        }
        fn interfaces(&self, _fqn: &str) -> Vec<String> {
            vec![]
        }
    }
    impl MemberProvider for Boxes {
        fn fields(&self, _fqn: &str) -> Vec<Arc<FieldInfo>> {
            vec![]
        }
        fn methods(&self, _fqn: &str) -> Vec<Arc<ExecutableInfo>> {
            vec![]
        }
        fn constructors(&self, _fqn: &str) -> Vec<Arc<ExecutableInfo>> {
            vec![]
        }
    }

    fn method(params: &[TypeRef], varargs: bool) -> Arc<ExecutableInfo> {
        Arc::new(ExecutableInfo {
            name: "f".to_string(),
            kind: ExecutableKind::Method,
            declaring_type: "test.T".to_string(),
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, t)| ParameterInfo::new(format!("p{i}"), t.clone()))
                .collect(),
            return_type: TypeRef::VOID,
            modifiers: Modifiers::public(),
            is_varargs: varargs,
            invoker: Arc::new(|_, _| Ok(Value::Null)),
        })
    }

    #[test]
    fn test_ambiguous_crossed_widening() {
        let a = method(&[TypeRef::INT, TypeRef::DOUBLE], false);
        let b = method(&[TypeRef::DOUBLE, TypeRef::INT], false);
        let err = resolve(&[a, b], &[TypeRef::INT, TypeRef::INT], &Boxes).unwrap_err();
        match err {
            ResolveError::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
            ResolveError::NoMatch => panic!("expected ambiguity"),
        }
    }

    #[test]
    fn test_exact_beats_widening_and_boxing() {
        let exact = method(&[TypeRef::INT], false);
        let widening = method(&[TypeRef::LONG], false);
        let boxing = method(&[TypeRef::class("java.lang.Integer")], false);
        let candidates = [boxing, widening.clone(), exact.clone()];
        let chosen = resolve(&candidates, &[TypeRef::INT], &Boxes).unwrap();
        assert!(Arc::ptr_eq(&chosen.executable, &exact));

        let chosen = resolve(&candidates[..2], &[TypeRef::INT], &Boxes).unwrap();
        assert!(Arc::ptr_eq(&chosen.executable, &widening));
    }

    #[test]
    fn test_most_specific_within_phase() {
        let long = method(&[TypeRef::LONG], false);
        let double = method(&[TypeRef::DOUBLE], false);
        let chosen = resolve(&[double, long.clone()], &[TypeRef::INT], &Boxes).unwrap();
        assert!(Arc::ptr_eq(&chosen.executable, &long));
    }

    #[test]
    fn test_fixed_arity_preferred_over_variadic() {
        let fixed = method(&[TypeRef::INT, TypeRef::INT], false);
        let variadic = method(&[TypeRef::array_of(TypeRef::INT)], true);
        let candidates = [variadic.clone(), fixed.clone()];
        let chosen = resolve(&candidates, &[TypeRef::INT, TypeRef::INT], &Boxes).unwrap();
        assert!(Arc::ptr_eq(&chosen.executable, &fixed));
        assert!(!chosen.expanded_varargs);

        let chosen = resolve(&candidates, &[TypeRef::INT, TypeRef::INT, TypeRef::INT], &Boxes).unwrap();
        assert!(Arc::ptr_eq(&chosen.executable, &variadic));
        assert!(chosen.expanded_varargs);
    }

    #[test]
    fn test_variadic_packing() {
        let variadic = method(&[TypeRef::string(), TypeRef::array_of(TypeRef::LONG)], true);
        let resolution = resolve(
            &[variadic],
            &[TypeRef::string(), TypeRef::INT, TypeRef::INT],
            &Boxes,
        )
        .unwrap();
        let args = [
            ObjectInfo::new(Value::string("fmt"), TypeRef::string()),
            ObjectInfo::new(Value::Int(1), TypeRef::INT),
            ObjectInfo::new(Value::Int(2), TypeRef::INT),
        ];
        let prepared = prepare_arguments(&resolution, &args);
        assert_eq!(prepared.len(), 2);
        match &prepared[1] {
            Some(Value::Array(array)) => {
                assert_eq!(array.len(), 2);
                assert!(matches!(array.get(1), Some(Value::Long(2))));
            }
            other => panic!("expected packed array, got {other:?}"),
        }

        let empty = prepare_arguments(&resolution, &args[..1]);
        assert!(matches!(&empty[1], Some(Value::Array(array)) if array.is_empty()));
    }

    #[test]
    fn test_argument_slot_filtering() {
        let two = method(&[TypeRef::INT, TypeRef::string()], false);
        let variadic = method(&[TypeRef::array_of(TypeRef::string())], true);
        assert!(accepts_argument_count(&two, 1));
        assert!(!accepts_argument_count(&two, 2));
        assert!(accepts_argument_count(&variadic, 5));
        assert!(accepts_total_count(&variadic, 0));
        assert!(!accepts_total_count(&two, 1));
        let expected = expected_argument_types(&[two.clone(), variadic], 0);
        assert_eq!(
            expected,
            vec![TypeRef::INT, TypeRef::array_of(TypeRef::string()), TypeRef::string()]
        );
        assert!(accepts_argument_at(&two, 1, &TypeRef::Null, &Boxes));
        assert!(!accepts_argument_at(&two, 0, &TypeRef::string(), &Boxes));
    }

    #[test]
    fn test_no_match() {
        let f = method(&[TypeRef::BOOLEAN], false);
        assert!(matches!(resolve(&[f], &[TypeRef::INT], &Boxes), Err(ResolveError::NoMatch)));
    }
}
