//! Evaluation modes and the policy deciding when values are materialized.
//!
//! The grammar walk is identical in every mode; only these helpers look at the
//! mode to decide whether to read, invoke, or produce an indeterminate value.

use crate::object_info::{ObjectInfo, ValueSetter};
use crate::types;
use exprscope_api::{
    ExecutableInfo, ExecutableKind, FieldInfo, HostError, HostResult, TypeRef, Value,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Declared types only; nothing is read or invoked
    StaticTyping,
    /// Field and array reads are materialized, invocations are faked
    Mixed,
    /// Full evaluation including method and constructor invocation
    #[default]
    DynamicTyping,
}

impl EvaluationMode {
    pub fn reads_values(self) -> bool {
        !matches!(self, EvaluationMode::StaticTyping)
    }

    pub fn invokes(self) -> bool {
        matches!(self, EvaluationMode::DynamicTyping)
    }

    pub fn performs_assignments(self) -> bool {
        matches!(self, EvaluationMode::DynamicTyping)
    }

    /// Mode used where side effects must be suppressed (e.g. validation passes).
    pub fn without_side_effects(self) -> Self {
        match self {
            EvaluationMode::DynamicTyping => EvaluationMode::Mixed,
            other => other,
        }
    }
}

/// Read a field of `receiver` according to `mode`.
///
/// The resulting location carries a setter unless the field is final.
pub fn read_field(
    mode: EvaluationMode,
    field: &Arc<FieldInfo>,
    receiver: &ObjectInfo,
) -> HostResult<ObjectInfo> {
    let receiver_value = receiver.value().cloned().unwrap_or_default();
    if mode.reads_values() && !field.modifiers.is_static && receiver.is_known_null() {
        return Err(HostError::NullPointer(format!(
            "Cannot read field \"{}\" because the receiver is null",
            field.name
        )));
    }
    let static_or_known = field.modifiers.is_static || receiver.value().is_some();
    let info = if mode.reads_values() && static_or_known {
        let value = field.get(&receiver_value)?;
        ObjectInfo::new(value, field.type_ref.clone())
    } else {
        ObjectInfo::indeterminate(field.type_ref.clone())
    };
    if field.setter.is_none() || field.modifiers.is_final {
        return Ok(info);
    }
    let field = field.clone();
    let setter: ValueSetter = Arc::new(move |value: Value| {
        let value = types::convert_for_assignment(&value, &field.type_ref);
        field.set(&receiver_value, value)
    });
    Ok(info.with_setter(setter))
}

/// Invoke a method or constructor according to `mode`; `args` are already
/// converted to the parameter types.
pub fn invoke(
    mode: EvaluationMode,
    executable: &ExecutableInfo,
    receiver: &ObjectInfo,
    args: Vec<Option<Value>>,
) -> HostResult<ObjectInfo> {
    let result_type = match executable.kind {
        ExecutableKind::Method => executable.return_type.clone(),
        ExecutableKind::Constructor => TypeRef::class(&executable.declaring_type),
    };
    if !mode.invokes() {
        return Ok(ObjectInfo::indeterminate(result_type));
    }
    let is_instance_call = executable.kind == ExecutableKind::Method && !executable.is_static();
    if is_instance_call && receiver.is_known_null() {
        return Err(HostError::NullPointer(format!(
            "Cannot invoke \"{}\" because the receiver is null",
            executable.signature()
        )));
    }
    let (Some(receiver_value), Some(args)) = (
        if is_instance_call {
            receiver.value().cloned()
        } else {
            Some(Value::Null)
        },
        args.into_iter().collect::<Option<Vec<_>>>(),
    ) else {
        // An operand was not computed, so neither is the result
        return Ok(ObjectInfo::indeterminate(result_type));
    };
    trace!("invoking {}", executable);
    let value = executable.invoke(&receiver_value, &args)?;
    let value = if executable.return_type.is_void() && executable.kind == ExecutableKind::Method {
        Value::Null
    } else {
        value
    };
    Ok(ObjectInfo::new(value, result_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_effect_free_mode() {
        assert_eq!(
            EvaluationMode::DynamicTyping.without_side_effects(),
            EvaluationMode::Mixed
        );
        assert_eq!(
            EvaluationMode::StaticTyping.without_side_effects(),
            EvaluationMode::StaticTyping
        );
        assert!(EvaluationMode::Mixed.reads_values());
        assert!(!EvaluationMode::Mixed.invokes());
        assert!(!EvaluationMode::StaticTyping.reads_values());
    }
}
