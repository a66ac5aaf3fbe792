//! `java.util`: the list collection types, `Arrays` and `Objects`.

use super::{ARRAY_LIST, arg, call_functional, int, int_arg, java_equals, java_hash, mismatch};
use crate::object::ElementList;
use crate::{ClassBuilder, RegistryBuilder};
use exprscope_api::{HostError, HostResult, TypeRef, Value};

const ITERABLE: &str = "java.lang.Iterable";
const COLLECTION: &str = "java.util.Collection";
const LIST: &str = "java.util.List";

pub(super) fn install(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .class(iterable())
        .class(collection())
        .class(list())
        .class(array_list())
        .class(arrays())
        .class(objects())
}

fn list_of(receiver: &Value) -> HostResult<&ElementList> {
    match receiver {
        Value::Object(object) => object
            .downcast_ref::<ElementList>()
            .ok_or_else(|| mismatch("a list", receiver)),
        Value::Null => Err(HostError::NullPointer("list is null".to_string())),
        other => Err(mismatch("a list", other)),
    }
}

fn iterable() -> ClassBuilder {
    ClassBuilder::interface(ITERABLE).method(
        "forEach",
        &[TypeRef::class("java.util.function.Consumer")],
        TypeRef::VOID,
        |receiver, args| {
            let action = arg(args, 0)?;
            for element in list_of(receiver)?.snapshot() {
                call_functional(action, &[element])?;
            }
            Ok(Value::Null)
        },
    )
}

fn collection() -> ClassBuilder {
    ClassBuilder::interface(COLLECTION)
        .implements(ITERABLE)
        .interface_method("size", &[], TypeRef::INT, |receiver, _| {
            Ok(int(list_of(receiver)?.len()))
        })
        .interface_method("isEmpty", &[], TypeRef::BOOLEAN, |receiver, _| {
            Ok(Value::Boolean(list_of(receiver)?.is_empty()))
        })
        .interface_method("contains", &[TypeRef::object()], TypeRef::BOOLEAN, |receiver, args| {
            let needle = arg(args, 0)?;
            let found = list_of(receiver)?
                .snapshot()
                .iter()
                .any(|element| java_equals(element, needle));
            Ok(Value::Boolean(found))
        })
        .interface_method("add", &[TypeRef::object()], TypeRef::BOOLEAN, |receiver, args| {
            list_of(receiver)?.push(arg(args, 0)?.clone());
            Ok(Value::Boolean(true))
        })
        .method(
            "removeIf",
            &[TypeRef::class("java.util.function.Predicate")],
            TypeRef::BOOLEAN,
            |receiver, args| {
                let filter = arg(args, 0)?;
                let removed = list_of(receiver)?.retain(|element| {
                    let matched = call_functional(filter, std::slice::from_ref(element))?;
                    Ok(matched.as_bool() != Some(true))
                })?;
                Ok(Value::Boolean(removed))
            },
        )
}

fn list() -> ClassBuilder {
    ClassBuilder::interface(LIST)
        .implements(COLLECTION)
        .interface_method("get", &[TypeRef::INT], TypeRef::object(), |receiver, args| {
            list_of(receiver)?.get(int_arg(args, 0)?)
        })
        .interface_method(
            "set",
            &[TypeRef::INT, TypeRef::object()],
            TypeRef::object(),
            |receiver, args| list_of(receiver)?.set(int_arg(args, 0)?, arg(args, 1)?.clone()),
        )
        .interface_method("remove", &[TypeRef::INT], TypeRef::object(), |receiver, args| {
            list_of(receiver)?.remove(int_arg(args, 0)?)
        })
        .interface_method("indexOf", &[TypeRef::object()], TypeRef::INT, |receiver, args| {
            let needle = arg(args, 0)?;
            let index = list_of(receiver)?
                .snapshot()
                .iter()
                .position(|element| java_equals(element, needle));
            Ok(index.map_or(Value::Int(-1), int))
        })
}

fn array_list() -> ClassBuilder {
    ClassBuilder::class(ARRAY_LIST)
        .implements(LIST)
        .constructor(&[], |_| Ok(Value::object(ElementList::default())))
        .constructor(&[TypeRef::INT], |args| {
            let capacity = int_arg(args, 0)?;
            if capacity < 0 {
                return Err(HostError::IllegalArgument(format!(
                    "Illegal Capacity: {capacity}"
                )));
            }
            Ok(Value::object(ElementList::default()))
        })
        .method("toString", &[], TypeRef::string(), |receiver, _| {
            Ok(Value::string(receiver.to_java_string()))
        })
}

fn array_elements(value: &Value) -> HostResult<Option<Vec<Value>>> {
    match value {
        Value::Array(array) => Ok(Some(array.to_vec())),
        Value::Null => Ok(None),
        other => Err(mismatch("an array", other)),
    }
}

fn arrays() -> ClassBuilder {
    let objects = TypeRef::array_of(TypeRef::object());
    let ints = TypeRef::array_of(TypeRef::INT);
    let to_string = |args: &[Value]| -> HostResult<Value> {
        let rendered = match array_elements(arg(args, 0)?)? {
            Some(elements) => {
                let items: Vec<String> = elements.iter().map(Value::to_java_string).collect();
                format!("[{}]", items.join(", "))
            }
            None => "null".to_string(),
        };
        Ok(Value::string(rendered))
    };
    ClassBuilder::class("java.util.Arrays")
        .final_class()
        .static_method("asList", &[objects.clone()], TypeRef::class(LIST), |args| {
            let elements = array_elements(arg(args, 0)?)?.unwrap_or_default();
            Ok(Value::object(ElementList::new(elements)))
        })
        .varargs()
        .static_method("toString", &[objects], TypeRef::string(), to_string)
        .static_method("toString", &[ints], TypeRef::string(), to_string)
}

fn objects() -> ClassBuilder {
    let object = TypeRef::object;
    ClassBuilder::class("java.util.Objects")
        .final_class()
        .static_method("equals", &[object(), object()], TypeRef::BOOLEAN, |args| {
            Ok(Value::Boolean(java_equals(arg(args, 0)?, arg(args, 1)?)))
        })
        .static_method("hashCode", &[object()], TypeRef::INT, |args| {
            Ok(Value::Int(java_hash(arg(args, 0)?)))
        })
        .static_method("isNull", &[object()], TypeRef::BOOLEAN, |args| {
            Ok(Value::Boolean(arg(args, 0)?.is_null()))
        })
        .static_method("nonNull", &[object()], TypeRef::BOOLEAN, |args| {
            Ok(Value::Boolean(!arg(args, 0)?.is_null()))
        })
        .static_method("requireNonNull", &[object()], object(), |args| {
            match arg(args, 0)? {
                Value::Null => Err(HostError::NullPointer(String::new())),
                value => Ok(value.clone()),
            }
        })
        .static_method("toString", &[object()], TypeRef::string(), |args| {
            Ok(Value::string(arg(args, 0)?.to_java_string()))
        })
}
