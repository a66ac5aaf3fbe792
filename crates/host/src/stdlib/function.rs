//! `java.util.function` and `java.util.Comparator`.
//!
//! Each interface has a single abstract method; lambdas written in
//! expressions implement them and are called through that method.

use crate::{ClassBuilder, RegistryBuilder};
use exprscope_api::TypeRef;

const PACKAGE: &str = "java.util.function";

pub(super) fn install(builder: RegistryBuilder) -> RegistryBuilder {
    let object = TypeRef::object;
    let functional = |name: &str, method: &str, params: &[TypeRef], result: TypeRef| {
        ClassBuilder::interface(&format!("{PACKAGE}.{name}")).abstract_method(method, params, result)
    };
    builder
        .class(functional("Function", "apply", &[object()], object()))
        .class(functional("BiFunction", "apply", &[object(), object()], object()))
        .class(functional("Supplier", "get", &[], object()))
        .class(functional("Predicate", "test", &[object()], TypeRef::BOOLEAN))
        .class(functional("Consumer", "accept", &[object()], TypeRef::VOID))
        .class(functional(
            "IntBinaryOperator",
            "applyAsInt",
            &[TypeRef::INT, TypeRef::INT],
            TypeRef::INT,
        ))
        .class(
            ClassBuilder::interface(&format!("{PACKAGE}.UnaryOperator"))
                .implements(&format!("{PACKAGE}.Function")),
        )
        .class(
            ClassBuilder::interface(&format!("{PACKAGE}.BinaryOperator"))
                .implements(&format!("{PACKAGE}.BiFunction")),
        )
        .class(
            ClassBuilder::interface("java.util.Comparator").abstract_method(
                "compare",
                &[object(), object()],
                TypeRef::INT,
            ),
        )
}
