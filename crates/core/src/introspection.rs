//! Facade over the host type system.
//!
//! Adds what the raw providers do not know about: inherited members with
//! hiding and overriding, minimum access levels, static filtering, the array
//! `length` pseudo-field, and class name resolution through imports.

use crate::settings::Settings;
use exprscope_api::{
    ExecutableInfo, FieldGetter, FieldInfo, HostError, HostTypeSystem,
    IMPLICIT_PACKAGE, Modifiers, OBJECT_CLASS, TypeRef, Value, simple_class_name,
};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;

static ARRAY_LENGTH: Lazy<Arc<FieldInfo>> = Lazy::new(|| {
    let getter: FieldGetter = Arc::new(|receiver: &Value| match receiver {
        Value::Array(array) => Ok(Value::Int(i32::try_from(array.len()).unwrap_or(i32::MAX))),
        other => Err(HostError::IllegalArgument(format!(
            "length requested on non-array value {other}"
        ))),
    });
    Arc::new(FieldInfo {
        name: "length".to_string(),
        declaring_type: "[]".to_string(),
        type_ref: TypeRef::INT,
        modifiers: Modifiers::public().with_final(),
        getter,
        setter: None,
    })
});

pub struct Introspection<'a> {
    ts: &'a dyn HostTypeSystem,
    settings: &'a Settings,
}

impl<'a> Introspection<'a> {
    pub fn new(ts: &'a dyn HostTypeSystem, settings: &'a Settings) -> Self {
        Self { ts, settings }
    }

    /// The type followed by its ancestors, nearest first. Interfaces end with `Object`.
    fn lookup_chain(&self, fqn: &str) -> Vec<String> {
        let mut chain = vec![fqn.to_string()];
        chain.extend(self.ts.walk_ancestors(fqn));
        if !chain.iter().any(|c| c == OBJECT_CLASS) {
            chain.push(OBJECT_CLASS.to_string());
        }
        chain
    }

    fn class_of(ty: &TypeRef) -> Option<&str> {
        match ty {
            TypeRef::Class(fqn) => Some(fqn),
            TypeRef::Array(_) => Some(OBJECT_CLASS),
            _ => None,
        }
    }

    /// Fields visible on `ty`; fields of subclasses hide same-named fields above.
    pub fn fields(&self, ty: &TypeRef, static_only: bool) -> Vec<Arc<FieldInfo>> {
        let mut result = Vec::new();
        if ty.element_type().is_some() && !static_only {
            result.push(ARRAY_LENGTH.clone());
            return result;
        }
        let Some(fqn) = Self::class_of(ty) else {
            return result;
        };
        let mut names = HashSet::new();
        for class in self.lookup_chain(fqn) {
            for field in self.ts.fields(&class) {
                if !names.insert(field.name.clone()) {
                    continue;
                }
                if field.modifiers.access < self.settings.minimum_field_access {
                    continue;
                }
                if static_only && !field.modifiers.is_static {
                    continue;
                }
                result.push(field);
            }
        }
        result
    }

    pub fn fields_named(&self, ty: &TypeRef, name: &str, static_only: bool) -> Option<Arc<FieldInfo>> {
        self.fields(ty, static_only)
            .into_iter()
            .find(|field| field.name == name)
    }

    /// Methods visible on `ty`; overriding declarations replace inherited ones.
    pub fn methods(&self, ty: &TypeRef, static_only: bool) -> Vec<Arc<ExecutableInfo>> {
        let Some(fqn) = Self::class_of(ty) else {
            return Vec::new();
        };
        let mut result: Vec<Arc<ExecutableInfo>> = Vec::new();
        for class in self.lookup_chain(fqn) {
            for method in self.ts.methods(&class) {
                if result.iter().any(|m| m.has_same_signature(&method)) {
                    continue;
                }
                result.push(method);
            }
        }
        result.retain(|method| {
            method.modifiers.access >= self.settings.minimum_method_access
                && (!static_only || method.is_static())
        });
        result
    }

    pub fn methods_named(&self, ty: &TypeRef, name: &str, static_only: bool) -> Vec<Arc<ExecutableInfo>> {
        self.methods(ty, static_only)
            .into_iter()
            .filter(|method| method.name == name)
            .collect()
    }

    pub fn constructors(&self, fqn: &str) -> Vec<Arc<ExecutableInfo>> {
        self.ts
            .constructors(fqn)
            .into_iter()
            .filter(|c| c.modifiers.access >= self.settings.minimum_method_access)
            .collect()
    }

    pub fn is_class_visible(&self, fqn: &str) -> bool {
        self.ts
            .class_info(fqn)
            .is_some_and(|info| info.modifiers.access >= self.settings.minimum_class_access)
    }

    pub fn is_abstract_or_interface(&self, fqn: &str) -> bool {
        self.ts
            .class_info(fqn)
            .is_some_and(|info| info.is_interface() || info.modifiers.is_abstract)
    }

    /// Resolve a simple class name through explicit imports, wildcard imports,
    /// the implicit package and finally the default package.
    pub fn resolve_simple_class(&self, name: &str) -> Option<String> {
        let explicit = self
            .settings
            .imported_classes
            .iter()
            .find(|fqn| simple_class_name(fqn) == name)
            .cloned();
        let from_packages = || {
            self.settings
                .imported_packages
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(IMPLICIT_PACKAGE))
                .map(|package| format!("{package}.{name}"))
                .find(|fqn| self.ts.class_exists(fqn))
        };
        let default_package = || self.ts.class_exists(name).then(|| name.to_string());
        explicit
            .or_else(from_packages)
            .or_else(default_package)
            .filter(|fqn| self.is_class_visible(fqn))
    }

    /// Class `name` declared in `package`.
    pub fn resolve_class_in_package(&self, package: &str, name: &str) -> Option<String> {
        let fqn = if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}.{name}")
        };
        self.is_class_visible(&fqn).then_some(fqn)
    }

    pub fn inner_classes(&self, fqn: &str) -> Vec<String> {
        self.ts
            .inner_classes(fqn)
            .into_iter()
            .filter(|inner| self.is_class_visible(inner))
            .collect()
    }

    /// Inner class `name` of `fqn` or of one of its ancestors.
    pub fn resolve_inner_class(&self, fqn: &str, name: &str) -> Option<String> {
        self.lookup_chain(fqn).into_iter().find_map(|class| {
            self.inner_classes(&class)
                .into_iter()
                .find(|inner| simple_class_name(inner) == name)
        })
    }

    pub fn package_exists(&self, package: &str) -> bool {
        self.ts.package_exists(package)
    }

    pub fn subpackages(&self, package: &str) -> Vec<String> {
        self.ts.subpackages(package)
    }

    pub fn classes_in_package(&self, package: &str) -> Vec<String> {
        self.ts
            .classes_in_package(package)
            .into_iter()
            .filter(|fqn| self.is_class_visible(fqn))
            .collect()
    }

    /// Classes addressable by simple name.
    pub fn imported_classes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let packages = self
            .settings
            .imported_packages
            .iter()
            .map(String::as_str)
            .chain([IMPLICIT_PACKAGE, ""]);
        self.settings
            .imported_classes
            .iter()
            .filter(|fqn| self.is_class_visible(fqn))
            .cloned()
            .chain(packages.flat_map(|package| self.classes_in_package(package)))
            .filter(|fqn| seen.insert(fqn.clone()))
            .collect()
    }

    /// Visible top-level classes that are not imported.
    pub fn other_top_level_classes(&self) -> Vec<String> {
        let imported: HashSet<String> = self.imported_classes().into_iter().collect();
        self.ts
            .all_top_level_classes()
            .into_iter()
            .filter(|fqn| !imported.contains(fqn) && self.is_class_visible(fqn))
            .collect()
    }

    /// The single abstract method of a functional interface.
    pub fn functional_method(&self, fqn: &str) -> Option<Arc<ExecutableInfo>> {
        let info = self.ts.class_info(fqn)?;
        if !info.is_interface() {
            return None;
        }
        let mut methods = self.ts.abstract_methods(fqn);
        // Abstract redeclarations of Object methods do not count
        let object_methods = self.ts.methods(OBJECT_CLASS);
        methods.retain(|m| !object_methods.iter().any(|o| o.has_same_signature(m)));
        match methods.as_slice() {
            [single] => Some(single.clone()),
            _ => None,
        }
    }
}
