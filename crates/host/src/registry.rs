//! Immutable class index implementing the introspection traits.
//!
//! A [`ClassRegistry`] is assembled once through [`RegistryBuilder`] and never
//! changes afterwards, so it can be shared between engines without locking.

use exprscope_api::{
    AccessModifier, ClassInfo, ClassKind, ExecutableInfo, ExecutableKind, FieldGetter, FieldInfo,
    FieldSetter, HostError, HostResult, InheritanceProvider, Invoker, MemberProvider, Modifiers,
    OBJECT_CLASS, PackageProvider, ParameterInfo, TypeProvider, TypeRef, Value, package_of,
};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct ClassEntry {
    info: ClassInfo,
    fields: Vec<Arc<FieldInfo>>,
    methods: Vec<Arc<ExecutableInfo>>,
    constructors: Vec<Arc<ExecutableInfo>>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassEntry>,
    packages: BTreeSet<String>,
}

impl ClassRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding the bundled standard library only.
    pub fn standard() -> Self {
        Self::builder().standard_library().build()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

fn parent_package(package: &str) -> Option<&str> {
    if package.is_empty() {
        return None;
    }
    Some(package.rfind('.').map_or("", |idx| &package[..idx]))
}

impl TypeProvider for ClassRegistry {
    fn class_info(&self, fqn: &str) -> Option<ClassInfo> {
        self.classes.get(fqn).map(|entry| entry.info.clone())
    }

    fn inner_classes(&self, fqn: &str) -> Vec<String> {
        self.classes
            .values()
            .filter(|entry| entry.info.declaring_class.as_deref() == Some(fqn))
            .map(|entry| entry.info.fqn.clone())
            .collect()
    }
}

impl PackageProvider for ClassRegistry {
    fn package_exists(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    fn subpackages(&self, package: &str) -> Vec<String> {
        self.packages
            .iter()
            .filter(|candidate| parent_package(candidate) == Some(package))
            .cloned()
            .collect()
    }

    fn classes_in_package(&self, package: &str) -> Vec<String> {
        self.classes
            .values()
            .filter(|entry| entry.info.declaring_class.is_none())
            .filter(|entry| package_of(&entry.info.fqn) == package)
            .map(|entry| entry.info.fqn.clone())
            .collect()
    }

    fn all_top_level_classes(&self) -> Vec<String> {
        self.classes
            .values()
            .filter(|entry| entry.info.declaring_class.is_none())
            .map(|entry| entry.info.fqn.clone())
            .collect()
    }
}

impl InheritanceProvider for ClassRegistry {
    fn superclass(&self, fqn: &str) -> Option<String> {
        self.classes.get(fqn)?.info.superclass.clone()
    }

    fn interfaces(&self, fqn: &str) -> Vec<String> {
        self.classes
            .get(fqn)
            .map(|entry| entry.info.interfaces.clone())
            .unwrap_or_default()
    }
}

impl MemberProvider for ClassRegistry {
    fn fields(&self, fqn: &str) -> Vec<Arc<FieldInfo>> {
        self.classes
            .get(fqn)
            .map(|entry| entry.fields.clone())
            .unwrap_or_default()
    }

    fn methods(&self, fqn: &str) -> Vec<Arc<ExecutableInfo>> {
        self.classes
            .get(fqn)
            .map(|entry| entry.methods.clone())
            .unwrap_or_default()
    }

    fn constructors(&self, fqn: &str) -> Vec<Arc<ExecutableInfo>> {
        self.classes
            .get(fqn)
            .map(|entry| entry.constructors.clone())
            .unwrap_or_default()
    }
}

/// Collects class definitions and an exclusion set, then freezes them.
#[derive(Default)]
pub struct RegistryBuilder {
    classes: Vec<ClassBuilder>,
    excluded: HashSet<String>,
}

impl RegistryBuilder {
    pub fn class(mut self, class: ClassBuilder) -> Self {
        self.classes.push(class);
        self
    }

    /// Hide `fqn` (and its inner classes) from the finished registry, together
    /// with every member whose signature mentions it.
    pub fn exclude(mut self, fqn: impl Into<String>) -> Self {
        self.excluded.insert(fqn.into());
        self
    }

    pub fn standard_library(self) -> Self {
        crate::stdlib::install(self)
    }

    fn is_excluded(&self, fqn: &str) -> bool {
        self.excluded.contains(fqn)
            || self
                .excluded
                .iter()
                .any(|excluded| fqn.starts_with(&format!("{excluded}$")))
    }

    fn mentions_excluded(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Class(fqn) => self.is_excluded(fqn),
            TypeRef::Array(element) => self.mentions_excluded(element),
            _ => false,
        }
    }

    fn keeps_executable(&self, executable: &ExecutableInfo) -> bool {
        !self.mentions_excluded(&executable.return_type)
            && !executable
                .parameter_types()
                .any(|ty| self.mentions_excluded(ty))
    }

    pub fn build(self) -> ClassRegistry {
        let mut registry = ClassRegistry::default();
        registry.packages.insert(String::new());
        for class in &self.classes {
            if self.is_excluded(&class.info.fqn) {
                debug!("excluding class {}", class.info.fqn);
                continue;
            }
            let mut entry = ClassEntry {
                info: class.info.clone(),
                fields: class
                    .fields
                    .iter()
                    .filter(|field| !self.mentions_excluded(&field.type_ref))
                    .cloned()
                    .collect(),
                methods: class
                    .methods
                    .iter()
                    .filter(|method| self.keeps_executable(method))
                    .cloned()
                    .collect(),
                constructors: class
                    .constructors
                    .iter()
                    .filter(|constructor| self.keeps_executable(constructor))
                    .cloned()
                    .collect(),
            };
            entry
                .info
                .interfaces
                .retain(|interface| !self.is_excluded(interface));
            if entry
                .info
                .superclass
                .as_deref()
                .is_some_and(|superclass| self.is_excluded(superclass))
            {
                entry.info.superclass = Some(OBJECT_CLASS.to_string());
            }

            let mut package = Some(package_of(&entry.info.fqn));
            while let Some(current) = package {
                registry.packages.insert(current.to_string());
                package = parent_package(current);
            }
            if let Some(previous) = registry.classes.insert(entry.info.fqn.clone(), entry) {
                warn!("class {} registered twice; keeping the last definition", previous.info.fqn);
            }
        }
        debug!(
            "class registry built: {} classes, {} packages",
            registry.classes.len(),
            registry.packages.len()
        );
        registry
    }
}

/// Fluent definition of one class and its members.
///
/// Inner classes use `$` in their name; the enclosing class is derived from it.
#[derive(Clone)]
pub struct ClassBuilder {
    info: ClassInfo,
    fields: Vec<Arc<FieldInfo>>,
    methods: Vec<Arc<ExecutableInfo>>,
    constructors: Vec<Arc<ExecutableInfo>>,
    /// Member the `with_*` modifiers apply to
    last: Option<LastMember>,
}

#[derive(Clone, Copy)]
enum LastMember {
    Field(usize),
    Method(usize),
    Constructor(usize),
}

impl ClassBuilder {
    fn new(fqn: &str, kind: ClassKind) -> Self {
        let superclass = match kind {
            ClassKind::Interface => None,
            _ if fqn == OBJECT_CLASS => None,
            _ => Some(OBJECT_CLASS.to_string()),
        };
        let declaring_class = fqn.rfind('$').map(|idx| fqn[..idx].to_string());
        Self {
            info: ClassInfo {
                fqn: fqn.to_string(),
                kind,
                modifiers: Modifiers::public(),
                superclass,
                interfaces: Vec::new(),
                declaring_class,
            },
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            last: None,
        }
    }

    pub fn class(fqn: &str) -> Self {
        Self::new(fqn, ClassKind::Class)
    }

    pub fn interface(fqn: &str) -> Self {
        let mut builder = Self::new(fqn, ClassKind::Interface);
        builder.info.modifiers.is_abstract = true;
        builder
    }

    pub fn enumeration(fqn: &str) -> Self {
        let mut builder = Self::new(fqn, ClassKind::Enum);
        builder.info.modifiers.is_final = true;
        builder
    }

    pub fn fqn(&self) -> &str {
        &self.info.fqn
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.info.superclass = Some(superclass.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.info.interfaces.push(interface.to_string());
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.info.modifiers.is_abstract = true;
        self
    }

    pub fn final_class(mut self) -> Self {
        self.info.modifiers.is_final = true;
        self
    }

    /// Access level of the class itself.
    pub fn class_access(mut self, access: AccessModifier) -> Self {
        self.info.modifiers.access = access;
        self
    }

    /// Instance field backed by capability closures; `setter` is `None` for final fields.
    pub fn field_with(
        mut self,
        name: &str,
        type_ref: TypeRef,
        getter: FieldGetter,
        setter: Option<FieldSetter>,
    ) -> Self {
        let modifiers = if setter.is_some() {
            Modifiers::public()
        } else {
            Modifiers::public().with_final()
        };
        self.fields.push(Arc::new(FieldInfo {
            name: name.to_string(),
            declaring_type: self.info.fqn.clone(),
            type_ref,
            modifiers,
            getter,
            setter,
        }));
        self.last = Some(LastMember::Field(self.fields.len() - 1));
        self
    }

    /// Read-write instance field stored in an [`Instance`](crate::Instance) slot.
    pub fn property(self, name: &str, type_ref: TypeRef) -> Self {
        let slot = name.to_string();
        let getter: FieldGetter = Arc::new(move |receiver: &Value| {
            crate::object::instance_of(receiver)?.get(&slot)
        });
        let slot = name.to_string();
        let setter: FieldSetter = Arc::new(move |receiver: &Value, value: Value| {
            crate::object::instance_of(receiver)?.set(&slot, value);
            Ok(())
        });
        self.field_with(name, type_ref, getter, Some(setter))
    }

    /// Final instance field stored in an [`Instance`](crate::Instance) slot.
    pub fn final_property(self, name: &str, type_ref: TypeRef) -> Self {
        let slot = name.to_string();
        let getter: FieldGetter = Arc::new(move |receiver: &Value| {
            crate::object::instance_of(receiver)?.get(&slot)
        });
        self.field_with(name, type_ref, getter, None)
    }

    /// Static final field holding a constant.
    pub fn constant(self, name: &str, type_ref: TypeRef, value: Value) -> Self {
        let getter: FieldGetter = Arc::new(move |_: &Value| Ok(value.clone()));
        self.field_with(name, type_ref, getter, None).with_static()
    }

    fn push_executable(
        mut self,
        kind: ExecutableKind,
        name: &str,
        params: &[TypeRef],
        return_type: TypeRef,
        modifiers: Modifiers,
        invoker: Invoker,
    ) -> Self {
        let executable = Arc::new(ExecutableInfo {
            name: name.to_string(),
            kind,
            declaring_type: self.info.fqn.clone(),
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, ty)| ParameterInfo::new(format!("arg{i}"), ty.clone()))
                .collect(),
            return_type,
            modifiers,
            is_varargs: false,
            invoker,
        });
        match kind {
            ExecutableKind::Method => {
                self.methods.push(executable);
                self.last = Some(LastMember::Method(self.methods.len() - 1));
            }
            ExecutableKind::Constructor => {
                self.constructors.push(executable);
                self.last = Some(LastMember::Constructor(self.constructors.len() - 1));
            }
        }
        self
    }

    pub fn method<F>(self, name: &str, params: &[TypeRef], return_type: TypeRef, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(f);
        self.push_executable(
            ExecutableKind::Method,
            name,
            params,
            return_type,
            Modifiers::public(),
            invoker,
        )
    }

    pub fn static_method<F>(self, name: &str, params: &[TypeRef], return_type: TypeRef, f: F) -> Self
    where
        F: Fn(&[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(move |_: &Value, args: &[Value]| f(args));
        self.push_executable(
            ExecutableKind::Method,
            name,
            params,
            return_type,
            Modifiers::public().with_static(),
            invoker,
        )
    }

    /// Abstract method; calls reach lambdas implementing the interface.
    pub fn abstract_method(self, name: &str, params: &[TypeRef], return_type: TypeRef) -> Self {
        let method = name.to_string();
        self.interface_method(name, params, return_type, move |receiver, args| match receiver {
            Value::Lambda(callable) => callable.call(args),
            Value::Null => Err(HostError::NullPointer(format!(
                "Cannot invoke \"{method}\" because the receiver is null"
            ))),
            other => Err(HostError::Unsupported(format!(
                "abstract method {method} is not implemented by {}",
                other.runtime_type()
            ))),
        })
    }

    /// Abstract method whose invoker dispatches over the known implementations.
    pub fn interface_method<F>(
        self,
        name: &str,
        params: &[TypeRef],
        return_type: TypeRef,
        f: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(f);
        self.push_executable(
            ExecutableKind::Method,
            name,
            params,
            return_type,
            Modifiers::public().with_abstract(),
            invoker,
        )
    }

    pub fn constructor<F>(self, params: &[TypeRef], f: F) -> Self
    where
        F: Fn(&[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(move |_: &Value, args: &[Value]| f(args));
        let name = self.info.fqn.clone();
        self.push_executable(
            ExecutableKind::Constructor,
            &name,
            params,
            TypeRef::VOID,
            Modifiers::public(),
            invoker,
        )
    }

    fn modify_last(mut self, f: impl FnOnce(&mut Modifiers, Option<&mut bool>)) -> Self {
        match self.last {
            Some(LastMember::Field(i)) => {
                let mut field = (*self.fields[i]).clone();
                f(&mut field.modifiers, None);
                self.fields[i] = Arc::new(field);
            }
            Some(LastMember::Method(i)) => {
                let mut method = (*self.methods[i]).clone();
                f(&mut method.modifiers, Some(&mut method.is_varargs));
                self.methods[i] = Arc::new(method);
            }
            Some(LastMember::Constructor(i)) => {
                let mut constructor = (*self.constructors[i]).clone();
                f(&mut constructor.modifiers, Some(&mut constructor.is_varargs));
                self.constructors[i] = Arc::new(constructor);
            }
            None => warn!("modifier applied to {} before any member", self.info.fqn),
        }
        self
    }

    /// Access level of the most recently added member.
    pub fn with_access(self, access: AccessModifier) -> Self {
        self.modify_last(|modifiers, _| modifiers.access = access)
    }

    pub fn with_static(self) -> Self {
        self.modify_last(|modifiers, _| modifiers.is_static = true)
    }

    /// Mark the most recently added executable as variadic; its last
    /// parameter must have an array type.
    pub fn varargs(self) -> Self {
        self.modify_last(|_, varargs| {
            if let Some(varargs) = varargs {
                *varargs = true;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprscope_api::HostTypeSystem;

    fn registry() -> ClassRegistry {
        ClassRegistry::builder()
            .class(ClassBuilder::class("java.lang.Object"))
            .class(ClassBuilder::interface("com.acme.Shape"))
            .class(
                ClassBuilder::class("com.acme.geo.Circle")
                    .implements("com.acme.Shape")
                    .constant("UNIT", TypeRef::DOUBLE, Value::Double(1.0)),
            )
            .class(ClassBuilder::class("com.acme.geo.Circle$Builder"))
            .build()
    }

    #[test]
    fn test_package_tree() {
        let registry = registry();
        assert!(registry.package_exists("com"));
        assert!(registry.package_exists("com.acme.geo"));
        assert!(!registry.package_exists("com.ac"));
        assert_eq!(registry.subpackages("com"), vec!["com.acme".to_string()]);
        assert_eq!(registry.classes_in_package("com.acme.geo"), vec!["com.acme.geo.Circle".to_string()]);
        assert_eq!(registry.inner_classes("com.acme.geo.Circle"), vec!["com.acme.geo.Circle$Builder".to_string()]);
    }

    #[test]
    fn test_default_superclass_and_inheritance() {
        let registry = registry();
        assert_eq!(registry.superclass("com.acme.geo.Circle").as_deref(), Some(OBJECT_CLASS));
        assert_eq!(registry.superclass("com.acme.Shape"), None);
        assert_eq!(registry.superclass(OBJECT_CLASS), None);
        assert!(registry.inherits_from("com.acme.geo.Circle", "com.acme.Shape"));
    }

    #[test]
    fn test_exclusion_hides_class_and_dependent_members() {
        let registry = ClassRegistry::builder()
            .class(ClassBuilder::class("a.Secret"))
            .class(ClassBuilder::class("a.Secret$Inner"))
            .class(
                ClassBuilder::class("a.Open")
                    .extends("a.Secret")
                    .static_method("leak", &[], TypeRef::class("a.Secret"), |_| Ok(Value::Null))
                    .static_method("fine", &[], TypeRef::INT, |_| Ok(Value::Int(1))),
            )
            .exclude("a.Secret")
            .build();
        assert!(registry.class_info("a.Secret").is_none());
        assert!(registry.class_info("a.Secret$Inner").is_none());
        let names: Vec<_> = registry.methods("a.Open").iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["fine".to_string()]);
        assert_eq!(registry.superclass("a.Open").as_deref(), Some(OBJECT_CLASS));
    }

    #[test]
    fn test_member_modifiers_apply_to_last_member() {
        let registry = ClassRegistry::builder()
            .class(
                ClassBuilder::class("a.Util")
                    .static_method("first", &[], TypeRef::INT, |_| Ok(Value::Int(1)))
                    .static_method("hidden", &[], TypeRef::INT, |_| Ok(Value::Int(2)))
                    .with_access(AccessModifier::Private)
                    .static_method("sum", &[TypeRef::array_of(TypeRef::INT)], TypeRef::INT, |_| {
                        Ok(Value::Int(0))
                    })
                    .varargs(),
            )
            .build();
        let methods = registry.methods("a.Util");
        assert_eq!(methods[0].modifiers.access, AccessModifier::Public);
        assert_eq!(methods[1].modifiers.access, AccessModifier::Private);
        assert!(methods[2].is_varargs);
        assert!(methods.iter().all(|m| m.is_static()));
    }
}
