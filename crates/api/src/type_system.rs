//! Core trait definitions for the introspection collaborator.
//!
//! These traits abstract away where class and member metadata comes from,
//! allowing the engine to work with a prebuilt registry, a generated binding
//! layer, or mock implementations in tests.

use crate::models::{ClassInfo, ExecutableInfo, FieldInfo};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Provides class information by fully qualified name.
pub trait TypeProvider: Send + Sync {
    /// Get class info for a fully qualified name.
    ///
    /// Returns `None` if the class is unknown or excluded.
    fn class_info(&self, fqn: &str) -> Option<ClassInfo>;

    /// Fully qualified names of the classes declared directly inside `fqn`.
    fn inner_classes(&self, fqn: &str) -> Vec<String>;
}

/// Provides the package tree used to resolve dotted names.
pub trait PackageProvider: Send + Sync {
    fn package_exists(&self, package: &str) -> bool;

    /// Direct subpackages of `package` (full names). The root package is `""`.
    fn subpackages(&self, package: &str) -> Vec<String>;

    /// Top-level classes declared in `package` (fully qualified names).
    fn classes_in_package(&self, package: &str) -> Vec<String>;

    /// Every top-level class known to the index; used only to rank completions
    /// of classes that are not imported.
    fn all_top_level_classes(&self) -> Vec<String>;
}

/// Provides inheritance relationship information.
pub trait InheritanceProvider: Send + Sync {
    /// Get the direct superclass of a class.
    ///
    /// Returns `None` for `java.lang.Object` and interfaces.
    fn superclass(&self, fqn: &str) -> Option<String>;

    /// Interfaces directly implemented (or extended) by a class.
    fn interfaces(&self, fqn: &str) -> Vec<String>;

    /// Walk all ancestor types (superclasses first, then interfaces) in BFS order.
    fn walk_ancestors(&self, fqn: &str) -> Box<dyn Iterator<Item = String> + '_> {
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        let push_parents = |fqn: &str, queue: &mut VecDeque<String>| {
            if let Some(superclass) = self.superclass(fqn) {
                queue.push_back(superclass);
            }
            queue.extend(self.interfaces(fqn));
        };
        push_parents(fqn, &mut queue);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            push_parents(&current, &mut queue);
            out.push(current);
        }

        Box::new(out.into_iter())
    }
}

/// Provides members declared directly in a class (inheritance is not searched).
pub trait MemberProvider: Send + Sync {
    fn fields(&self, fqn: &str) -> Vec<Arc<FieldInfo>>;

    fn methods(&self, fqn: &str) -> Vec<Arc<ExecutableInfo>>;

    fn constructors(&self, fqn: &str) -> Vec<Arc<ExecutableInfo>>;
}

/// The combined introspection interface the engine works against.
pub trait HostTypeSystem: TypeProvider + PackageProvider + InheritanceProvider + MemberProvider {
    /// Whether `fqn` names a known class.
    fn class_exists(&self, fqn: &str) -> bool {
        self.class_info(fqn).is_some()
    }

    /// Check whether `sub` is `sup` or inherits from it.
    fn inherits_from(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.walk_ancestors(sub).any(|ancestor| ancestor == sup)
    }

    /// Abstract methods of an interface, including inherited ones.
    ///
    /// A functional interface has exactly one.
    fn abstract_methods(&self, fqn: &str) -> Vec<Arc<ExecutableInfo>> {
        let mut found: Vec<Arc<ExecutableInfo>> = Vec::new();
        let types = std::iter::once(fqn.to_string()).chain(self.walk_ancestors(fqn));
        for ty in types {
            for method in self.methods(&ty) {
                if method.modifiers.is_abstract
                    && !method.modifiers.is_static
                    && !found.iter().any(|m| m.has_same_signature(&method))
                {
                    found.push(method);
                }
            }
        }
        found
    }
}

// Blanket implementation: any type implementing all four traits is a HostTypeSystem
impl<T: TypeProvider + PackageProvider + InheritanceProvider + MemberProvider> HostTypeSystem
    for T
{
}

pub type TypeSystemPtr = Arc<dyn HostTypeSystem>;
