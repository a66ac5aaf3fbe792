pub mod error;
pub mod hierarchy;
pub mod models;
pub mod type_system;

// Re-export commonly used types
pub use error::{HostError, HostResult};
pub use hierarchy::{HierarchyNode, StaticHierarchyNode};
pub use models::*;
pub use type_system::{
    HostTypeSystem, InheritanceProvider, MemberProvider, PackageProvider, TypeProvider,
    TypeSystemPtr,
};
