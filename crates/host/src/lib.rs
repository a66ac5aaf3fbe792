pub mod object;
pub mod registry;
pub mod stdlib;

pub use object::{ElementList, Instance, StringBuffer};
pub use registry::{ClassBuilder, ClassRegistry, RegistryBuilder};
pub use stdlib::{java_equals, java_hash};
