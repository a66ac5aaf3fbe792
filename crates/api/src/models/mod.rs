pub mod member;
pub mod types;
pub mod value;

pub use member::*;
pub use types::*;
pub use value::*;
