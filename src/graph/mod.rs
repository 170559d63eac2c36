//! In-memory workflow graph model shared by every engine component.

pub mod conversion;
pub mod definition;
pub mod value;

pub use conversion::*;
pub use definition::*;
pub use value::*;
