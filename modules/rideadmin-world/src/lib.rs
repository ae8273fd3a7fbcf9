pub mod records;
pub mod types;
pub mod values;

pub use records::*;
pub use types::*;
pub use values::*;
