pub mod loader;
mod types;

pub use loader::Format;
pub use types::*;
