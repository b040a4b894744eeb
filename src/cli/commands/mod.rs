//! CLI command implementations

pub mod config;
pub mod entry;
pub mod keygen;

pub use config::execute as config;
pub use entry::{create, delete, get, update};
pub use keygen::execute as keygen;
