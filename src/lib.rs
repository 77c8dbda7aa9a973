pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod log;
pub mod tools;
pub mod util;

pub use engine::Engine;
pub use error::{Error, Result};
pub use tools::TaskAgent;
