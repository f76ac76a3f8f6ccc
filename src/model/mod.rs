pub mod config;
pub mod habit;

pub use config::*;
pub use habit::*;
