pub mod config;
pub mod error;
pub mod error_utils;
pub mod selection;
pub mod thumbnail;
pub mod types;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use selection::*;
pub use thumbnail::*;
pub use types::*;
