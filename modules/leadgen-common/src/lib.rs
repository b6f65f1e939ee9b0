pub mod config;
pub mod error;
pub mod industry;
pub mod safety;
pub mod types;

pub use config::Config;
pub use error::LeadgenError;
pub use industry::*;
pub use safety::*;
pub use types::*;
