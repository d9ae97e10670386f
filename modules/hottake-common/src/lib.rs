pub mod config;
pub mod error;
pub mod registry;
pub mod settings;
pub mod types;

pub use config::Config;
pub use error::HottakeError;
pub use registry::StanceRegistry;
pub use settings::Settings;
pub use types::*;
