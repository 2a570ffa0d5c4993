pub mod error;
pub mod registry;
pub mod settings;
pub mod tool;

pub use error::{ConfigError, Result};
pub use registry::{ToolRegistry, ToolsFile};
pub use settings::Settings;
pub use tool::{ToolDescriptor, DEFAULT_PROVIDER};
