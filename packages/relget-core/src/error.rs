use relget_config::ConfigError;
use relget_provider::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("tool '{tool}' uses unknown provider '{provider}'")]
    UnknownProvider { tool: String, provider: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Provider(ProviderError::Cancelled))
    }
}
