use thiserror::Error;

/// Settings could not be loaded. Always fatal: nothing can run without them.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Required setting `{0}` is empty")]
    Empty(&'static str),
}
