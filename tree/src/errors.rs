use thiserror::Error;

/// Errors raised by the tree engine.
///
/// Storage failures are normally degraded to empty branches before they get
/// here. What does propagate is a missing mapping from a key to a node.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A key reached a node builder that has no mapping for it.
    #[error("{builder} cannot build a node for {key}")]
    UnhandledKey { builder: &'static str, key: String },

    #[error("case store error: {0}")]
    Store(#[from] casetree_casestore::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::Config(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Config(value.to_string())
    }
}
