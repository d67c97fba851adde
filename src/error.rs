use crate::session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A landing-page element never appeared
    #[error("{0} did not appear")]
    MissingElement(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
