use thiserror::Error;

use crate::platform::StylesheetId;

/// Faults surfaced by the platform while reading or writing the document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    /// The element handle no longer refers to an attached element
    #[error("element is detached from the document")]
    DetachedElement,

    /// A stylesheet fragment was removed twice or never inserted
    #[error("unknown stylesheet fragment {0:?}")]
    UnknownStylesheet(StylesheetId),

    /// The host platform does not provide a capability the call needs
    #[error("platform does not support {0}")]
    Unsupported(&'static str),

    /// Any other fault reported by the host
    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, TransitionError>;
