use std::fmt;

/// Errors raised while assembling static battle data: loading catalogs or
/// bestiaries from disk and resolving creature action lists at setup.
///
/// Battle-time failures are deliberately not errors; a rejected action is a
/// local no-op carrying an `ActionFailureReason` on the combat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A creature references an action name the catalog does not contain
    UnknownAction(String),
    /// Two catalog entries share a name
    DuplicateAction(String),
    /// A data file could not be read or parsed
    Load(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::UnknownAction(name) => write!(f, "Unknown action: {}", name),
            DataError::DuplicateAction(name) => write!(f, "Duplicate action name: {}", name),
            DataError::Load(details) => write!(f, "Failed to load battle data: {}", details),
        }
    }
}

impl std::error::Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Load(err.to_string())
    }
}

impl From<ron::error::SpannedError> for DataError {
    fn from(err: ron::error::SpannedError) -> Self {
        DataError::Load(err.to_string())
    }
}

/// Type alias for Results using DataError
pub type DataResult<T> = Result<T, DataError>;
