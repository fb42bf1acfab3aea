use cpkdb_core::error::{
    CompositeKeyError, ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match (err.composite_key(), err.class) {
            (
                Some(
                    CompositeKeyError::MalformedKey { .. }
                    | CompositeKeyError::InvalidKeySegment { .. }
                    | CompositeKeyError::NonScalarKeyValue { .. }
                    | CompositeKeyError::ParameterCount { .. },
                ),
                _,
            ) => ErrorKind::Key,
            (Some(CompositeKeyError::IllegalState { .. }), _) => ErrorKind::IllegalState,
            (_, ErrorClass::Unsupported) => ErrorKind::Query(QueryErrorKind::Unsupported),
            (_, ErrorClass::NotFound) => ErrorKind::Query(QueryErrorKind::NotFound),
            (_, ErrorClass::InvalidArgument) => ErrorKind::Query(QueryErrorKind::Invalid),
            (_, ErrorClass::Internal | ErrorClass::InvariantViolation) => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),

    /// A key token or operand does not match the key's shape.
    Key,

    /// The entity has no identity yet (its key is not fully set).
    IllegalState,

    /// The caller cannot remediate this.
    Internal,
}

///
/// QueryErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Lookup or argument shape is invalid.
    Invalid,

    /// The lookup is valid but not supported on a multi-column key.
    Unsupported,

    /// An entity or field named by the query does not exist.
    NotFound,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Executor,
    Key,
    Query,
    Registry,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Executor => Self::Executor,
            CoreErrorOrigin::Key => Self::Key,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Registry => Self::Registry,
        }
    }
}
