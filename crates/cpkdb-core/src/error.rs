use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every failure in this crate is raised before a statement reaches the
/// backend, so callers never observe a partially rewritten query.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a query-origin invariant violation.
    pub(crate) fn query_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Query,
            message.into(),
        )
    }

    /// Construct an executor-origin internal error.
    pub(crate) fn executor_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Executor, message.into())
    }

    /// Construct a config-origin unsupported error.
    pub(crate) fn config_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, message.into())
    }

    /// Borrow the composite-key detail, if this error carries one.
    #[must_use]
    pub const fn composite_key(&self) -> Option<&CompositeKeyError> {
        match &self.detail {
            Some(ErrorDetail::CompositeKey(err)) => Some(err),
            None => None,
        }
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    CompositeKey(CompositeKeyError),
}

///
/// CompositeKeyError
///
/// Usage errors raised while encoding keys, rewriting predicates, or
/// preparing deletes and bulk updates. None of these are transient.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompositeKeyError {
    #[error("parameter count mismatch: key ({keys}) expects {expected} values, found {found}")]
    ParameterCount {
        keys: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed key token '{token}': expected {expected} segments, found {found}")]
    MalformedKey {
        token: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid key segment '{segment}' for field '{field}'")]
    InvalidKeySegment { field: String, segment: String },

    #[error("key value for field '{field}' is not a scalar")]
    NonScalarKeyValue { field: String },

    #[error("unsupported multi-column lookup '{op}' on '{path}'")]
    UnsupportedLookup { path: String, op: String },

    #[error("{entity} has no identity: {reason}")]
    IllegalState { entity: String, reason: String },

    #[error("batch size must be a positive integer")]
    InvalidBatchSize,

    #[error("field names must be given to bulk update")]
    EmptyUpdateFields,

    #[error("bulk update can only be used with concrete fields: '{field}'")]
    NonConcreteField { field: String },

    #[error("bulk update cannot be used with primary key fields: '{field}'")]
    PrimaryKeyField { field: String },

    #[error("composite key needs at least two columns, found {found}")]
    TooFewKeyColumns { found: usize },

    #[error("entity '{entity}' declares no primary key field")]
    MissingPrimaryKey { entity: String },

    #[error("entity '{entity}' has no field '{field}'")]
    UnknownField { entity: String, field: String },

    #[error("entity '{entity}' is not registered")]
    UnknownEntity { entity: String },

    #[error("field '{field}' on '{entity}' is not a relation")]
    NotARelation { entity: String, field: String },
}

impl CompositeKeyError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedLookup { .. } => ErrorClass::Unsupported,
            Self::UnknownEntity { .. } | Self::UnknownField { .. } => ErrorClass::NotFound,
            Self::IllegalState { .. }
            | Self::MissingPrimaryKey { .. }
            | Self::TooFewKeyColumns { .. } => ErrorClass::InvariantViolation,
            _ => ErrorClass::InvalidArgument,
        }
    }

    pub(crate) const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::MalformedKey { .. }
            | Self::InvalidKeySegment { .. }
            | Self::NonScalarKeyValue { .. }
            | Self::TooFewKeyColumns { .. } => ErrorOrigin::Key,
            Self::MissingPrimaryKey { .. } | Self::UnknownEntity { .. } => ErrorOrigin::Registry,
            Self::IllegalState { .. }
            | Self::InvalidBatchSize
            | Self::EmptyUpdateFields
            | Self::NonConcreteField { .. }
            | Self::PrimaryKeyField { .. } => ErrorOrigin::Executor,
            _ => ErrorOrigin::Query,
        }
    }
}

impl From<CompositeKeyError> for InternalError {
    fn from(err: CompositeKeyError) -> Self {
        Self {
            class: err.class(),
            origin: err.origin(),
            message: err.to_string(),
            detail: Some(ErrorDetail::CompositeKey(err)),
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    InvalidArgument,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::InvalidArgument => "invalid_argument",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Executor,
    Key,
    Query,
    Registry,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Executor => "executor",
            Self::Key => "key",
            Self::Query => "query",
            Self::Registry => "registry",
        };
        write!(f, "{label}")
    }
}
