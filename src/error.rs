use thiserror::Error;

/// Failures surfaced by the dispatcher to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),
    #[error("{0} is not a variable")]
    NotAVariable(String),
    #[error("recursion limit of {limit} exceeded while executing {context}")]
    RecursionLimit { limit: usize, context: String },
}

/// Failures raised while adding or replacing registry entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("identifier {0} is already registered")]
    Duplicate(String),
    #[error("invalid identifier name {0:?}")]
    InvalidName(String),
    #[error("cannot redefine builtin {0} with an alias")]
    NotAnAlias(String),
}

/// Failures raised while splitting a command line into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("missing \"{0}\"")]
    MissingDelimiter(char),
}

/// Failures raised while reading a console configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid console configuration XML")]
    Xml(#[from] roxmltree::Error),
    #[error("expected a <console> root element, found <{0}>")]
    UnexpectedRoot(String),
    #[error("invalid value {value:?} for <{field}>")]
    InvalidValue { field: &'static str, value: String },
}
