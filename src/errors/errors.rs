use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::UnboundName { .. } => "UnboundName",
            ErrorImpl::UnknownLiteralType { .. } => "UnknownLiteralType",
            ErrorImpl::NonConstantGlobalInitializer { .. } => "NonConstantGlobalInitializer",
            ErrorImpl::MalformedFunctionBody { .. } => "MalformedFunctionBody",
            ErrorImpl::InvalidFunction { .. } => "InvalidFunction",
            ErrorImpl::InternalBindingFailure { .. } => "InternalBindingFailure",
            ErrorImpl::UnresolvedSymbolDuringLowering { .. } => "UnresolvedSymbolDuringLowering",
            ErrorImpl::Backend { .. } => "Backend",
            ErrorImpl::OutputDestinationError { .. } => "OutputDestinationError",
            ErrorImpl::TargetUnavailable { .. } => "TargetUnavailable",
        }
    }

    /// Invariant violations that must abort the compilation unit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::InternalBindingFailure { .. }
                | ErrorImpl::UnresolvedSymbolDuringLowering { .. }
                | ErrorImpl::Backend { .. }
        )
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::UnboundName { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared", name))
            }
            ErrorImpl::UnknownLiteralType { literal } => ErrorTip::Suggestion(format!(
                "No integer type can represent `{}`",
                literal
            )),
            ErrorImpl::NonConstantGlobalInitializer { name } => ErrorTip::Suggestion(format!(
                "Global initializer must be a compile-time constant, `{}` is not",
                name
            )),
            ErrorImpl::MalformedFunctionBody { function } => ErrorTip::Suggestion(format!(
                "The body of function `{}` must be a block",
                function
            )),
            ErrorImpl::InvalidFunction { function, reason } => {
                ErrorTip::Suggestion(format!("Function `{}` is invalid: {}", function, reason))
            }
            ErrorImpl::InternalBindingFailure { detail } => ErrorTip::Suggestion(format!(
                "Internal compiler error while binding: {}",
                detail
            )),
            ErrorImpl::UnresolvedSymbolDuringLowering { name } => ErrorTip::Suggestion(format!(
                "Internal compiler error: `{}` has no generated symbol",
                name
            )),
            ErrorImpl::Backend { message } => {
                ErrorTip::Suggestion(format!("Internal compiler error: {}", message))
            }
            ErrorImpl::OutputDestinationError { path, message } => {
                ErrorTip::Suggestion(format!("Could not write `{}`: {}", path, message))
            }
            ErrorImpl::TargetUnavailable { message } => {
                ErrorTip::Suggestion(format!("Host target is unavailable: {}", message))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },

    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("name {name:?} is not bound")]
    UnboundName { name: String },
    #[error("no integer type for literal {literal}")]
    UnknownLiteralType { literal: i128 },

    #[error("initializer of global {name:?} is not constant")]
    NonConstantGlobalInitializer { name: String },
    #[error("body of function {function:?} is not a block")]
    MalformedFunctionBody { function: String },
    #[error("function {function:?} is invalid: {reason}")]
    InvalidFunction { function: String, reason: String },
    #[error("binding failure: {detail}")]
    InternalBindingFailure { detail: String },
    #[error("symbol {name:?} unresolved during lowering")]
    UnresolvedSymbolDuringLowering { name: String },
    #[error("backend error: {message}")]
    Backend { message: String },

    #[error("could not open {path:?}: {message}")]
    OutputDestinationError { path: String, message: String },
    #[error("target unavailable: {message}")]
    TargetUnavailable { message: String },
}
