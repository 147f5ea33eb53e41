//! Error types and error handling for the compiler.
//!
//! Every phase reports through the same [`errors::Error`] value: a
//! category from [`errors::ErrorImpl`] plus the source position it
//! refers to. Categories are split by phase:
//!
//! - front end: tokens, numbers and type names the parser rejects
//! - checker: type mismatches, unbound names, unrepresentable literals
//! - generator: per-item lowering failures and fatal invariant violations
//! - emission: artifacts whose destination could not be written

pub mod errors;
