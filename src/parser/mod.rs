//! Parser module for building the syntax tree.
//!
//! This module contains the parser that transforms a stream of tokens
//! into a tree of `Node`s. It uses a Pratt parser with token lookup
//! tables and handles:
//!
//! - Top-level items (function and variable declarations)
//! - Block statements and expression statements
//! - Integer literals and identifiers
//! - Type parsing for type annotations, including pointer suffixes
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
