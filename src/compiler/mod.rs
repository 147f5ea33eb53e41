//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based code generator that lowers the
//! syntax tree into an LLVM module. It handles:
//!
//! - Binding a lowering strategy to every node by its kind
//! - Lowering functions, blocks, variables, identifiers and literals
//! - Scopes for globals and function locals
//! - Type conversion from language types to LLVM types
//! - Writing object, assembly and IR artifacts

pub mod compiler;
pub mod lowering;
pub mod output;
pub mod scope;
