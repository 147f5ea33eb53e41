//! Type checking module.
//!
//! This module assigns a static type to every node and rejects programs
//! whose declarations do not accept the values given to them. It covers:
//!
//! - Literal type inference under the configured strategy
//! - Name resolution against a flat, first-declaration-wins environment
//! - Assignability checks for variable initializers and function bodies
//!
//! Items are typed in program order; a name is only visible to items that
//! come after its declaration.

pub mod type_checker;
