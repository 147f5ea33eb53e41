/// AST (Abstract Syntax Tree) module
/// Contains the type model and the node tree produced by the front end
///
/// Submodules:
/// - ast: Node variants, the opaque backend binding slot, and printing
/// - types: Numeric and pointer types, assignability, literal inference
pub mod ast;
pub mod types;

#[cfg(test)]
mod tests;
