//! Settings a caller passes into a compilation unit.

use crate::{
    ast::types::{LiteralStrategy, TargetInfo},
    compiler::output::OutputOptions,
};

/// What the driver does after an item fails to type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Halt the top-level traversal at the first failing item.
    #[default]
    StopAtFirstError,
    /// Skip the failing item and carry on with the next one.
    Continue,
}

#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Name of the generated module.
    pub module_name: String,
    pub outputs: OutputOptions,
    pub literal_strategy: LiteralStrategy,
    pub target: TargetInfo,
    pub error_policy: ErrorPolicy,
}

impl CompileConfig {
    pub fn new(module_name: &str) -> Self {
        CompileConfig {
            module_name: module_name.to_string(),
            outputs: OutputOptions::default(),
            literal_strategy: LiteralStrategy::default(),
            target: TargetInfo::default(),
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig::new("main")
    }
}
