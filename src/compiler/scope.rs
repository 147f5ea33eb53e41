//! Lexical scopes used while lowering.
//!
//! Frame 0 holds the globals of the compilation unit and is never popped.
//! Every function activation pushes its own frame for locals.

use std::collections::HashMap;

use inkwell::{
    types::BasicTypeEnum,
    values::{GlobalValue, PointerValue},
};

use crate::ast::types::Type;

/// A named value visible to generated code.
#[derive(Debug, Clone)]
pub enum Variable<'ctx> {
    /// A module-level symbol.
    Global {
        ty: Type,
        llvm_type: BasicTypeEnum<'ctx>,
        value: GlobalValue<'ctx>,
    },
    /// A stack slot inside a function.
    Local {
        ty: Type,
        llvm_type: BasicTypeEnum<'ctx>,
        value: PointerValue<'ctx>,
    },
}

impl<'ctx> Variable<'ctx> {
    pub fn ty(&self) -> &Type {
        match self {
            Variable::Global { ty, .. } | Variable::Local { ty, .. } => ty,
        }
    }

    /// Representation of the stored value.
    pub fn llvm_type(&self) -> BasicTypeEnum<'ctx> {
        match self {
            Variable::Global { llvm_type, .. } | Variable::Local { llvm_type, .. } => *llvm_type,
        }
    }

    /// Address of the variable's storage.
    pub fn pointer(&self) -> PointerValue<'ctx> {
        match self {
            Variable::Global { value, .. } => value.as_pointer_value(),
            Variable::Local { value, .. } => *value,
        }
    }
}

#[derive(Debug, Default)]
pub struct Frame<'ctx> {
    pub variables: HashMap<String, Variable<'ctx>>,
    /// Set for the body of a loop.
    pub is_loop: bool,
    /// Set for the outermost frame of a function activation.
    pub is_func: bool,
}

impl<'ctx> Frame<'ctx> {
    pub fn function() -> Self {
        Frame {
            is_func: true,
            ..Default::default()
        }
    }

    pub fn looping() -> Self {
        Frame {
            is_loop: true,
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub struct Scopes<'ctx> {
    frames: Vec<Frame<'ctx>>,
}

impl<'ctx> Default for Scopes<'ctx> {
    fn default() -> Self {
        Scopes::new()
    }
}

impl<'ctx> Scopes<'ctx> {
    pub fn new() -> Self {
        Scopes {
            frames: vec![Frame::default()],
        }
    }

    pub fn push(&mut self, frame: Frame<'ctx>) {
        self.frames.push(frame);
    }

    /// Pops the innermost frame. The global frame stays in place.
    pub fn pop(&mut self) -> Option<Frame<'ctx>> {
        if self.frames.len() == 1 {
            return None;
        }

        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Declares `name` in the innermost frame.
    ///
    /// Returns `false` and keeps the existing variable if the name already
    /// resolves in any frame. Locals never shadow globals or each other.
    pub fn declare(&mut self, name: &str, variable: Variable<'ctx>) -> bool {
        if self.lookup(name).is_some() {
            return false;
        }

        let innermost = self.frames.len() - 1;
        Self::insert(&mut self.frames[innermost], name, variable)
    }

    /// Declares `name` in the global frame, keeping any earlier declaration.
    pub fn declare_global(&mut self, name: &str, variable: Variable<'ctx>) -> bool {
        Self::insert(&mut self.frames[0], name, variable)
    }

    fn insert(frame: &mut Frame<'ctx>, name: &str, variable: Variable<'ctx>) -> bool {
        if frame.variables.contains_key(name) {
            return false;
        }

        frame.variables.insert(name.to_string(), variable);
        true
    }

    /// Resolves `name`, innermost frame first.
    pub fn lookup(&self, name: &str) -> Option<&Variable<'ctx>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(name))
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Variable<'ctx>> {
        self.frames[0].variables.get(name)
    }

    pub fn in_function(&self) -> bool {
        self.frames.iter().any(|frame| frame.is_func)
    }

    /// Whether the innermost function activation is inside a loop.
    pub fn in_loop(&self) -> bool {
        for frame in self.frames.iter().rev() {
            if frame.is_loop {
                return true;
            }
            if frame.is_func {
                return false;
            }
        }

        false
    }
}
