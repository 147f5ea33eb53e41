//! Per-node lowering strategies and the table that binds them to nodes.
//!
//! The syntax tree only carries an opaque [`Binding`](crate::ast::ast::Binding)
//! slot. The [`LoweringTable`] picks a strategy by [`NodeKind`] and stores it
//! in that slot; the generator later reads it back and lets the strategy
//! emit code for the node.

use std::{collections::HashMap, fmt::Debug, rc::Rc};

use inkwell::{
    module::Linkage,
    types::BasicType,
    values::{BasicValueEnum, FunctionValue},
};

use crate::{
    ast::{
        ast::{BlockNode, FunctionNode, IdentifierNode, IntegerLiteralNode, Node, NodeKind, VarNode},
        types::{NumericType, Type},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    compiler::{backend_error, is_constant, Generator},
    scope::{Frame, Variable},
};

/// A generated value together with its static type.
#[derive(Debug, Clone)]
pub struct Lowered<'ctx> {
    pub value: BasicValueEnum<'ctx>,
    pub ty: Type,
}

pub type LowerResult<'ctx> = Result<Option<Lowered<'ctx>>, Error>;

/// Emits code for one kind of node.
pub trait Lower: Debug {
    fn lower<'ctx>(&self, node: &Node, generator: &mut Generator<'ctx>) -> LowerResult<'ctx>;
}

/// Strategy handed a node of another kind; only happens if the table is miswired.
fn mismatched(strategy: &str, node: &Node) -> Error {
    Error::new(
        ErrorImpl::InternalBindingFailure {
            detail: format!("{} cannot lower a {} node", strategy, node.kind()),
        },
        node.span().start.clone(),
    )
}

#[derive(Debug)]
pub struct FunctionLowering;

impl Lower for FunctionLowering {
    fn lower<'ctx>(&self, node: &Node, generator: &mut Generator<'ctx>) -> LowerResult<'ctx> {
        let Node::Function(function) = node else {
            return Err(mismatched("FunctionLowering", node));
        };
        let name = &function.decl.name;

        if generator.symbol_taken(name) {
            tracing::warn!(function = %name, "symbol already defined, skipping function");
            return Ok(None);
        }

        let return_type = &function.decl.signature.return_type;
        let llvm_return = generator.convert_type(return_type, &function.span.start)?;
        let function_value = generator.module.add_function(
            name,
            llvm_return.fn_type(&[], false),
            Some(Linkage::External),
        );

        let previous_block = generator.builder.get_insert_block();
        let entry = generator.context.append_basic_block(function_value, "entry");
        generator.builder.position_at_end(entry);
        generator.scopes.push(Frame::function());

        let result = lower_function_body(function, function_value, generator);

        generator.scopes.pop();
        match previous_block {
            Some(block) => generator.builder.position_at_end(block),
            None => generator.builder.clear_insertion_position(),
        }

        if let Err(error) = result {
            tracing::debug!(function = %name, "discarding partially built function");
            // Nothing refers to the function once its body is abandoned.
            unsafe { function_value.delete() };
            return Err(error);
        }

        tracing::debug!(function = %name, "lowered function");
        Ok(None)
    }
}

fn lower_function_body<'ctx>(
    function: &FunctionNode,
    function_value: FunctionValue<'ctx>,
    generator: &mut Generator<'ctx>,
) -> Result<(), Error> {
    let name = &function.decl.name;
    let position = &function.span.start;

    if !matches!(function.body.as_ref(), Node::Block(_)) {
        return Err(Error::new(
            ErrorImpl::MalformedFunctionBody {
                function: name.clone(),
            },
            position.clone(),
        ));
    }

    let Some(body) = generator.lower(&function.body)? else {
        return Err(Error::new(
            ErrorImpl::InvalidFunction {
                function: name.clone(),
                reason: String::from("the body produces no value to return"),
            },
            position.clone(),
        ));
    };

    let return_value = generator.coerce(body, &function.decl.signature.return_type, position)?;
    generator
        .builder
        .build_return(Some(&return_value))
        .map_err(|error| backend_error(error, position))?;

    if !function_value.verify(false) {
        return Err(Error::new(
            ErrorImpl::InvalidFunction {
                function: name.clone(),
                reason: String::from("the generated code failed verification"),
            },
            position.clone(),
        ));
    }

    Ok(())
}

#[derive(Debug)]
pub struct BlockLowering;

impl Lower for BlockLowering {
    fn lower<'ctx>(&self, node: &Node, generator: &mut Generator<'ctx>) -> LowerResult<'ctx> {
        let Node::Block(BlockNode { nodes, .. }) = node else {
            return Err(mismatched("BlockLowering", node));
        };

        let mut last = None;
        for statement in nodes.iter() {
            last = generator.lower(statement)?;
        }

        Ok(last)
    }
}

#[derive(Debug)]
pub struct VarLowering;

impl Lower for VarLowering {
    fn lower<'ctx>(&self, node: &Node, generator: &mut Generator<'ctx>) -> LowerResult<'ctx> {
        let Node::Var(var) = node else {
            return Err(mismatched("VarLowering", node));
        };

        if generator.scopes.in_function() {
            lower_local(var, generator)
        } else {
            lower_global(var, generator)
        }
    }
}

/// Lowers the initializer of `var` and converts it to the declared type.
fn lower_initializer<'ctx>(
    var: &VarNode,
    generator: &mut Generator<'ctx>,
) -> Result<Option<BasicValueEnum<'ctx>>, Error> {
    let Some(value) = &var.value else {
        return Ok(None);
    };

    match generator.lower(value)? {
        Some(lowered) => Ok(Some(generator.coerce(lowered, &var.decl.var_type, &var.span.start)?)),
        // Type checking rejects initializers without a type.
        None => Err(Error::new(
            ErrorImpl::Backend {
                message: format!("initializer of `{}` produced no value", var.decl.name),
            },
            var.span.start.clone(),
        )),
    }
}

fn lower_global<'ctx>(var: &VarNode, generator: &mut Generator<'ctx>) -> LowerResult<'ctx> {
    let name = &var.decl.name;
    let position = &var.span.start;

    if generator.symbol_taken(name) {
        tracing::warn!(global = %name, "symbol already defined, skipping global");
        return Ok(None);
    }

    let llvm_type = generator.convert_type(&var.decl.var_type, position)?;
    let initializer = lower_initializer(var, generator)?;

    if let Some(value) = initializer {
        if !is_constant(value) {
            return Err(Error::new(
                ErrorImpl::NonConstantGlobalInitializer { name: name.clone() },
                position.clone(),
            ));
        }
    }

    let global = generator.module.add_global(llvm_type, None, name);
    let value = match initializer {
        Some(value) => {
            global.set_initializer(&value);
            global.set_constant(true);
            value
        }
        None => {
            let zero = llvm_type.const_zero();
            global.set_initializer(&zero);
            zero
        }
    };

    generator.scopes.declare_global(
        name,
        Variable::Global {
            ty: var.decl.var_type.clone(),
            llvm_type,
            value: global,
        },
    );
    tracing::debug!(global = %name, constant = global.is_constant(), "lowered global");

    Ok(Some(Lowered {
        value,
        ty: var.decl.var_type.clone(),
    }))
}

fn lower_local<'ctx>(var: &VarNode, generator: &mut Generator<'ctx>) -> LowerResult<'ctx> {
    let name = &var.decl.name;
    let position = &var.span.start;

    let llvm_type = generator.convert_type(&var.decl.var_type, position)?;
    let value = match lower_initializer(var, generator)? {
        Some(value) => value,
        None => llvm_type.const_zero(),
    };

    // The first declaration of a name stays the one every later use reads.
    if generator.scopes.lookup(name).is_some() {
        tracing::warn!(local = %name, "name already declared, keeping the first declaration");
        return Ok(Some(Lowered {
            value,
            ty: var.decl.var_type.clone(),
        }));
    }

    let slot = generator
        .builder
        .build_alloca(llvm_type, name)
        .map_err(|error| backend_error(error, position))?;
    generator
        .builder
        .build_store(slot, value)
        .map_err(|error| backend_error(error, position))?;

    generator.scopes.declare(
        name,
        Variable::Local {
            ty: var.decl.var_type.clone(),
            llvm_type,
            value: slot,
        },
    );

    Ok(Some(Lowered {
        value,
        ty: var.decl.var_type.clone(),
    }))
}

#[derive(Debug)]
pub struct IdentifierLowering;

impl Lower for IdentifierLowering {
    fn lower<'ctx>(&self, node: &Node, generator: &mut Generator<'ctx>) -> LowerResult<'ctx> {
        let Node::Identifier(IdentifierNode { name, span, .. }) = node else {
            return Err(mismatched("IdentifierLowering", node));
        };

        let Some(variable) = generator.scopes.lookup(name).cloned() else {
            return Err(Error::new(
                ErrorImpl::UnresolvedSymbolDuringLowering { name: name.clone() },
                span.start.clone(),
            ));
        };
        let ty = variable.ty().clone();

        if !generator.scopes.in_function() {
            return fold_global(name, &variable, &span.start).map(|value| Some(Lowered { value, ty }));
        }

        let value = generator
            .builder
            .build_load(variable.pointer(), name)
            .map_err(|error| backend_error(error, &span.start))?;

        if value.get_type() != variable.llvm_type() {
            return Err(backend_error(
                format!(
                    "`{}` loaded as {:?} but was declared as {:?}",
                    name,
                    value.get_type(),
                    variable.llvm_type()
                ),
                &span.start,
            ));
        }

        Ok(Some(Lowered { value, ty }))
    }
}

/// Value of a global referenced from another global's initializer.
fn fold_global<'ctx>(
    name: &str,
    variable: &Variable<'ctx>,
    position: &Position,
) -> Result<BasicValueEnum<'ctx>, Error> {
    match variable {
        Variable::Global { value, .. } if value.is_constant() => {
            value.get_initializer().ok_or_else(|| {
                Error::new(
                    ErrorImpl::NonConstantGlobalInitializer {
                        name: name.to_string(),
                    },
                    position.clone(),
                )
            })
        }
        _ => Err(Error::new(
            ErrorImpl::NonConstantGlobalInitializer {
                name: name.to_string(),
            },
            position.clone(),
        )),
    }
}

#[derive(Debug)]
pub struct IntegerLiteralLowering;

impl Lower for IntegerLiteralLowering {
    fn lower<'ctx>(&self, node: &Node, generator: &mut Generator<'ctx>) -> LowerResult<'ctx> {
        let Node::IntegerLiteral(IntegerLiteralNode { value, span, .. }) = node else {
            return Err(mismatched("IntegerLiteralLowering", node));
        };

        let numeric = generator.literal_strategy.infer(*value);
        if numeric == NumericType::Unknown {
            return Err(Error::new(
                ErrorImpl::UnknownLiteralType { literal: *value },
                span.start.clone(),
            ));
        }

        let ty = Type::Numeric(numeric);
        let int_type = generator
            .convert_type(&ty, &span.start)?
            .into_int_type();
        // Truncation to the chosen width keeps the two's complement bits.
        let constant = int_type.const_int(*value as u64, numeric.is_signed());

        Ok(Some(Lowered {
            value: constant.into(),
            ty,
        }))
    }
}

/// Maps node kinds to the strategy that lowers them.
#[derive(Debug, Default)]
pub struct LoweringTable {
    strategies: HashMap<NodeKind, Rc<dyn Lower>>,
}

impl LoweringTable {
    /// Table with a strategy for every node kind.
    pub fn standard() -> Self {
        let mut table = LoweringTable::default();
        table.register(NodeKind::Function, Rc::new(FunctionLowering));
        table.register(NodeKind::Block, Rc::new(BlockLowering));
        table.register(NodeKind::Var, Rc::new(VarLowering));
        table.register(NodeKind::Identifier, Rc::new(IdentifierLowering));
        table.register(NodeKind::IntegerLiteral, Rc::new(IntegerLiteralLowering));
        table
    }

    pub fn register(&mut self, kind: NodeKind, strategy: Rc<dyn Lower>) {
        self.strategies.insert(kind, strategy);
    }

    pub fn unregister(&mut self, kind: NodeKind) -> Option<Rc<dyn Lower>> {
        self.strategies.remove(&kind)
    }

    /// Attaches the strategy for `node`'s kind, replacing any previous one.
    pub fn bind(&self, node: &mut Node) -> Result<(), Error> {
        let kind = node.kind();
        let Some(strategy) = self.strategies.get(&kind) else {
            return Err(Error::new(
                ErrorImpl::InternalBindingFailure {
                    detail: format!("no lowering registered for {} nodes", kind),
                },
                node.span().start.clone(),
            ));
        };

        node.binding_mut().attach(Rc::clone(strategy));
        Ok(())
    }

    /// Binds every descendant of `node`.
    pub fn propagate(&self, node: &mut Node) -> Result<(), Error> {
        for child in node.children_mut() {
            self.bind(child)?;
            self.propagate(child)?;
        }

        Ok(())
    }
}
