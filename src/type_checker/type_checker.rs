use std::collections::{HashMap, HashSet};

use crate::{
    ast::{
        ast::{BlockNode, FunctionNode, IdentifierNode, IntegerLiteralNode, Node, VarNode},
        types::{LiteralStrategy, NumericType, TargetInfo, Type},
    },
    config::{CompileConfig, ErrorPolicy},
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// Result of typing a node. `Ok(None)` is the type of an empty block.
pub type TypeResult = Result<Option<Type>, Error>;

/// Outcome of binding a name in the [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound,
    /// The name was already bound. The first binding is kept.
    AlreadyBound,
}

/// Name to type table used while type checking.
///
/// Declaring a name twice keeps the first declaration: the second bind is
/// ignored rather than shadowing or failing.
#[derive(Debug, Default)]
pub struct Environment {
    variable_lookup: HashMap<String, Type>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn bind(&mut self, name: &str, variable_type: Type) -> BindOutcome {
        if self.variable_lookup.contains_key(name) {
            tracing::debug!(name, "ignoring redeclaration, first declaration wins");
            BindOutcome::AlreadyBound
        } else {
            self.variable_lookup.insert(name.to_string(), variable_type);
            BindOutcome::Bound
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.variable_lookup.get(name)
    }

    /// Names bound so far, to be handed back to [`Environment::restore`].
    pub fn snapshot(&self) -> HashSet<String> {
        self.variable_lookup.keys().cloned().collect()
    }

    /// Forgets every name bound since `snapshot` was taken.
    ///
    /// Earlier bindings are never overwritten, so they survive unchanged.
    pub fn restore(&mut self, snapshot: &HashSet<String>) {
        self.variable_lookup.retain(|name, _| snapshot.contains(name));
    }

    pub fn len(&self) -> usize {
        self.variable_lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variable_lookup.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct TypeChecker {
    pub environment: Environment,
    pub target: TargetInfo,
    pub literal_strategy: LiteralStrategy,
}

impl TypeChecker {
    pub fn new(target: TargetInfo, literal_strategy: LiteralStrategy) -> Self {
        TypeChecker {
            environment: Environment::new(),
            target,
            literal_strategy,
        }
    }

    /// Computes the static type of `node`, binding declarations on the way.
    ///
    /// The walk is a single depth-first, left-to-right pass. Names are only
    /// visible after the declaration that binds them has been typed.
    pub fn type_of(&mut self, node: &Node) -> TypeResult {
        match node {
            Node::Function(function) => self.type_of_function(function),
            Node::Block(block) => self.type_of_block(block),
            Node::Var(var) => self.type_of_var(var),
            Node::Identifier(identifier) => self.type_of_identifier(identifier),
            Node::IntegerLiteral(literal) => self.type_of_integer(literal),
        }
    }

    fn type_of_function(&mut self, function: &FunctionNode) -> TypeResult {
        // Locals stay inside the function that declares them.
        let outer = self.environment.snapshot();
        let body_type = self.type_of(&function.body);
        self.environment.restore(&outer);

        let body_type = body_type?;
        let return_type = &function.decl.signature.return_type;

        self.expect_assignable(return_type, body_type.as_ref(), &function.span.start)?;

        Ok(Some(return_type.clone()))
    }

    fn type_of_block(&mut self, block: &BlockNode) -> TypeResult {
        let mut last = None;

        // Every statement is typed so that interior errors surface too.
        for node in block.nodes.iter() {
            last = self.type_of(node)?;
        }

        Ok(last)
    }

    fn type_of_var(&mut self, var: &VarNode) -> TypeResult {
        let declared = &var.decl.var_type;

        if let Some(value) = &var.value {
            let value_type = self.type_of(value)?;
            self.expect_assignable(declared, value_type.as_ref(), &var.span.start)?;
        }

        self.environment.bind(&var.decl.name, declared.clone());

        Ok(Some(declared.clone()))
    }

    fn type_of_identifier(&mut self, identifier: &IdentifierNode) -> TypeResult {
        match self.environment.lookup(&identifier.name) {
            Some(ty) => Ok(Some(ty.clone())),
            None => Err(Error::new(
                ErrorImpl::UnboundName {
                    name: identifier.name.clone(),
                },
                identifier.span.start.clone(),
            )),
        }
    }

    fn type_of_integer(&mut self, literal: &IntegerLiteralNode) -> TypeResult {
        match self.literal_strategy.infer(literal.value) {
            NumericType::Unknown => Err(Error::new(
                ErrorImpl::UnknownLiteralType {
                    literal: literal.value,
                },
                literal.span.start.clone(),
            )),
            numeric => Ok(Some(Type::Numeric(numeric))),
        }
    }

    fn expect_assignable(
        &self,
        expected: &Type,
        received: Option<&Type>,
        position: &Position,
    ) -> Result<(), Error> {
        match received {
            Some(received) if expected.assignable_from(received, &self.target) => Ok(()),
            _ => Err(Error::new(
                ErrorImpl::TypeMismatch {
                    expected: expected.to_string(),
                    received: received
                        .map(|ty| ty.to_string())
                        .unwrap_or_else(|| String::from("<none>")),
                },
                position.clone(),
            )),
        }
    }
}

/// Type checks every top-level item of `program` in order.
///
/// Returns the checker, whose environment holds every binding made, and
/// the errors found. With [`ErrorPolicy::StopAtFirstError`] the walk halts
/// at the first failing item.
#[tracing::instrument(skip_all, fields(items = program.len()))]
pub fn type_check(program: &[Node], config: &CompileConfig) -> (TypeChecker, Vec<Error>) {
    let mut type_checker = TypeChecker::new(config.target, config.literal_strategy);
    let mut errors = vec![];

    for item in program.iter() {
        if let Err(error) = type_checker.type_of(item) {
            tracing::debug!(error = %error, "item failed to type check");
            errors.push(error);

            if config.error_policy == ErrorPolicy::StopAtFirstError {
                break;
            }
        }
    }

    (type_checker, errors)
}
