use std::{
    any::Any,
    fmt::{self, Debug, Display, Write},
    rc::Rc,
};

use crate::Span;

use super::types::{FunctionSignature, Type};

/// Node Kinds
///
/// The tag a backend uses to select a lowering strategy for a node.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum NodeKind {
    Function,
    Block,
    Var,
    Identifier,
    IntegerLiteral,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Opaque lowering strategy attached to a node by a backend.
///
/// The AST never inspects what is stored here, so it does not depend on
/// any backend. A backend attaches its own strategy type and downcasts it
/// back when lowering.
#[derive(Clone, Default)]
pub struct Binding(Option<Rc<dyn Any>>);

impl Binding {
    /// Attaches `strategy`, replacing any previous binding.
    pub fn attach<T: Any>(&mut self, strategy: T) {
        self.0 = Some(Rc::new(strategy));
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_ref()?.downcast_ref::<T>()
    }

    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bound() {
            write!(f, "Binding(bound)")
        } else {
            write!(f, "Binding(unbound)")
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub signature: FunctionSignature,
    pub arg_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub var_type: Type,
}

#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub decl: FunctionDecl,
    /// Expected to be a block; anything else fails to lower.
    pub body: Box<Node>,
    pub span: Span,
    pub binding: Binding,
}

#[derive(Debug, Clone)]
pub struct BlockNode {
    pub nodes: Vec<Node>,
    pub span: Span,
    pub binding: Binding,
}

#[derive(Debug, Clone)]
pub struct VarNode {
    pub decl: VarDecl,
    pub value: Option<Box<Node>>,
    pub span: Span,
    pub binding: Binding,
}

#[derive(Debug, Clone)]
pub struct IdentifierNode {
    pub name: String,
    pub span: Span,
    pub binding: Binding,
}

#[derive(Debug, Clone)]
pub struct IntegerLiteralNode {
    pub value: i128,
    pub span: Span,
    pub binding: Binding,
}

/// A node of the syntax tree. Each node owns its children.
#[derive(Debug, Clone)]
pub enum Node {
    Function(FunctionNode),
    Block(BlockNode),
    Var(VarNode),
    Identifier(IdentifierNode),
    IntegerLiteral(IntegerLiteralNode),
}

impl Node {
    pub fn function(name: &str, return_type: Type, body: Node) -> Node {
        Node::Function(FunctionNode {
            decl: FunctionDecl {
                name: name.to_string(),
                signature: FunctionSignature {
                    return_type,
                    arg_types: vec![],
                },
                arg_names: vec![],
            },
            body: Box::new(body),
            span: Span::null(),
            binding: Binding::default(),
        })
    }

    pub fn block(nodes: Vec<Node>) -> Node {
        Node::Block(BlockNode {
            nodes,
            span: Span::null(),
            binding: Binding::default(),
        })
    }

    pub fn var(name: &str, var_type: Type, value: Option<Node>) -> Node {
        Node::Var(VarNode {
            decl: VarDecl {
                name: name.to_string(),
                var_type,
            },
            value: value.map(Box::new),
            span: Span::null(),
            binding: Binding::default(),
        })
    }

    pub fn identifier(name: &str) -> Node {
        Node::Identifier(IdentifierNode {
            name: name.to_string(),
            span: Span::null(),
            binding: Binding::default(),
        })
    }

    pub fn integer(value: i128) -> Node {
        Node::IntegerLiteral(IntegerLiteralNode {
            value,
            span: Span::null(),
            binding: Binding::default(),
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Function(_) => NodeKind::Function,
            Node::Block(_) => NodeKind::Block,
            Node::Var(_) => NodeKind::Var,
            Node::Identifier(_) => NodeKind::Identifier,
            Node::IntegerLiteral(_) => NodeKind::IntegerLiteral,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Node::Function(node) => &node.span,
            Node::Block(node) => &node.span,
            Node::Var(node) => &node.span,
            Node::Identifier(node) => &node.span,
            Node::IntegerLiteral(node) => &node.span,
        }
    }

    pub fn binding(&self) -> &Binding {
        match self {
            Node::Function(node) => &node.binding,
            Node::Block(node) => &node.binding,
            Node::Var(node) => &node.binding,
            Node::Identifier(node) => &node.binding,
            Node::IntegerLiteral(node) => &node.binding,
        }
    }

    pub fn binding_mut(&mut self) -> &mut Binding {
        match self {
            Node::Function(node) => &mut node.binding,
            Node::Block(node) => &mut node.binding,
            Node::Var(node) => &mut node.binding,
            Node::Identifier(node) => &mut node.binding,
            Node::IntegerLiteral(node) => &mut node.binding,
        }
    }

    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Function(node) => vec![node.body.as_ref()],
            Node::Block(node) => node.nodes.iter().collect(),
            Node::Var(node) => node.value.iter().map(|value| value.as_ref()).collect(),
            Node::Identifier(_) | Node::IntegerLiteral(_) => vec![],
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        match self {
            Node::Function(node) => vec![node.body.as_mut()],
            Node::Block(node) => node.nodes.iter_mut().collect(),
            Node::Var(node) => node.value.iter_mut().map(|value| value.as_mut()).collect(),
            Node::Identifier(_) | Node::IntegerLiteral(_) => vec![],
        }
    }

    /// Writes the node as source text, `indent` levels deep.
    ///
    /// The output is accepted by the parser, so printing and re-parsing a
    /// node yields an equivalent tree.
    pub fn print(&self, out: &mut impl Write, indent: usize) -> fmt::Result {
        let pad = Indent(indent);

        match self {
            Node::Function(node) => {
                writeln!(
                    out,
                    "{}fn {} -> {}",
                    pad, node.decl.name, node.decl.signature.return_type
                )?;
                node.body.print(out, indent)
            }
            Node::Block(node) => {
                writeln!(out, "{}{{", pad)?;
                for child in node.nodes.iter() {
                    child.print(out, indent + 1)?;
                }
                writeln!(out, "{}}}", pad)
            }
            Node::Var(node) => {
                write!(out, "{}let {}: {}", pad, node.decl.name, node.decl.var_type)?;
                if let Some(value) = &node.value {
                    write!(out, " = ")?;
                    value.print_inline(out)?;
                }
                writeln!(out, ";")
            }
            Node::Identifier(_) | Node::IntegerLiteral(_) => {
                write!(out, "{}", pad)?;
                self.print_inline(out)?;
                writeln!(out)
            }
        }
    }

    fn print_inline(&self, out: &mut impl Write) -> fmt::Result {
        match self {
            Node::Identifier(node) => write!(out, "{}", node.name),
            Node::IntegerLiteral(node) => write!(out, "{}", node.value),
            // Blocks and declarations never sit in expression position when parsed.
            _ => self.print(out, 0),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print(f, 0)
    }
}

struct Indent(usize);

impl Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:width$}", "", width = self.0 * 4)
    }
}
