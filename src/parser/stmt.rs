use crate::{
    ast::{
        ast::{Binding, BlockNode, FunctionDecl, FunctionNode, Node, VarDecl, VarNode},
        types::FunctionSignature,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{parser::Parser, types::parse_type};

/// Parses a statement inside a block.
///
/// Anything without a statement handler is an expression statement; its
/// trailing `;` is optional.
pub fn parse_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
    }

    Ok(expr)
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start_token = parser.expect(TokenKind::Let)?;

    let name = parser
        .expect_detailed(
            TokenKind::Identifier,
            "expected identifier during variable declaration",
        )?
        .value;

    parser.expect_detailed(TokenKind::Colon, "expected `:` and an explicit type")?;
    let var_type = parse_type(parser, BindingPower::Default)?;

    let value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    } else {
        None
    };

    let end_token = parser.expect(TokenKind::Semicolon)?;

    Ok(Node::Var(VarNode {
        decl: VarDecl { name, var_type },
        value,
        span: Span {
            start: start_token.span.start,
            end: end_token.span.end,
        },
        binding: Binding::default(),
    }))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start_token = parser.expect(TokenKind::OpenCurly)?;

    let mut nodes = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        nodes.push(parse_stmt(parser)?);
    }

    let end_token = parser.expect_detailed(TokenKind::CloseCurly, "expected `}` to close block")?;

    Ok(Node::Block(BlockNode {
        nodes,
        span: Span {
            start: start_token.span.start,
            end: end_token.span.end,
        },
        binding: Binding::default(),
    }))
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start_token = parser.expect(TokenKind::Fn)?;

    let name = parser
        .expect_detailed(TokenKind::Identifier, "expected function name")?
        .value;

    parser.expect_detailed(TokenKind::Arrow, "expected `->` and a return type")?;
    let return_type = parse_type(parser, BindingPower::Default)?;

    let body = parse_block_stmt(parser)?;
    let end = body.span().end.clone();

    Ok(Node::Function(FunctionNode {
        decl: FunctionDecl {
            name,
            signature: FunctionSignature {
                return_type,
                arg_types: vec![],
            },
            arg_names: vec![],
        },
        body: Box::new(body),
        span: Span {
            start: start_token.span.start,
            end,
        },
        binding: Binding::default(),
    }))
}
