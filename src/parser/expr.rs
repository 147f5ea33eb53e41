use crate::{
    ast::ast::{Binding, IdentifierNode, IntegerLiteralNode, Node},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Node, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = parser
            .get_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected());
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Parses integer text, ignoring `_` digit separators.
fn parse_number(token: &Token, negative: bool) -> Result<i128, Error> {
    let digits: String = token.value.chars().filter(|c| *c != '_').collect();
    let text = if negative { format!("-{}", digits) } else { digits };

    text.parse::<i128>().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError { token: text.clone() },
            token.span.start.clone(),
        )
    })
}

pub fn parse_integer_expr(parser: &mut Parser) -> Result<Node, Error> {
    let token = parser.expect(TokenKind::Number)?;
    let value = parse_number(&token, false)?;

    Ok(Node::IntegerLiteral(IntegerLiteralNode {
        value,
        span: token.span,
        binding: Binding::default(),
    }))
}

/// Parses `- NUMBER` as a single negative literal.
pub fn parse_negative_expr(parser: &mut Parser) -> Result<Node, Error> {
    let dash = parser.expect(TokenKind::Dash)?;
    let token = parser.expect_detailed(TokenKind::Number, "expected an integer after `-`")?;
    let value = parse_number(&token, true)?;

    Ok(Node::IntegerLiteral(IntegerLiteralNode {
        value,
        span: Span {
            start: dash.span.start,
            end: token.span.end,
        },
        binding: Binding::default(),
    }))
}

pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Node, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    Ok(Node::Identifier(IdentifierNode {
        name: token.value,
        span: token.span,
        binding: Binding::default(),
    }))
}
