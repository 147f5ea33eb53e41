//! Type parsing implementation.
//!
//! Type annotations are a numeric type name followed by any number of `*`
//! suffixes, each wrapping the type so far in a pointer. Parsing uses
//! NUD/LED handlers with binding powers, like expressions.

use std::collections::HashMap;

use crate::{
    ast::types::{NumericType, Type},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;
pub type TypeLEDHandler = fn(&mut Parser, Type, BindingPower) -> Result<Type, Error>;
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_numeric_type);
    parser.type_led(TokenKind::Star, BindingPower::Pointer, parse_pointer_type);
}

pub fn parse_numeric_type(parser: &mut Parser) -> Result<Type, Error> {
    let position = parser.get_position();
    let token = parser.expect(TokenKind::Identifier)?;

    match NumericType::from_name(&token.value) {
        Some(numeric) => Ok(Type::Numeric(numeric)),
        None => Err(Error::new(
            ErrorImpl::UnknownType { type_: token.value },
            position,
        )),
    }
}

pub fn parse_pointer_type(parser: &mut Parser, base: Type, _bp: BindingPower) -> Result<Type, Error> {
    parser.expect(TokenKind::Star)?;

    Ok(Type::pointer_to(base))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().to_string(),
                message: String::from("expected a type"),
            },
            parser.get_position(),
        ));
    };

    let mut left = nud(parser)?;

    // Keep folding suffixes while they bind tighter than the caller.
    loop {
        let token_kind = parser.current_token_kind();
        let Some(next_bp) = parser.get_type_bp_lookup().get(&token_kind).copied() else {
            break;
        };
        if next_bp <= bp {
            break;
        }
        let Some(led) = parser.get_type_led_lookup().get(&token_kind).copied() else {
            break;
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}
