//! Unit tests for the parser module.
//!
//! This module contains tests for parsing:
//! - Variable declarations, with and without initializers
//! - Function declarations and their bodies
//! - Pointer type annotations
//! - Malformed input
//! - Printing a tree and parsing it back

use std::rc::Rc;

use indoc::indoc;
use pretty_assertions::assert_eq;

use super::parser::parse;
use crate::{
    ast::{
        ast::Node,
        types::{LiteralStrategy, NumericType, TargetInfo, Type},
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
    type_checker::type_checker::TypeChecker,
};

fn parse_source(source: &str) -> Result<Vec<Node>, Error> {
    let tokens = tokenize(source.to_string(), Some("test.noct".to_string()))?;
    let (_, result) = parse(tokens, Rc::new("test.noct".to_string()));
    result
}

fn error_name(source: &str) -> String {
    parse_source(source).unwrap_err().get_error_name().to_string()
}

#[test]
fn test_parse_variable_declaration() {
    let program = parse_source("let x: i32 = 42;").unwrap();

    assert_eq!(program.len(), 1);
    let Node::Var(var) = &program[0] else {
        panic!("expected a variable, got {:?}", program[0]);
    };
    assert_eq!(var.decl.name, "x");
    assert_eq!(var.decl.var_type, Type::Numeric(NumericType::I32));
    assert!(matches!(
        var.value.as_deref(),
        Some(Node::IntegerLiteral(literal)) if literal.value == 42
    ));
}

#[test]
fn test_parse_variable_without_initializer() {
    let program = parse_source("let counter: u16;").unwrap();

    let Node::Var(var) = &program[0] else {
        panic!("expected a variable");
    };
    assert!(var.value.is_none());
}

#[test]
fn test_parse_negative_and_separated_literals() {
    let program = parse_source("let a: i64 = -1_000; let b: u32 = 4_294_967_295;").unwrap();

    let values: Vec<i128> = program
        .iter()
        .filter_map(|item| match item {
            Node::Var(var) => match var.value.as_deref() {
                Some(Node::IntegerLiteral(literal)) => Some(literal.value),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(values, vec![-1000, 4_294_967_295]);
}

#[test]
fn test_parse_pointer_types() {
    let program = parse_source("let p: u8** = x;").unwrap();

    let Node::Var(var) = &program[0] else {
        panic!("expected a variable");
    };
    assert_eq!(
        var.decl.var_type,
        Type::pointer_to(Type::pointer_to(Type::Numeric(NumericType::U8)))
    );
}

#[test]
fn test_parse_function_declaration() {
    let program = parse_source(indoc! {"
        fn answer -> i64 {
            let local: i8 = 2;
            { 3; }
            local
        }
    "})
    .unwrap();

    let Node::Function(function) = &program[0] else {
        panic!("expected a function");
    };
    assert_eq!(function.decl.name, "answer");
    assert_eq!(
        function.decl.signature.return_type,
        Type::Numeric(NumericType::I64)
    );

    let Node::Block(body) = function.body.as_ref() else {
        panic!("expected a block body");
    };
    let kinds: Vec<_> = body.nodes.iter().map(|node| node.kind().to_string()).collect();
    assert_eq!(kinds, vec!["Var", "Block", "Identifier"]);
}

#[test]
fn test_parse_spans_cover_declaration() {
    let program = parse_source("  let x: i8 = 1;").unwrap();

    assert_eq!(program[0].span().start.0, 2);
    assert_eq!(program[0].span().end.0, 16);
}

#[test]
fn test_parse_errors() {
    assert_eq!(error_name("5;"), "UnexpectedTokenDetailed");
    assert_eq!(error_name("let x = 5;"), "UnexpectedTokenDetailed");
    assert_eq!(error_name("let x: i32 = 5"), "UnexpectedToken");
    assert_eq!(error_name("let x: int = 5;"), "UnknownType");
    assert_eq!(error_name("fn f -> i32 { 1"), "UnexpectedTokenDetailed");
    assert_eq!(error_name("fn f -> i32 10"), "UnexpectedToken");
    assert_eq!(error_name("let x: i32 = - y;"), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_number_overflow() {
    let error = parse_source("let x: i64 = 999999999999999999999999999999999999999999;").unwrap_err();

    assert_eq!(error.get_error_name(), "NumberParseError");
    assert_eq!(error.get_position().0, 13);
}

#[test]
fn test_print_output() {
    let program = parse_source("fn f -> i64 { let y: i8* ; 10 }").unwrap();

    assert_eq!(
        program[0].to_string(),
        indoc! {"
            fn f -> i64
            {
                let y: i8*;
                10
            }
        "}
    );
}

/// Types every item in order with a fresh checker, keeping error names.
fn check(program: &[Node]) -> Vec<Result<Option<Type>, String>> {
    let mut checker = TypeChecker::new(TargetInfo::default(), LiteralStrategy::default());

    program
        .iter()
        .map(|item| {
            checker
                .type_of(item)
                .map_err(|error| error.get_error_name().to_string())
        })
        .collect()
}

#[test]
fn test_print_then_parse_preserves_types() {
    let source = indoc! {"
        let a: i32 = 5;
        let b: i64 = a;
        let c: i8 = 300;
        let d: u8*;
        fn f -> i64 {
            let local: i16 = -7;
            { let inner: u64 = 1; }
            local
        }
        fn g -> i8 { b }
        fn h -> i32 { }
    "};

    let program = parse_source(source).unwrap();

    let mut printed = String::new();
    for item in program.iter() {
        printed.push_str(&item.to_string());
    }

    let reparsed = parse_source(&printed).unwrap();

    assert_eq!(check(&program), check(&reparsed));
    assert_eq!(printed, reparsed.iter().map(|item| item.to_string()).collect::<String>());
}
