//! Integration tests for end-to-end compilation.
//!
//! These tests verify that the complete compilation pipeline works correctly
//! from source code through tokenization, parsing, type checking, binding and
//! LLVM IR generation, up to writing artifacts.

use std::{fs, rc::Rc};

use indoc::indoc;
use inkwell::context::Context;
use noct::{
    ast::{
        ast::{Node, NodeKind},
        types::{NumericType, Type},
    },
    compiler::{
        compiler::{compile, Compilation, Generator},
        output::OutputOptions,
    },
    config::{CompileConfig, ErrorPolicy},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn parse_program(source: &str) -> Vec<Node> {
    let tokens = tokenize(source.to_string(), Some("test.noct".to_string())).unwrap();
    let (_, program) = parse(tokens, Rc::new("test.noct".to_string()));
    program.unwrap()
}

fn compile_source<'ctx>(
    source: &str,
    config: &CompileConfig,
    context: &'ctx Context,
) -> Compilation<'ctx> {
    let mut program = parse_program(source);
    compile(&mut program, config, context).unwrap()
}

fn error_names(compilation: &Compilation) -> Vec<String> {
    compilation
        .diagnostics
        .iter()
        .map(|error| error.get_error_name().to_string())
        .collect()
}

fn global_constant(compilation: &Compilation, name: &str) -> Option<i64> {
    let global = compilation.generator.module.get_global(name)?;
    assert!(global.is_constant(), "`{}` should be constant", name);

    global
        .get_initializer()?
        .into_int_value()
        .get_sign_extended_constant()
}

#[test]
fn test_compile_global_constant() {
    let context = Context::create();
    let compilation = compile_source("let x: i32 = 5;", &CompileConfig::default(), &context);

    assert!(compilation.diagnostics.is_empty());
    assert_eq!(
        compilation.type_checker.environment.lookup("x"),
        Some(&Type::Numeric(NumericType::I32))
    );
    assert_eq!(global_constant(&compilation, "x"), Some(5));
}

#[test]
fn test_compile_function_returning_literal() {
    let context = Context::create();
    let compilation = compile_source("fn f -> i64 { 10 }", &CompileConfig::default(), &context);

    assert!(compilation.diagnostics.is_empty());
    assert!(compilation.generator.module.get_function("f").is_some());
    assert!(compilation.generator.ir().contains("ret i64 10"));
}

#[test]
fn test_narrowing_global_is_rejected() {
    let context = Context::create();
    let compilation = compile_source("let y: i8 = 300;", &CompileConfig::default(), &context);

    assert_eq!(error_names(&compilation), vec!["TypeMismatch"]);
    assert!(compilation.generator.module.get_global("y").is_none());
    assert!(compilation.type_checker.environment.lookup("y").is_none());
}

#[test]
fn test_unbound_name_skips_item() {
    let context = Context::create();
    let compilation = compile_source("fn f -> i32 { z }", &CompileConfig::default(), &context);

    assert_eq!(error_names(&compilation), vec!["UnboundName"]);
    assert!(compilation.generator.module.get_function("f").is_none());
}

#[test]
fn test_error_policy() {
    let source = indoc! {"
        let y: i8 = 300;
        let x: i32 = 1;
    "};

    let context = Context::create();
    let stopped = compile_source(source, &CompileConfig::default(), &context);
    assert_eq!(error_names(&stopped), vec!["TypeMismatch"]);
    assert!(stopped.generator.module.get_global("x").is_none());

    let mut config = CompileConfig::default();
    config.error_policy = ErrorPolicy::Continue;
    let continued = compile_source(source, &config, &context);
    assert_eq!(error_names(&continued), vec!["TypeMismatch"]);
    assert_eq!(global_constant(&continued, "x"), Some(1));
}

#[test]
fn test_function_with_local() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            fn f -> i64 {
                let a: i32 = 7;
                a
            }
        "},
        &CompileConfig::default(),
        &context,
    );

    assert!(compilation.diagnostics.is_empty());
    let ir = compilation.generator.ir();
    assert!(ir.contains("alloca i32"), "{}", ir);
    assert!(ir.contains("store i32 7"), "{}", ir);
    assert!(ir.contains("sext i32"), "{}", ir);
    assert!(ir.contains("ret i64"), "{}", ir);
}

#[test]
fn test_uninitialised_local_is_zero() {
    let context = Context::create();
    let compilation = compile_source(
        "fn f -> u8 { let a: u8; a }",
        &CompileConfig::default(),
        &context,
    );

    assert!(compilation.diagnostics.is_empty());
    assert!(compilation.generator.ir().contains("store i8 0"));
}

#[test]
fn test_function_reads_global() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            let g: i32 = 5;
            fn f -> i64 { g }
        "},
        &CompileConfig::default(),
        &context,
    );

    assert!(compilation.diagnostics.is_empty());
    let ir = compilation.generator.ir();
    assert!(ir.contains("load i32, i32* @g"), "{}", ir);
    assert!(ir.contains("sext i32"), "{}", ir);
}

#[test]
fn test_global_initialised_from_constant_global() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            let a: i32 = 5;
            let b: i64 = a;
            let c: i64 = -9;
        "},
        &CompileConfig::default(),
        &context,
    );

    assert!(compilation.diagnostics.is_empty());
    assert_eq!(global_constant(&compilation, "b"), Some(5));
    assert_eq!(global_constant(&compilation, "c"), Some(-9));

    let b = compilation.generator.module.get_global("b").unwrap();
    assert_eq!(
        b.get_initializer().unwrap().into_int_value().get_type(),
        context.i64_type()
    );
}

#[test]
fn test_non_constant_global_initializer() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            let a: i32;
            let b: i32 = a;
            let c: i32 = 3;
        "},
        &CompileConfig::default(),
        &context,
    );

    assert_eq!(error_names(&compilation), vec!["NonConstantGlobalInitializer"]);

    let a = compilation.generator.module.get_global("a").unwrap();
    assert!(!a.is_constant());
    assert!(compilation.generator.module.get_global("b").is_none());
    assert_eq!(global_constant(&compilation, "c"), Some(3));
}

#[test]
fn test_duplicate_global_keeps_first() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            let x: i32 = 1;
            let x: i64 = 2;
        "},
        &CompileConfig::default(),
        &context,
    );

    assert!(compilation.diagnostics.is_empty());
    assert_eq!(global_constant(&compilation, "x"), Some(1));
    assert_eq!(
        compilation.type_checker.environment.lookup("x"),
        Some(&Type::Numeric(NumericType::I32))
    );
}

#[test]
fn test_pointer_global() {
    let context = Context::create();
    let compilation = compile_source("let p: u8* = 0;", &CompileConfig::default(), &context);

    assert!(compilation.diagnostics.is_empty());
    let p = compilation.generator.module.get_global("p").unwrap();
    assert!(p.is_constant());
    assert!(p.get_initializer().unwrap().is_pointer_value());
}

#[test]
fn test_empty_function_body() {
    let context = Context::create();
    let compilation = compile_source("fn h -> i32 { }", &CompileConfig::default(), &context);

    assert_eq!(error_names(&compilation), vec!["TypeMismatch"]);
    assert!(compilation.generator.module.get_function("h").is_none());
}

#[test]
fn test_malformed_function_body_is_discarded() {
    let context = Context::create();
    let mut program = vec![
        Node::function("f", Type::Numeric(NumericType::I32), Node::integer(1)),
        Node::var("after", Type::Numeric(NumericType::I32), Some(Node::integer(2))),
    ];

    let compilation = compile(&mut program, &CompileConfig::default(), &context).unwrap();

    assert_eq!(error_names(&compilation), vec!["MalformedFunctionBody"]);
    assert!(compilation.generator.module.get_function("f").is_none());
    assert_eq!(global_constant(&compilation, "after"), Some(2));
}

#[test]
fn test_missing_lowering_is_fatal() {
    let context = Context::create();
    let mut generator = Generator::new(&context, &CompileConfig::default());
    generator.table.unregister(NodeKind::IntegerLiteral);

    let mut node = Node::var("x", Type::Numeric(NumericType::I32), Some(Node::integer(1)));
    let error = generator.generate(&mut node).unwrap_err();

    assert_eq!(error.get_error_name(), "InternalBindingFailure");
    assert!(error.is_fatal());
    assert!(generator.module.get_global("x").is_none());
}

#[test]
fn test_unresolved_symbol_is_fatal() {
    let context = Context::create();
    let mut generator = Generator::new(&context, &CompileConfig::default());

    let mut node = Node::function(
        "f",
        Type::Numeric(NumericType::I32),
        Node::block(vec![Node::identifier("ghost")]),
    );
    let error = generator.generate(&mut node).unwrap_err();

    assert_eq!(error.get_error_name(), "UnresolvedSymbolDuringLowering");
    assert!(error.is_fatal());
    assert!(generator.module.get_function("f").is_none());
}

#[test]
fn test_local_is_not_visible_to_later_items() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            fn f -> i32 { let a: i32 = 1; a }
            fn g -> i32 { a }
        "},
        &CompileConfig::default(),
        &context,
    );

    assert_eq!(error_names(&compilation), vec!["UnboundName"]);
    assert!(compilation.generator.module.get_function("f").is_some());
    assert!(compilation.generator.module.get_function("g").is_none());
}

#[test]
fn test_local_leak_does_not_abort_later_globals() {
    let mut config = CompileConfig::default();
    config.error_policy = ErrorPolicy::Continue;

    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            fn f -> i32 { let a: i32 = 1; a }
            let b: i32 = a;
            let c: i32 = 7;
        "},
        &config,
        &context,
    );

    assert_eq!(error_names(&compilation), vec!["UnboundName"]);
    assert!(compilation.generator.module.get_global("b").is_none());
    assert_eq!(global_constant(&compilation, "c"), Some(7));
}

#[test]
fn test_local_redeclaring_global_reads_global() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            let x: i32 = 1;
            fn f -> i32 { let x: i64 = 5000000000; x }
        "},
        &CompileConfig::default(),
        &context,
    );

    assert!(compilation.diagnostics.is_empty());
    let ir = compilation.generator.ir();
    assert!(!ir.contains("trunc"), "{}", ir);
    assert!(!ir.contains("alloca"), "{}", ir);
    assert!(ir.contains("load i32, i32* @x"), "{}", ir);
    assert!(ir.contains("ret i32"), "{}", ir);
}

#[test]
fn test_same_local_name_in_two_functions() {
    let context = Context::create();
    let compilation = compile_source(
        indoc! {"
            fn f -> i64 { let a: i32 = 1; a }
            fn g -> i64 { let a: i64 = 2; a }
        "},
        &CompileConfig::default(),
        &context,
    );

    assert!(compilation.diagnostics.is_empty());
    let ir = compilation.generator.ir();
    assert!(ir.contains("alloca i32"), "{}", ir);
    assert!(ir.contains("alloca i64"), "{}", ir);
}

#[test]
fn test_emit_ir_file() {
    let dir = tempfile::tempdir().unwrap();
    let ir_path = dir.path().join("out.ll");

    let mut config = CompileConfig::new("emitted");
    config.outputs = OutputOptions::default().with_ir(&ir_path);

    let context = Context::create();
    let compilation = compile_source("fn f -> i64 { 10 }", &config, &context);

    assert!(compilation.generator.output().is_empty());

    let written = fs::read_to_string(&ir_path).unwrap();
    assert!(written.contains("define i64 @f()"), "{}", written);
}

#[test]
fn test_failed_artifact_does_not_stop_others() {
    let dir = tempfile::tempdir().unwrap();
    let ir_path = dir.path().join("out.ll");

    let mut config = CompileConfig::new("emitted");
    config.outputs = OutputOptions::default()
        .with_object(dir.path().join("missing").join("out.o"))
        .with_ir(&ir_path);

    let context = Context::create();
    let compilation = compile_source("let x: i32 = 5;", &config, &context);

    let errors = compilation.generator.output();

    assert_eq!(errors.len(), 1);
    assert!(
        ["OutputDestinationError", "TargetUnavailable"].contains(&errors[0].get_error_name()),
        "{}",
        errors[0]
    );
    assert!(ir_path.exists());
}

#[test]
fn test_no_artifacts_requested() {
    let dir = tempfile::tempdir().unwrap();

    let context = Context::create();
    let compilation = compile_source("let x: i32 = 5;", &CompileConfig::default(), &context);

    assert!(compilation.generator.output().is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
