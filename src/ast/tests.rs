//! Unit tests for the type model and the node tree.

use pretty_assertions::assert_eq;

use super::{
    ast::{Binding, Node, NodeKind},
    types::{
        smallest_integer_type_for, suitable_integer_type_for, LiteralStrategy, NumericType,
        TargetInfo, Type,
    },
};

const ALL_NUMERIC: [NumericType; 10] = [
    NumericType::U8,
    NumericType::U16,
    NumericType::U32,
    NumericType::U64,
    NumericType::I8,
    NumericType::I16,
    NumericType::I32,
    NumericType::I64,
    NumericType::F32,
    NumericType::F64,
];

#[test]
fn test_suitable_inference_boundaries() {
    let two: i128 = 2;

    assert_eq!(suitable_integer_type_for(0), NumericType::I32);
    assert_eq!(suitable_integer_type_for(two.pow(31) - 1), NumericType::I32);
    assert_eq!(suitable_integer_type_for(two.pow(31)), NumericType::U32);
    assert_eq!(suitable_integer_type_for(two.pow(32) - 1), NumericType::U32);
    assert_eq!(suitable_integer_type_for(two.pow(32)), NumericType::I64);
    assert_eq!(suitable_integer_type_for(two.pow(63) - 1), NumericType::I64);
    assert_eq!(suitable_integer_type_for(two.pow(63)), NumericType::U64);
    assert_eq!(suitable_integer_type_for(two.pow(64) - 1), NumericType::U64);
    assert_eq!(suitable_integer_type_for(two.pow(64)), NumericType::Unknown);
}

#[test]
fn test_suitable_inference_never_narrower_than_32_bits() {
    assert_eq!(suitable_integer_type_for(1), NumericType::I32);
    assert_eq!(suitable_integer_type_for(255), NumericType::I32);
    assert_eq!(suitable_integer_type_for(300), NumericType::I32);
}

#[test]
fn test_suitable_inference_negative_values() {
    let two: i128 = 2;

    assert_eq!(suitable_integer_type_for(-1), NumericType::I32);
    assert_eq!(suitable_integer_type_for(-two.pow(31)), NumericType::I32);
    assert_eq!(suitable_integer_type_for(-two.pow(31) - 1), NumericType::I64);
    assert_eq!(suitable_integer_type_for(-two.pow(63)), NumericType::I64);
    assert_eq!(suitable_integer_type_for(-two.pow(63) - 1), NumericType::Unknown);
}

#[test]
fn test_smallest_inference_includes_narrow_types() {
    assert_eq!(smallest_integer_type_for(5), NumericType::I8);
    assert_eq!(smallest_integer_type_for(200), NumericType::U8);
    assert_eq!(smallest_integer_type_for(300), NumericType::I16);
    assert_eq!(smallest_integer_type_for(40_000), NumericType::U16);
    assert_eq!(smallest_integer_type_for(70_000), NumericType::I32);
    assert_eq!(smallest_integer_type_for(-129), NumericType::I16);
}

#[test]
fn test_literal_strategy_defaults_to_suitable() {
    assert_eq!(LiteralStrategy::default(), LiteralStrategy::Suitable);
    assert_eq!(LiteralStrategy::default().infer(5), NumericType::I32);
    assert_eq!(LiteralStrategy::Smallest.infer(5), NumericType::I8);
}

#[test]
fn test_assignable_is_reflexive_for_numeric_types() {
    let target = TargetInfo::default();

    for numeric in ALL_NUMERIC {
        let ty = Type::Numeric(numeric);
        assert!(ty.assignable_from(&ty.clone(), &target), "{} from itself", ty);
    }
}

#[test]
fn test_assignable_is_monotonic_in_width() {
    let target = TargetInfo::default();

    for to in ALL_NUMERIC {
        for from in ALL_NUMERIC {
            let expected = to.width() >= from.width();
            assert_eq!(
                Type::Numeric(to).assignable_from(&Type::Numeric(from), &target),
                expected,
                "{} from {}",
                to,
                from
            );
        }
    }
}

#[test]
fn test_assignable_ignores_signedness() {
    let target = TargetInfo::default();

    assert!(Type::Numeric(NumericType::U32).assignable_from(&NumericType::I32.into(), &target));
    assert!(Type::Numeric(NumericType::I64).assignable_from(&NumericType::U64.into(), &target));
    assert!(!Type::Numeric(NumericType::I8).assignable_from(&NumericType::I32.into(), &target));
}

#[test]
fn test_pointer_size_follows_target() {
    let pointer = Type::pointer_to(NumericType::I8.into());

    assert_eq!(pointer.size(&TargetInfo::default()), 8);
    assert_eq!(pointer.size(&TargetInfo::new(NumericType::U32)), 4);
}

#[test]
fn test_pointer_assignability() {
    let wide = TargetInfo::default();
    let narrow = TargetInfo::new(NumericType::U32);
    let pointer = Type::pointer_to(NumericType::I32.into());

    assert!(pointer.assignable_from(&NumericType::I64.into(), &wide));
    assert!(!pointer.assignable_from(&NumericType::I64.into(), &narrow));
    assert!(pointer.assignable_from(&NumericType::I32.into(), &narrow));

    // Pointer sources are never accepted.
    assert!(!pointer.assignable_from(&pointer.clone(), &wide));
    assert!(!Type::Numeric(NumericType::U64).assignable_from(&pointer, &wide));
}

#[test]
fn test_type_display() {
    assert_eq!(Type::Numeric(NumericType::U16).to_string(), "u16");
    assert_eq!(
        Type::pointer_to(Type::pointer_to(NumericType::F64.into())).to_string(),
        "f64**"
    );
    assert_eq!(NumericType::Unknown.to_string(), "<numeric unknown>");
}

#[test]
fn test_numeric_from_name() {
    for numeric in ALL_NUMERIC {
        assert_eq!(NumericType::from_name(numeric.name()), Some(numeric));
    }
    assert_eq!(NumericType::from_name("usize"), None);
}

#[test]
fn test_print_function() {
    let function = Node::function(
        "f",
        NumericType::I64.into(),
        Node::block(vec![
            Node::var("a", NumericType::I32.into(), Some(Node::integer(-3))),
            Node::var("b", Type::pointer_to(NumericType::U8.into()), None),
            Node::identifier("a"),
        ]),
    );

    assert_eq!(
        function.to_string(),
        "fn f -> i64\n{\n    let a: i32 = -3;\n    let b: u8*;\n    a\n}\n"
    );
}

#[test]
fn test_print_top_level_var() {
    let var = Node::var("x", NumericType::I32.into(), Some(Node::integer(5)));

    assert_eq!(var.to_string(), "let x: i32 = 5;\n");
}

#[test]
fn test_children_follow_ownership() {
    let mut function = Node::function(
        "f",
        NumericType::I32.into(),
        Node::block(vec![Node::integer(1), Node::integer(2)]),
    );

    assert_eq!(function.kind(), NodeKind::Function);
    assert_eq!(function.children().len(), 1);
    assert_eq!(function.children()[0].children().len(), 2);
    assert_eq!(function.children_mut()[0].kind(), NodeKind::Block);
    assert!(Node::var("v", NumericType::I8.into(), None).children().is_empty());
}

#[test]
fn test_binding_replaces_previous_strategy() {
    let mut binding = Binding::default();
    assert!(!binding.is_bound());

    binding.attach(1_u32);
    binding.attach("second");

    assert!(binding.is_bound());
    assert_eq!(binding.get::<u32>(), None);
    assert_eq!(binding.get::<&str>(), Some(&"second"));

    binding.clear();
    assert!(!binding.is_bound());
}
