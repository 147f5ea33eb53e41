//! Type model for the language.
//!
//! This module defines the static types a declaration or expression can
//! carry:
//!
//! - Numeric types with a fixed width and signedness
//! - Pointer types wrapping another type
//! - Literal inference strategies choosing a type for an integer literal
//! - Target information that fixes the size of a pointer
//!
//! Types are plain values. Two types describing the same declaration are
//! compared through [`Type::assignable_from`], never by identity.

use std::fmt::Display;

/// Represents the numeric types of the language.
///
/// `Unknown` is only produced by literal inference when no integer type
/// can hold a literal. It is never a valid declared or inferred type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Unknown,
}

impl NumericType {
    /// Width in bytes, `0` for `Unknown`.
    pub fn width(self) -> usize {
        match self {
            NumericType::U8 | NumericType::I8 => 1,
            NumericType::U16 | NumericType::I16 => 2,
            NumericType::U32 | NumericType::I32 | NumericType::F32 => 4,
            NumericType::U64 | NumericType::I64 | NumericType::F64 => 8,
            NumericType::Unknown => 0,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            NumericType::I8
                | NumericType::I16
                | NumericType::I32
                | NumericType::I64
                | NumericType::F32
                | NumericType::F64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, NumericType::F32 | NumericType::F64)
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericType::U8 => "u8",
            NumericType::U16 => "u16",
            NumericType::U32 => "u32",
            NumericType::U64 => "u64",
            NumericType::I8 => "i8",
            NumericType::I16 => "i16",
            NumericType::I32 => "i32",
            NumericType::I64 => "i64",
            NumericType::F32 => "f32",
            NumericType::F64 => "f64",
            NumericType::Unknown => "<numeric unknown>",
        }
    }

    /// Looks up a numeric type by its source name.
    pub fn from_name(name: &str) -> Option<NumericType> {
        match name {
            "u8" => Some(NumericType::U8),
            "u16" => Some(NumericType::U16),
            "u32" => Some(NumericType::U32),
            "u64" => Some(NumericType::U64),
            "i8" => Some(NumericType::I8),
            "i16" => Some(NumericType::I16),
            "i32" => Some(NumericType::I32),
            "i64" => Some(NumericType::I64),
            "f32" => Some(NumericType::F32),
            "f64" => Some(NumericType::F64),
            _ => None,
        }
    }

    /// Inclusive value range of an integer type, `None` for floats and `Unknown`.
    fn range(self) -> Option<(i128, i128)> {
        match self {
            NumericType::U8 => Some((0, u8::MAX as i128)),
            NumericType::U16 => Some((0, u16::MAX as i128)),
            NumericType::U32 => Some((0, u32::MAX as i128)),
            NumericType::U64 => Some((0, u64::MAX as i128)),
            NumericType::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            NumericType::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            NumericType::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            NumericType::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            _ => None,
        }
    }

    fn contains(self, value: i128) -> bool {
        self.range()
            .is_some_and(|(min, max)| (min..=max).contains(&value))
    }
}

impl Display for NumericType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

const SMALLEST_CANDIDATES: [NumericType; 8] = [
    NumericType::I8,
    NumericType::U8,
    NumericType::I16,
    NumericType::U16,
    NumericType::I32,
    NumericType::U32,
    NumericType::I64,
    NumericType::U64,
];

const SUITABLE_CANDIDATES: [NumericType; 4] = [
    NumericType::I32,
    NumericType::U32,
    NumericType::I64,
    NumericType::U64,
];

/// Picks the narrowest integer type of any width that holds `value`.
pub fn smallest_integer_type_for(value: i128) -> NumericType {
    first_containing(&SMALLEST_CANDIDATES, value)
}

/// Picks the narrowest integer type of at least 32 bits that holds `value`.
pub fn suitable_integer_type_for(value: i128) -> NumericType {
    first_containing(&SUITABLE_CANDIDATES, value)
}

fn first_containing(candidates: &[NumericType], value: i128) -> NumericType {
    candidates
        .iter()
        .copied()
        .find(|candidate| candidate.contains(value))
        .unwrap_or(NumericType::Unknown)
}

/// Strategy used to infer the type of an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralStrategy {
    /// Smallest of `i32`, `u32`, `i64`, `u64`. Literals are never narrower than 32 bits.
    #[default]
    Suitable,
    /// Smallest of every integer width, including 8 and 16 bits.
    Smallest,
}

impl LiteralStrategy {
    pub fn infer(self, value: i128) -> NumericType {
        match self {
            LiteralStrategy::Suitable => suitable_integer_type_for(value),
            LiteralStrategy::Smallest => smallest_integer_type_for(value),
        }
    }
}

/// Properties of the compilation target the type model depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    /// Integer type with the width of a pointer.
    pub pointer_type: NumericType,
}

impl TargetInfo {
    pub fn new(pointer_type: NumericType) -> Self {
        TargetInfo { pointer_type }
    }

    pub fn pointer_size(&self) -> usize {
        self.pointer_type.width()
    }
}

impl Default for TargetInfo {
    fn default() -> Self {
        TargetInfo::new(NumericType::U64)
    }
}

/// A static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Numeric(NumericType),
    Pointer(Box<Type>),
}

impl Type {
    pub fn pointer_to(base: Type) -> Type {
        Type::Pointer(Box::new(base))
    }

    /// Size in bytes.
    pub fn size(&self, target: &TargetInfo) -> usize {
        match self {
            Type::Numeric(numeric) => numeric.width(),
            Type::Pointer(_) => target.pointer_size(),
        }
    }

    /// Whether a value of type `source` can be stored into this type
    /// without an explicit conversion.
    ///
    /// Only width is compared. Signedness is not checked, and a pointer
    /// source is never accepted.
    pub fn assignable_from(&self, source: &Type, target: &TargetInfo) -> bool {
        match source {
            Type::Numeric(_) => self.size(target) >= source.size(target),
            Type::Pointer(_) => false,
        }
    }

    pub fn is_signed(&self) -> bool {
        match self {
            Type::Numeric(numeric) => numeric.is_signed(),
            Type::Pointer(_) => false,
        }
    }

    pub fn as_numeric(&self) -> Option<NumericType> {
        match self {
            Type::Numeric(numeric) => Some(*numeric),
            Type::Pointer(_) => None,
        }
    }
}

impl From<NumericType> for Type {
    fn from(numeric: NumericType) -> Self {
        Type::Numeric(numeric)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Numeric(numeric) => write!(f, "{}", numeric),
            Type::Pointer(base) => write!(f, "{}*", base),
        }
    }
}

/// Signature of a declared function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub return_type: Type,
    /// Always empty until calls with arguments exist.
    pub arg_types: Vec<Type>,
}
