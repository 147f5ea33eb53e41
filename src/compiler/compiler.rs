//! Main compiler module.
//!
//! This module contains the [`Generator`], which owns the LLVM module for a
//! compilation unit, and the [`compile`] driver that takes each top-level
//! item through type checking, binding and lowering.

use std::{fmt::Display, rc::Rc};

use inkwell::{
    builder::{Builder, BuilderError},
    context::Context,
    module::Module,
    types::{BasicType, BasicTypeEnum},
    values::BasicValueEnum,
    AddressSpace,
};

use crate::{
    ast::{
        ast::Node,
        types::{LiteralStrategy, NumericType, TargetInfo, Type},
    },
    config::{CompileConfig, ErrorPolicy},
    errors::errors::{Error, ErrorImpl},
    type_checker::type_checker::TypeChecker,
    Position,
};

use super::{
    lowering::{Lower, LowerResult, Lowered, LoweringTable},
    output::{emit, OutputOptions},
    scope::Scopes,
};

pub(crate) fn backend_error(error: impl Display, position: &Position) -> Error {
    Error::new(
        ErrorImpl::Backend {
            message: error.to_string(),
        },
        position.clone(),
    )
}

/// Whether `value` is a compile-time constant.
pub fn is_constant(value: BasicValueEnum) -> bool {
    match value {
        BasicValueEnum::IntValue(value) => value.is_const(),
        BasicValueEnum::FloatValue(value) => value.is_const(),
        BasicValueEnum::PointerValue(value) => value.is_const(),
        _ => false,
    }
}

/// The code generator for one compilation unit.
///
/// This structure manages:
/// - The LLVM context, module, and builder
/// - The scope stack of globals and locals
/// - The table choosing a lowering strategy per node kind
///
/// # Type Parameters
///
/// * `'ctx` - Lifetime of the LLVM context
pub struct Generator<'ctx> {
    /// Reference to the LLVM context
    pub context: &'ctx Context,
    /// The LLVM module being built
    pub module: Module<'ctx>,
    /// The LLVM IR builder
    pub builder: Builder<'ctx>,
    pub scopes: Scopes<'ctx>,
    pub table: LoweringTable,
    pub target: TargetInfo,
    pub literal_strategy: LiteralStrategy,
    pub outputs: OutputOptions,
}

impl<'ctx> Generator<'ctx> {
    pub fn new(context: &'ctx Context, config: &CompileConfig) -> Self {
        Generator {
            context,
            module: context.create_module(&config.module_name),
            builder: context.create_builder(),
            scopes: Scopes::new(),
            table: LoweringTable::standard(),
            target: config.target,
            literal_strategy: config.literal_strategy,
            outputs: config.outputs.clone(),
        }
    }

    /// Attaches lowering strategies to `node` and all of its descendants.
    pub fn bind(&self, node: &mut Node) -> Result<(), Error> {
        self.table.bind(node)?;
        self.table.propagate(node)
    }

    /// Lowers a bound node with its attached strategy.
    pub fn lower(&mut self, node: &Node) -> LowerResult<'ctx> {
        let Some(strategy) = node.binding().get::<Rc<dyn Lower>>().cloned() else {
            return Err(Error::new(
                ErrorImpl::InternalBindingFailure {
                    detail: format!("{} node was lowered before being bound", node.kind()),
                },
                node.span().start.clone(),
            ));
        };

        strategy.lower(node, self)
    }

    /// Binds and lowers one top-level item.
    #[tracing::instrument(skip_all, fields(kind = %node.kind()))]
    pub fn generate(&mut self, node: &mut Node) -> Result<(), Error> {
        self.bind(node)?;
        self.lower(node)?;

        Ok(())
    }

    /// Whether a function or global already uses `name`.
    pub fn symbol_taken(&self, name: &str) -> bool {
        self.module.get_function(name).is_some() || self.module.get_global(name).is_some()
    }

    /// Converts a type to its LLVM representation.
    ///
    /// Integers map by width alone; signedness lives in the instructions.
    pub fn convert_type(&self, ty: &Type, position: &Position) -> Result<BasicTypeEnum<'ctx>, Error> {
        let converted = match ty {
            Type::Numeric(numeric) => match numeric {
                NumericType::U8 | NumericType::I8 => self.context.i8_type().into(),
                NumericType::U16 | NumericType::I16 => self.context.i16_type().into(),
                NumericType::U32 | NumericType::I32 => self.context.i32_type().into(),
                NumericType::U64 | NumericType::I64 => self.context.i64_type().into(),
                NumericType::F32 => self.context.f32_type().into(),
                NumericType::F64 => self.context.f64_type().into(),
                NumericType::Unknown => {
                    return Err(backend_error(
                        "type `unknown` has no machine representation",
                        position,
                    ))
                }
            },
            Type::Pointer(base) => self
                .convert_type(base, position)?
                .ptr_type(AddressSpace::default())
                .into(),
        };

        Ok(converted)
    }

    /// Converts a lowered value to the representation of type `to`.
    ///
    /// Constants are folded; anything else gets a cast instruction. Integer
    /// conversions extend by the signedness of the source type.
    pub fn coerce(
        &self,
        lowered: Lowered<'ctx>,
        to: &Type,
        position: &Position,
    ) -> Result<BasicValueEnum<'ctx>, Error> {
        let target = self.convert_type(to, position)?;
        let value = lowered.value;

        if value.get_type() == target {
            return Ok(value);
        }

        let signed = lowered.ty.is_signed();
        let failed = |error: BuilderError| backend_error(error, position);

        let converted: BasicValueEnum<'ctx> = match (value, target) {
            (BasicValueEnum::IntValue(int), BasicTypeEnum::IntType(int_type)) => {
                if int.is_const() {
                    int.const_cast(int_type, signed).into()
                } else {
                    self.builder
                        .build_int_cast_sign_flag(int, int_type, signed, "coerce")
                        .map_err(failed)?
                        .into()
                }
            }
            (BasicValueEnum::IntValue(int), BasicTypeEnum::FloatType(float_type)) => {
                match (int.is_const(), signed) {
                    (true, true) => int.const_signed_to_float(float_type).into(),
                    (true, false) => int.const_unsigned_to_float(float_type).into(),
                    (false, true) => self
                        .builder
                        .build_signed_int_to_float(int, float_type, "coerce")
                        .map_err(failed)?
                        .into(),
                    (false, false) => self
                        .builder
                        .build_unsigned_int_to_float(int, float_type, "coerce")
                        .map_err(failed)?
                        .into(),
                }
            }
            (BasicValueEnum::FloatValue(float), BasicTypeEnum::FloatType(float_type)) => {
                if float.is_const() {
                    float.const_cast(float_type).into()
                } else {
                    self.builder
                        .build_float_cast(float, float_type, "coerce")
                        .map_err(failed)?
                        .into()
                }
            }
            (BasicValueEnum::FloatValue(float), BasicTypeEnum::IntType(int_type)) => {
                match (float.is_const(), to.is_signed()) {
                    (true, true) => float.const_to_signed_int(int_type).into(),
                    (true, false) => float.const_to_unsigned_int(int_type).into(),
                    (false, true) => self
                        .builder
                        .build_float_to_signed_int(float, int_type, "coerce")
                        .map_err(failed)?
                        .into(),
                    (false, false) => self
                        .builder
                        .build_float_to_unsigned_int(float, int_type, "coerce")
                        .map_err(failed)?
                        .into(),
                }
            }
            (BasicValueEnum::IntValue(int), BasicTypeEnum::PointerType(pointer_type)) => {
                // Addresses are first brought to the target's pointer width.
                let address_type = self
                    .convert_type(&Type::Numeric(self.target.pointer_type), position)?
                    .into_int_type();

                if int.is_const() {
                    int.const_cast(address_type, signed)
                        .const_to_pointer(pointer_type)
                        .into()
                } else {
                    let address = self
                        .builder
                        .build_int_cast_sign_flag(int, address_type, signed, "address")
                        .map_err(failed)?;
                    self.builder
                        .build_int_to_ptr(address, pointer_type, "coerce")
                        .map_err(failed)?
                        .into()
                }
            }
            (BasicValueEnum::PointerValue(pointer), BasicTypeEnum::PointerType(pointer_type)) => {
                if pointer.is_const() {
                    pointer.const_cast(pointer_type).into()
                } else {
                    self.builder
                        .build_pointer_cast(pointer, pointer_type, "coerce")
                        .map_err(failed)?
                        .into()
                }
            }
            (BasicValueEnum::PointerValue(pointer), BasicTypeEnum::IntType(int_type)) => {
                if pointer.is_const() {
                    pointer.const_to_int(int_type).into()
                } else {
                    self.builder
                        .build_ptr_to_int(pointer, int_type, "coerce")
                        .map_err(failed)?
                        .into()
                }
            }
            _ => {
                return Err(backend_error(
                    format!("cannot convert a value of type {} to {}", lowered.ty, to),
                    position,
                ))
            }
        };

        Ok(converted)
    }

    /// Textual IR of the module built so far.
    pub fn ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Writes the artifacts requested in the compile configuration.
    ///
    /// Returns one error per artifact that could not be written.
    pub fn output(&self) -> Vec<Error> {
        emit(&self.module, &self.outputs)
    }
}

/// Result of compiling a program.
pub struct Compilation<'ctx> {
    pub generator: Generator<'ctx>,
    pub type_checker: TypeChecker,
    /// Every recoverable error, in the order found.
    pub diagnostics: Vec<Error>,
}

/// The main compile function, taking every top-level item of `program`
/// through type checking and code generation.
///
/// Items are handled in order. A type error is collected, and depending on
/// the configured [`ErrorPolicy`] either stops the traversal or skips that
/// item. Recoverable generation errors skip only the failing item. Fatal
/// errors abort the compilation unit and are returned as `Err`.
#[tracing::instrument(skip_all, fields(module = %config.module_name, items = program.len()))]
pub fn compile<'ctx>(
    program: &mut [Node],
    config: &CompileConfig,
    context: &'ctx Context,
) -> Result<Compilation<'ctx>, Error> {
    let mut type_checker = TypeChecker::new(config.target, config.literal_strategy);
    let mut generator = Generator::new(context, config);
    let mut diagnostics = vec![];

    for item in program.iter_mut() {
        if let Err(error) = type_checker.type_of(item) {
            tracing::debug!(%error, "item failed to type check");
            diagnostics.push(error);

            if config.error_policy == ErrorPolicy::StopAtFirstError {
                break;
            }
            continue;
        }

        match generator.generate(item) {
            Ok(()) => {}
            Err(error) if error.is_fatal() => {
                tracing::error!(%error, "aborting compilation unit");
                return Err(error);
            }
            Err(error) => {
                tracing::warn!(%error, "skipping item");
                diagnostics.push(error);
            }
        }
    }

    Ok(Compilation {
        generator,
        type_checker,
        diagnostics,
    })
}
