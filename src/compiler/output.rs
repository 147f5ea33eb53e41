//! Writing a finished module to disk.
//!
//! Three artifacts can be requested independently: a native object file,
//! native assembly and textual LLVM IR. They are written in that order,
//! and a failure on one artifact never stops the others.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use inkwell::{
    module::Module,
    targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine},
    OptimizationLevel,
};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Object,
    Assembly,
    Ir,
}

impl Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Artifact::Object => write!(f, "object file"),
            Artifact::Assembly => write!(f, "assembly file"),
            Artifact::Ir => write!(f, "IR file"),
        }
    }
}

/// Which artifacts to write, and where.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputOptions {
    pub emit_object: bool,
    pub object_file: Option<PathBuf>,
    pub emit_assembly: bool,
    pub assembly_file: Option<PathBuf>,
    pub emit_ir: bool,
    pub ir_file: Option<PathBuf>,
}

impl OutputOptions {
    pub fn with_object(mut self, path: impl Into<PathBuf>) -> Self {
        self.emit_object = true;
        self.object_file = Some(path.into());
        self
    }

    pub fn with_assembly(mut self, path: impl Into<PathBuf>) -> Self {
        self.emit_assembly = true;
        self.assembly_file = Some(path.into());
        self
    }

    pub fn with_ir(mut self, path: impl Into<PathBuf>) -> Self {
        self.emit_ir = true;
        self.ir_file = Some(path.into());
        self
    }

    /// Enabled artifacts in emission order.
    pub fn requested(&self) -> Vec<(Artifact, Option<&Path>)> {
        [
            (Artifact::Object, self.emit_object, &self.object_file),
            (Artifact::Assembly, self.emit_assembly, &self.assembly_file),
            (Artifact::Ir, self.emit_ir, &self.ir_file),
        ]
        .into_iter()
        .filter(|(_, enabled, _)| *enabled)
        .map(|(artifact, _, path)| (artifact, path.as_deref()))
        .collect()
    }
}

fn destination_error(path: &Path, message: impl Display) -> Error {
    Error::new(
        ErrorImpl::OutputDestinationError {
            path: path.display().to_string(),
            message: message.to_string(),
        },
        Position::null(),
    )
}

/// Target machine for the host, used for native artifacts.
pub fn host_machine() -> Result<TargetMachine, String> {
    Target::initialize_native(&InitializationConfig::default())?;

    let triple = TargetMachine::get_default_triple();
    let target = Target::from_triple(&triple).map_err(|error| error.to_string())?;

    target
        .create_target_machine(
            &triple,
            "generic",
            "",
            OptimizationLevel::Default,
            RelocMode::PIC,
            CodeModel::Default,
        )
        .ok_or_else(|| format!("no target machine for {}", triple.as_str().to_string_lossy()))
}

/// Writes every requested artifact of `module`.
///
/// Returns one error per artifact that could not be written.
#[tracing::instrument(skip_all, fields(module = %module.get_name().to_string_lossy()))]
pub fn emit(module: &Module, options: &OutputOptions) -> Vec<Error> {
    let requested = options.requested();
    let mut errors = vec![];

    if requested.is_empty() {
        return errors;
    }

    let machine = host_machine();
    match &machine {
        Ok(machine) => {
            module.set_triple(&machine.get_triple());
            module.set_data_layout(&machine.get_target_data().get_data_layout());
        }
        Err(message) => tracing::warn!(%message, "host target unavailable"),
    }

    for (artifact, path) in requested {
        let Some(path) = path else {
            errors.push(Error::new(
                ErrorImpl::OutputDestinationError {
                    path: String::from("<unset>"),
                    message: format!("no destination given for the {}", artifact),
                },
                Position::null(),
            ));
            continue;
        };

        let result = match (artifact, &machine) {
            (Artifact::Ir, _) => module
                .print_to_file(path)
                .map_err(|error| destination_error(path, error)),
            (_, Err(message)) => Err(Error::new(
                ErrorImpl::TargetUnavailable {
                    message: message.clone(),
                },
                Position::null(),
            )),
            (Artifact::Object, Ok(machine)) => machine
                .write_to_file(module, FileType::Object, path)
                .map_err(|error| destination_error(path, error)),
            (Artifact::Assembly, Ok(machine)) => machine
                .write_to_file(module, FileType::Assembly, path)
                .map_err(|error| destination_error(path, error)),
        };

        match result {
            Ok(()) => tracing::info!(%artifact, path = %path.display(), "wrote artifact"),
            Err(error) => {
                tracing::warn!(%artifact, %error, "failed to write artifact");
                errors.push(error);
            }
        }
    }

    errors
}
