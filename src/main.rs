use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    process::ExitCode,
    rc::Rc,
    time::Instant,
};

use clap::{Parser, ValueEnum};
use inkwell::context::Context;
use noct::{
    ast::types::{LiteralStrategy, NumericType, TargetInfo},
    compiler::{compiler::compile, output::OutputOptions},
    config::{CompileConfig, ErrorPolicy},
    display_error,
    errors::errors::Error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LiteralInference {
    /// Narrowest type of at least 32 bits
    Suitable,
    /// Narrowest type of any width
    Smallest,
}

impl From<LiteralInference> for LiteralStrategy {
    fn from(inference: LiteralInference) -> Self {
        match inference {
            LiteralInference::Suitable => LiteralStrategy::Suitable,
            LiteralInference::Smallest => LiteralStrategy::Smallest,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PointerWidth {
    #[value(name = "32")]
    Bits32,
    #[value(name = "64")]
    Bits64,
}

/// Compiles a noct source file to native code or LLVM IR
#[derive(Parser, Debug)]
#[command(name = "noct")]
#[command(version)]
#[command(about = "The noct compiler", long_about = None)]
struct Cli {
    /// Source file to compile
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Writes an object file here and the IR next to it with a `.ll` suffix
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Object file destination
    #[arg(short = 'o', long = "object", value_name = "PATH")]
    object: Option<PathBuf>,

    /// Assembly file destination
    #[arg(short = 'S', long = "assembly", value_name = "PATH")]
    assembly: Option<PathBuf>,

    /// LLVM IR file destination
    #[arg(long = "ir", value_name = "PATH")]
    ir: Option<PathBuf>,

    /// How integer literals get their type
    #[arg(long, value_enum, default_value = "suitable")]
    literal_inference: LiteralInference,

    /// Pointer width of the target in bits
    #[arg(long, value_enum, default_value = "64")]
    pointer_width: PointerWidth,

    /// Keep going after an item fails to type check
    #[arg(long)]
    keep_going: bool,

    /// Print the parsed program before compiling
    #[arg(long)]
    print_ast: bool,

    /// Type check only, without generating code
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn config(&self, module_name: &str) -> CompileConfig {
        let mut outputs = OutputOptions::default();

        if let Some(output) = &self.output {
            let mut ir = output.clone().into_os_string();
            ir.push(".ll");
            outputs = outputs.with_object(output).with_ir(ir);
        }
        if let Some(object) = &self.object {
            outputs = outputs.with_object(object);
        }
        if let Some(assembly) = &self.assembly {
            outputs = outputs.with_assembly(assembly);
        }
        if let Some(ir) = &self.ir {
            outputs = outputs.with_ir(ir);
        }

        let pointer_type = match self.pointer_width {
            PointerWidth::Bits32 => NumericType::U32,
            PointerWidth::Bits64 => NumericType::U64,
        };

        CompileConfig {
            module_name: module_name.to_string(),
            outputs,
            literal_strategy: self.literal_inference.into(),
            target: TargetInfo::new(pointer_type),
            error_policy: if self.keep_going {
                ErrorPolicy::Continue
            } else {
                ErrorPolicy::StopAtFirstError
            },
        }
    }
}

fn report(errors: &[Error], source: &str, file: &Path) -> ExitCode {
    for error in errors {
        display_error(error, source, file);
    }

    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let source = match read_to_string(&cli.input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: could not read {}: {}", cli.input.display(), error);
            return ExitCode::FAILURE;
        }
    };

    let file_name = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("main"));
    let module_name = cli
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("main"));

    let start = Instant::now();

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => return report(&[error], &source, &cli.input),
    };
    tracing::info!(elapsed = ?start.elapsed(), "tokenized");

    let parse_start = Instant::now();
    let (_, parsed) = parse(tokens, Rc::new(file_name));
    let mut program = match parsed {
        Ok(program) => program,
        Err(error) => return report(&[error], &source, &cli.input),
    };
    tracing::info!(elapsed = ?parse_start.elapsed(), items = program.len(), "parsed");

    if cli.print_ast {
        for item in program.iter() {
            print!("{}", item);
        }
    }

    let config = cli.config(&module_name);

    if cli.check {
        let (_, errors) = type_check(&program, &config);
        return report(&errors, &source, &cli.input);
    }

    let context = Context::create();
    let compile_start = Instant::now();
    let compilation = match compile(&mut program, &config, &context) {
        Ok(compilation) => compilation,
        Err(error) => return report(&[error], &source, &cli.input),
    };
    tracing::info!(elapsed = ?compile_start.elapsed(), "generated module");

    let mut errors = compilation.diagnostics;
    errors.extend(compilation.generator.output());
    tracing::info!(elapsed = ?start.elapsed(), "total");

    report(&errors, &source, &cli.input)
}
