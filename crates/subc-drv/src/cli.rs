//! Command-line surface and the `Config` it's validated into.

use std::ffi::OsStr;
use std::path::PathBuf;

use clap::Parser;

use crate::error::DriverError;

impl Cli {
    /// Parse `argv`, routing clap's own parse failures through
    /// `DriverError::Usage` instead of letting `Cli::parse()` print and
    /// `process::exit(2)` directly — malformed invocations are a usage
    /// error (exit 129) here, not clap's default exit code. `--help` (and
    /// any other clap-handled display request) still prints and exits 0,
    /// since that's not a malformed invocation.
    pub fn parse_or_usage_error() -> Result<Self, DriverError> {
        match Self::try_parse() {
            Ok(cli) => Ok(cli),
            Err(err) if err.use_stderr() => Err(DriverError::Usage(err.to_string())),
            Err(err) => err.exit(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "subc",
    about = "A small compiler for a C-like imperative language subset",
    disable_version_flag = true
)]
pub struct Cli {
    /// One or more `.c` source files to compile.
    pub inputs: Vec<PathBuf>,

    /// Output path.
    #[arg(short = 'o')]
    pub output: Option<PathBuf>,

    /// Produce an object file, do not link.
    #[arg(short = 'c')]
    pub object_only: bool,

    /// Leave the intermediate assembly in place, do not assemble or link.
    #[arg(short = 'S')]
    pub assembly_only: bool,

    /// Print the token stream and stop.
    #[arg(short = 'l', long = "lex")]
    pub lex: bool,

    /// Print the AST in Graphviz dot format and stop.
    #[arg(short = 't', long = "tree")]
    pub tree: bool,

    /// Verbose logging (equivalent to `RUST_LOG=subc=debug`).
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    ObjectOnly,
    AssembleOnly,
    LinkExecutable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAfter {
    Lex,
    Tree,
    None,
}

#[derive(Debug)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub mode: CompileMode,
    pub stop_after: StopAfter,
    pub verbose: bool,
}

impl Config {
    /// Validate the raw CLI parse into a `Config`, enforcing the mutual
    /// exclusions the external interface specifies. Every rejection here
    /// is a usage error (exit 129), not a compilation error.
    pub fn from_cli(cli: Cli) -> Result<Self, DriverError> {
        if cli.inputs.is_empty() {
            return Err(DriverError::Usage(
                "no input files; pass one or more .c source paths".into(),
            ));
        }

        for input in &cli.inputs {
            if input.extension() != Some(OsStr::new("c")) {
                return Err(DriverError::Usage(format!(
                    "{}: source file names must end in .c",
                    input.display()
                )));
            }
        }

        let stop_after = match (cli.lex, cli.tree) {
            (true, true) => {
                return Err(DriverError::Usage(
                    "-l/--lex and -t/--tree are mutually exclusive".into(),
                ));
            }
            (true, false) => StopAfter::Lex,
            (false, true) => StopAfter::Tree,
            (false, false) => StopAfter::None,
        };

        if stop_after != StopAfter::None {
            if cli.inputs.len() != 1 {
                return Err(DriverError::Usage(
                    "-l/--lex and -t/--tree require exactly one source file".into(),
                ));
            }
            if cli.assembly_only || cli.object_only || cli.output.is_some() {
                return Err(DriverError::Usage(
                    "-l/--lex and -t/--tree are incompatible with -S, -c, and -o".into(),
                ));
            }
        }

        let mode = match (cli.object_only, cli.assembly_only) {
            (true, true) => {
                return Err(DriverError::Usage(
                    "-c and -S are mutually exclusive".into(),
                ));
            }
            (true, false) => CompileMode::ObjectOnly,
            (false, true) => CompileMode::AssembleOnly,
            (false, false) => CompileMode::LinkExecutable,
        };

        if mode != CompileMode::LinkExecutable && cli.inputs.len() > 1 && cli.output.is_some() {
            return Err(DriverError::Usage(
                "-o cannot be combined with -S or -c when compiling multiple sources".into(),
            ));
        }

        Ok(Config {
            inputs: cli.inputs,
            output: cli.output,
            mode,
            stop_after,
            verbose: cli.verbose,
        })
    }
}
