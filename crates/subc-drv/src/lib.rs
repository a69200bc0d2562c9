//! subc-drv — the CLI driver: argument parsing, the read/lex/parse/gen
//! pipeline per source file, tempfile lifecycle, and invoking the system
//! assembler/linker. Everything phase-specific lives in the other crates;
//! this one is pure orchestration.

pub mod cli;
pub mod dotprint;
pub mod error;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use cli::{CompileMode, Config, StopAfter};
pub use cli::Cli;
pub use error::DriverError;

fn tempfile_registry() -> &'static Mutex<Vec<PathBuf>> {
    static REGISTRY: OnceLock<Mutex<Vec<PathBuf>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

fn register_tempfile(path: PathBuf) {
    if let Ok(mut paths) = tempfile_registry().lock() {
        paths.push(path);
    }
}

fn unregister_tempfile(path: &Path) {
    if let Ok(mut paths) = tempfile_registry().lock() {
        paths.retain(|p| p != path);
    }
}

/// Install a handler that removes every still-registered intermediate
/// assembly file before the process dies to a signal, mirroring the
/// at-exit/at-signal tempfile cleanup the source implementation hooks
/// into `die`.
fn install_signal_cleanup() {
    let _ = ctrlc::set_handler(|| {
        if let Ok(paths) = tempfile_registry().lock() {
            for path in paths.iter() {
                let _ = std::fs::remove_file(path);
            }
        }
        std::process::exit(130);
    });
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    );
    let _ = builder.try_init();
}

pub fn run(cli: Cli) -> Result<(), DriverError> {
    init_logging(cli.verbose);
    let config = Config::from_cli(cli)?;
    install_signal_cleanup();

    match config.stop_after {
        StopAfter::Lex => return run_lex_only(&config),
        StopAfter::Tree => return run_tree_only(&config),
        StopAfter::None => {}
    }

    let mut assembled = Vec::with_capacity(config.inputs.len());
    for input in &config.inputs {
        log::debug!("compiling {}", input.display());
        let asm_path = compile_one(&config, input)?;
        assembled.push((input.clone(), asm_path));
    }

    match config.mode {
        CompileMode::AssembleOnly => Ok(()),
        CompileMode::ObjectOnly => {
            for (input, asm_path) in &assembled {
                assemble_to_object(&config, input, asm_path)?;
            }
            Ok(())
        }
        CompileMode::LinkExecutable => link_executable(&config, &assembled),
    }
}

fn read_source(path: &Path) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn output_path_for(config: &Config, input: &Path, extension: &str) -> PathBuf {
    if let Some(out) = &config.output {
        if config.inputs.len() == 1 {
            return out.clone();
        }
    }
    input.with_extension(extension)
}

/// Run the lex/parse/codegen pipeline for one source file, leaving the
/// resulting assembly either at its final `-S` destination or in a
/// registered tempfile awaiting assembly/linking.
fn compile_one(config: &Config, input: &Path) -> Result<PathBuf, DriverError> {
    let source = read_source(input)?;
    let tokens = subc_lex::Lexer::new(&source).tokenize()?;
    let program = subc_par::parse(&tokens)?;
    let asm = subc_gen::generate(&program)?;

    if config.mode == CompileMode::AssembleOnly {
        let path = output_path_for(config, input, "s");
        std::fs::write(&path, asm).map_err(|source| DriverError::Io {
            path: path.clone(),
            source,
        })?;
        return Ok(path);
    }

    let mut file = tempfile::Builder::new()
        .prefix("subc")
        .suffix(".s")
        .tempfile()
        .map_err(|source| DriverError::Io {
            path: input.to_path_buf(),
            source,
        })?;
    file.write_all(asm.as_bytes())
        .map_err(|source| DriverError::Io {
            path: input.to_path_buf(),
            source,
        })?;
    let (_, path) = file.keep().map_err(|persist_err| DriverError::Io {
        path: input.to_path_buf(),
        source: persist_err.error,
    })?;
    register_tempfile(path.clone());
    Ok(path)
}

fn run_lex_only(config: &Config) -> Result<(), DriverError> {
    let input = &config.inputs[0];
    let source = read_source(input)?;
    let tokens = subc_lex::Lexer::new(&source).tokenize()?;
    for tok in &tokens {
        println!("{} @ {}", tok.kind.describe(), tok.loc);
    }
    Ok(())
}

fn run_tree_only(config: &Config) -> Result<(), DriverError> {
    let input = &config.inputs[0];
    let source = read_source(input)?;
    let tokens = subc_lex::Lexer::new(&source).tokenize()?;
    let program = subc_par::parse(&tokens)?;
    print!("{}", dotprint::print_dot(&program));
    Ok(())
}

fn assemble_to_object(config: &Config, input: &Path, asm_path: &Path) -> Result<(), DriverError> {
    let obj_path = output_path_for(config, input, "o");
    let status = std::process::Command::new("gcc")
        .arg("-c")
        .arg(asm_path)
        .arg("-o")
        .arg(&obj_path)
        .status()
        .map_err(|source| DriverError::Io {
            path: asm_path.to_path_buf(),
            source,
        })?;
    if !status.success() {
        return Err(DriverError::ExternalTool {
            tool: "gcc".into(),
            path: input.to_path_buf(),
        });
    }
    unregister_tempfile(asm_path);
    let _ = std::fs::remove_file(asm_path);
    Ok(())
}

fn link_executable(config: &Config, assembled: &[(PathBuf, PathBuf)]) -> Result<(), DriverError> {
    let out = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("a.out"));
    let mut cmd = std::process::Command::new("gcc");
    for (_, asm_path) in assembled {
        cmd.arg(asm_path);
    }
    cmd.arg("-o").arg(&out);
    let status = cmd.status().map_err(|source| DriverError::Io {
        path: out.clone(),
        source,
    })?;
    if !status.success() {
        return Err(DriverError::ExternalTool {
            tool: "gcc".into(),
            path: out,
        });
    }
    for (_, asm_path) in assembled {
        unregister_tempfile(asm_path);
        let _ = std::fs::remove_file(asm_path);
    }
    Ok(())
}
