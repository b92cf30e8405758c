//! MiniBasic Compiler
//!
//! Translates MiniBasic source into Go source in a single pass.

mod backend;
mod feedback;
mod frontend;
mod utils;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::debug;

use backend::GoEmitter;
use feedback::Diagnostic;
use frontend::parser::Parser as BasicParser;
use frontend::scanner::Scanner;
use utils::Result;

/// MiniBasic Compiler
#[derive(Parser, Debug)]
#[command(name = "mbc")]
#[command(version = "0.1.0")]
#[command(about = "MiniBasic compiler - translates MiniBasic to Go source")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output Go file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a source file to Go
    Build {
        /// Input source file
        input: PathBuf,

        /// Output Go file
        output: PathBuf,
    },
    /// Validate a source file without writing output
    Check {
        /// Input source file
        input: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Build { input, output }) => {
            translate_file(input, output);
        }
        Some(Commands::Check { input, json }) => {
            check_file(input, *json);
        }
        Some(Commands::Version) => {
            println!("mbc 0.1.0");
        }
        None => match (&cli.input, &cli.output) {
            (Some(input), Some(output)) => translate_file(input, output),
            _ => {
                eprintln!("Error: input and output files must both be specified");
                eprintln!("Usage: mbc <INPUT> <OUTPUT>");
                process::exit(1);
            }
        },
    }
}

/// Run the core pipeline over in-memory source
fn translate(source: &str) -> Result<String> {
    let scanner = Scanner::new(source);
    let parser = BasicParser::new(scanner, GoEmitter::new());
    let emitter = parser.parse()?;
    Ok(emitter.finalize())
}

fn translate_file(input: &Path, output: &Path) {
    let source = match read_source(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };
    debug!(
        "read {} characters from {}",
        source.chars().count(),
        input.display()
    );

    let translated = match translate(&source) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{} error: {}", e.stage(), e);
            process::exit(1);
        }
    };
    debug!("translated into {} bytes of Go", translated.len());

    if let Err(e) = write_output(output, &translated) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
    println!("Wrote {}", output.display());
}

/// Parse and validate without writing output
fn check_file(input: &Path, json: bool) {
    let source = match read_source(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    match translate(&source) {
        Ok(_) => {
            if json {
                println!("[]");
            } else {
                println!("{}: no errors found", input.display());
            }
        }
        Err(e) => {
            if json {
                println!("[{}]", Diagnostic::from_error(&e).to_json());
            } else {
                eprintln!("{} error: {}", e.stage(), e);
            }
            process::exit(1);
        }
    }
}

fn read_source(input: &Path) -> anyhow::Result<String> {
    fs::read_to_string(input).with_context(|| format!("could not read {}", input.display()))
}

/// Write the final program, creating missing parent directories first
fn write_output(output: &Path, translated: &str) -> anyhow::Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("could not create {}", parent.display()))?;
        }
    }
    fs::write(output, translated).with_context(|| format!("could not write {}", output.display()))
}
