//! Tensor IR Driver
//!
//! Builds the sample matmul modules and round-trips IR text files through
//! the parser and printer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use tir_common::IrError;
use tir_ir::samples::{matmul_buffer_module, matmul_tensor_module};
use tir_ir::{parse_module, print_module, Module, Visibility};

#[derive(Parser)]
#[command(name = "tir")]
#[command(about = "Typed tensor IR builder, printer and parser")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable logging (filtered by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sample matmul module and print it
    Demo {
        /// Rows of A and C
        #[arg(long, default_value_t = 128, allow_negative_numbers = true)]
        m: i64,

        /// Columns of A, rows of B
        #[arg(long, default_value_t = 64, allow_negative_numbers = true)]
        k: i64,

        /// Columns of B and C
        #[arg(long, default_value_t = 256, allow_negative_numbers = true)]
        n: i64,

        /// Use memref buffers written in place instead of tensors
        #[arg(long)]
        buffers: bool,

        /// Give the tensor function private visibility
        #[arg(long)]
        private: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Emit::Text)]
        emit: Emit,
    },

    /// Parse, verify and re-print an IR file
    Parse {
        /// Input IR file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Emit::Text)]
        emit: Emit,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Textual IR
    Text,
    /// serde_json dump of the module arenas
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::init();
    }

    match cli.command {
        Commands::Demo { m, k, n, buffers, private, output, emit } => {
            let module = build_demo(m, k, n, buffers, private)?;
            write_output(&render(&module, emit)?, output.as_deref())
        }
        Commands::Parse { input, output, emit } => {
            let module = load_module(&input)?;
            write_output(&render(&module, emit)?, output.as_deref())
        }
    }
}

fn build_demo(m: i64, k: i64, n: i64, buffers: bool, private: bool) -> Result<Module> {
    let module = if buffers {
        matmul_buffer_module("matmul", m, k, n)
    } else {
        let visibility = if private { Visibility::Private } else { Visibility::Public };
        matmul_tensor_module(m, k, n, visibility)
    };
    module.with_context(|| format!("building {m}x{k} * {k}x{n} matmul"))
}

fn load_module(path: &Path) -> Result<Module> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_module(&text).map_err(|err| match &err {
        IrError::Syntax { location, message } => {
            anyhow::anyhow!("{}:{}: {}", path.display(), location, message)
        }
        _ => anyhow::Error::new(err).context(format!("invalid IR in {}", path.display())),
    })
}

fn render(module: &Module, emit: Emit) -> Result<String> {
    match emit {
        Emit::Text => Ok(print_module(module)?),
        Emit::Json => {
            module.verify()?;
            let mut json = serde_json::to_string_pretty(module)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {} bytes to {}", text.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
