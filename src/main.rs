//! flowgrid CLI entry point.
//!
//! Exit codes: 0 on success, 1 on parse or I/O errors, 2 on usage errors
//! (clap's own convention).

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::Parser;

use flowgrid::syntax::types::Direction;
use flowgrid::{render_dsl, RenderConfig};

/// Mermaid flowchart to ASCII/Unicode text diagrams.
#[derive(Parser, Debug)]
#[command(
    name = "flowgrid",
    version = env!("FLOWGRID_VERSION"),
    about = "Mermaid flowchart to ASCII/Unicode text diagrams"
)]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<String>,

    /// Use plain ASCII instead of Unicode box-drawing characters
    #[arg(short = 'a', long = "ascii")]
    ascii: bool,

    /// Override direction (LR, RL, TD, BT)
    #[arg(short = 'd', long = "direction")]
    direction: Option<Direction>,

    /// Node padding (spaces inside the border)
    #[arg(short = 'p', long = "padding", default_value = "1")]
    padding: usize,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{path}': {e}");
                process::exit(1);
            }
        },
        None => {
            let mut buf = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buf) {
                eprintln!("error: cannot read stdin: {e}");
                process::exit(1);
            }
            buf
        }
    };

    let config = RenderConfig {
        ascii: cli.ascii,
        padding: cli.padding,
        direction: cli.direction,
    };
    let rendered = match render_dsl(&source, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered) {
                eprintln!("error: cannot write '{path}': {e}");
                process::exit(1);
            }
        }
        None => {
            // The canvas already ends in a newline; print it as-is.
            print!("{rendered}");
            if let Err(e) = io::stdout().flush() {
                eprintln!("error: cannot flush stdout: {e}");
                process::exit(1);
            }
        }
    }
}
