//! Companion CLI: reads a `.glade` document (from a file or stdin) and
//! either re-emits its canonical form or prints the resolved value tree
//! for debugging.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

/// Parse and re-serialize a glade configuration document.
#[derive(Parser, Debug)]
#[command(name = "glade", about = "Parse and render glade configuration documents")]
struct Args {
    /// Document to read; omit to read from stdin.
    path: Option<PathBuf>,

    /// Print the resolved value tree instead of canonical text.
    #[arg(long)]
    debug: bool,
}

fn read_input(args: &Args) -> anyhow::Result<String> {
    match &args.path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let value = match &args.path {
        Some(path) => {
            log::info!("loading '{}'", path.display());
            glade::loads_file(path).with_context(|| format!("parsing '{}'", path.display()))?
        }
        None => {
            let text = read_input(&args)?;
            glade::loads(&text).context("parsing stdin")?
        }
    };

    if args.debug {
        println!("{value:#?}");
    } else {
        print!("{}", glade::dumps(&value));
    }

    Ok(())
}
