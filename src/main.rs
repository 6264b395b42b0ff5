use clap::{Parser, Subcommand};
use colfold::{CollationFolding, FoldConfig, Strength};
use colfold_table::encode_key;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Fold text to its collation-equivalent canonical form")]
struct Cli {
    /// Locale, e.g. de_DE or da-u-co-search
    #[arg(long, global = true, default_value = "root")]
    locale: String,
    #[arg(long, global = true, default_value = "primary")]
    strength: Strength,
    /// Overrides COLF_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fold arguments, or every line of --input
    Fold {
        text: Vec<String>,
        #[arg(long)]
        input: Option<String>,
        /// Also print hex code points
        #[arg(long)]
        hex: bool,
    },
    /// Interactive prompt
    Repl,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = FoldConfig::from_env();
    if let Some(d) = cli.data_dir {
        cfg.data_dir = d;
    }
    let engine = CollationFolding::open_with(&cfg, &cli.locale, cli.strength)?;

    match cli.cmd {
        Cmd::Fold { text, input, hex } => run_fold(&engine, text, input, hex)?,
        Cmd::Repl => run_repl(&engine)?,
    }
    colfold::close(engine);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}

fn run_fold(engine: &CollationFolding, mut text: Vec<String>, input: Option<String>, hex: bool) -> anyhow::Result<()> {
    if let Some(path) = input {
        let br = BufReader::new(File::open(&path)?);
        for line in br.lines() {
            text.push(line?);
        }
    }

    // fold is read-only on the engine, lines can go in parallel
    let folded: Vec<String> = text.par_iter().map(|t| engine.fold(t)).collect();
    for (src, out) in text.iter().zip(&folded) {
        if hex {
            println!("{}\t{}\t<{}>", src, out, encode_key(out));
        } else {
            println!("{out}");
        }
    }
    Ok(())
}

fn run_repl(engine: &CollationFolding) -> anyhow::Result<()> {
    use std::io::{Write, stdin, stdout};
    let mut input = String::new();
    loop {
        input.clear();
        print!("fold[{}/{}]> ", engine.locale(), engine.strength());
        stdout().flush().ok();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let s = input.trim_end_matches(['\r', '\n']);
        if s == ":q" || s == ":quit" {
            break;
        }
        let out = engine.fold(s);
        println!("{out}\t<{}>", encode_key(&out));
    }
    Ok(())
}
