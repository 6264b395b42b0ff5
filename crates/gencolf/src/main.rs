// Файл: crates/gencolf/src/main.rs
use anyhow::{Result, anyhow};
use clap::Parser;
use colfold_table::generate::{self, GenerateOptions};
use colfold_table::{BuildOptions, RuleCatalog, Strength};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(version, about = "Generate collation folding tables from collation rules")]
struct Cli {
    /// Каталог с файлами правил (<locale>.txt)
    #[arg(short = 's', long = "sourcedir")]
    source_dir: PathBuf,
    /// Куда писать таблицы свёртки
    #[arg(short = 'd', long = "destdir")]
    dest_dir: Option<PathBuf>,
    /// JSON-отчёт по локалям
    #[arg(long)]
    report: Option<PathBuf>,
    /// Верхняя граница перебора кодовых точек (hex), по умолчанию 10FFFF
    #[arg(long, value_parser = parse_hex)]
    max_code_point: Option<u32>,
    /// Вместо генерации: вывести классы эквивалентности локали
    #[arg(long)]
    dump_keys: Option<String>,
    #[arg(long, default_value = "primary")]
    strength: Strength,
}

fn parse_hex(s: &str) -> Result<u32> {
    let s = s.trim_start_matches("0x").trim_start_matches("U+");
    let v = u32::from_str_radix(s, 16).map_err(|e| anyhow!("bad hex '{s}': {e}"))?;
    if v > 0x10FFFF {
        return Err(anyhow!("{v:X} is beyond U+10FFFF"));
    }
    Ok(v)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        // неразрешённые классы: таблицы записаны, но неполные
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "gencolf failed");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn run(cli: Cli) -> Result<bool> {
    let mut build = BuildOptions::default();
    if let Some(max) = cli.max_code_point {
        build.code_points = 0..=max;
    }

    if let Some(locale) = cli.dump_keys {
        let catalog = RuleCatalog::open(&cli.source_dir)?;
        let source = catalog.source(&locale)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        generate::dump_key_sequences(&source, cli.strength, &build, &mut out)?;
        out.flush()?;
        return Ok(true);
    }

    let dest_dir = cli
        .dest_dir
        .ok_or_else(|| anyhow!("--destdir is required unless --dump-keys is given"))?;
    let opts = GenerateOptions {
        source_dir: cli.source_dir,
        dest_dir,
        build,
    };
    let report = generate::run(&opts)?;

    if let Some(p) = cli.report {
        report.write_json(&p)?;
    }
    let generated = report.generated().count();
    tracing::info!(
        generated,
        skipped = report.locales.len() - generated,
        complete = report.is_complete(),
        "done"
    );
    Ok(report.is_complete())
}
