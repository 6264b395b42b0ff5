// crates/colfold_table/src/generate.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::build::{BuildOptions, UnresolvedClass, build_folding_map, classes::collect_classes};
use crate::key::encode_key;
use crate::resbundle::{Section, consolidate, write_locale};
use crate::source::rules::ROOT_LOCALE;
use crate::source::{CollationElementSource, RuleCatalog};
use crate::strength::Strength;

/// Устаревшие варианты, которые не генерируются.
pub const LEGACY_VARIANTS: [&str; 2] = ["de__PHONEBOOK", "es__TRADITIONAL"];

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub build: BuildOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocaleReport {
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    /// Количество записей в файле по уровням (после консолидации с root).
    pub written: BTreeMap<Strength, usize>,
    pub unresolved: Vec<UnresolvedClass>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub locales: Vec<LocaleReport>,
}

impl GenerateReport {
    pub fn is_complete(&self) -> bool {
        self.locales.iter().all(|l| l.unresolved.is_empty())
    }

    pub fn generated(&self) -> impl Iterator<Item = &LocaleReport> {
        self.locales.iter().filter(|l| l.skipped.is_none())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)?;
        Ok(())
    }
}

fn skip_reason(catalog: &RuleCatalog, locale: &str) -> Option<&'static str> {
    if LEGACY_VARIANTS.contains(&locale) {
        return Some("legacy variant");
    }
    if !catalog.supports_search(locale) {
        return Some("no search collation");
    }
    None
}

/// Генерирует `<dest>/<locale>.txt` для root и всех локалей с коллацией
/// `search`. Root идёт первым: остальные локали пишут только отличия от него.
///
/// Неразрешённые классы не фатальны: файл локали пишется с уже готовыми
/// уровнями, более высокие уровни этой локали пропускаются.
pub fn run(opts: &GenerateOptions) -> Result<GenerateReport> {
    let catalog = RuleCatalog::open(&opts.source_dir)?;
    fs::create_dir_all(&opts.dest_dir)
        .with_context(|| format!("create output dir {}", opts.dest_dir.display()))?;

    let mut order: Vec<&str> = vec![ROOT_LOCALE];
    order.extend(catalog.locales().filter(|l| *l != ROOT_LOCALE));

    let mut report = GenerateReport::default();
    let mut root_maps: HashMap<Strength, BTreeMap<String, String>> = HashMap::new();

    for locale in order {
        let mut lr = LocaleReport {
            locale: locale.to_string(),
            ..Default::default()
        };

        if let Some(reason) = skip_reason(&catalog, locale) {
            tracing::info!(locale = %locale, reason, "locale skipped");
            lr.skipped = Some(reason.to_string());
            report.locales.push(lr);
            continue;
        }

        let source = catalog.source(locale)?;
        let mut sections = Vec::new();

        for strength in Strength::GENERATED {
            let map = build_folding_map(&source, strength, &opts.build);
            let complete = map.is_complete();

            let mappings = if locale == ROOT_LOCALE {
                root_maps.insert(strength, map.mappings.clone());
                map.mappings
            } else {
                consolidate(&map.mappings, root_maps.get(&strength))
            };
            lr.written.insert(strength, mappings.len());
            lr.unresolved.extend(map.unresolved);
            sections.push(Section { strength, mappings });

            if !complete {
                tracing::warn!(
                    locale = %locale,
                    strength = %strength,
                    "unresolved equivalence classes, higher strengths skipped"
                );
                break;
            }
        }

        write_locale(&opts.dest_dir, locale, &sections)?;
        report.locales.push(lr);
    }

    Ok(report)
}

/// Отладочный дамп: все классы с двумя и более членами.
/// Строка: `<ключ>\t<член> <член> ...`, члены в hex.
pub fn dump_key_sequences<S, W>(
    source: &S,
    strength: Strength,
    opts: &BuildOptions,
    out: &mut W,
) -> Result<()>
where
    S: CollationElementSource + ?Sized,
    W: Write,
{
    for class in collect_classes(source, strength, &opts.code_points) {
        if class.members.len() < 2 {
            continue;
        }
        let members: Vec<String> = class.members.iter().map(|m| format!("<{}>", encode_key(m))).collect();
        writeln!(out, "{}\t{}", class.key, members.join(" "))?;
    }
    Ok(())
}
