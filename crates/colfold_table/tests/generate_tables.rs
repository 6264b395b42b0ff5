use colfold_table::generate::{self, GenerateOptions};
use colfold_table::resbundle::{lookup, read_bundle};
use colfold_table::{BuildOptions, FoldingTable, Strength};
use std::path::{Path, PathBuf};

fn testdata(dir: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata")
        .join(dir)
}

fn options(source: &str, dest: &Path) -> GenerateOptions {
    GenerateOptions {
        source_dir: testdata(source),
        dest_dir: dest.to_path_buf(),
        build: BuildOptions {
            code_points: 0..=0x24FF,
            ..Default::default()
        },
    }
}

fn entry(path: &Path, strength: &str, key: &str) -> Option<String> {
    let (_, res) = read_bundle(path).unwrap();
    lookup(&res, &[strength, key]).and_then(|r| r.as_str()).map(|s| s.to_string())
}

#[test]
fn generates_root_and_search_locales_only() -> anyhow::Result<()> {
    let td = tempfile::tempdir()?;
    let out = td.path().join("colf");
    let report = generate::run(&options("rules", &out))?;

    assert!(report.is_complete());
    assert_eq!(report.locales[0].locale, "root");

    let generated: Vec<&str> = report.generated().map(|l| l.locale.as_str()).collect();
    assert_eq!(generated, vec!["root", "da", "de"]);
    for l in &report.locales {
        match l.locale.as_str() {
            "fr" => assert_eq!(l.skipped.as_deref(), Some("no search collation")),
            "de__PHONEBOOK" => assert_eq!(l.skipped.as_deref(), Some("legacy variant")),
            _ => assert!(l.skipped.is_none()),
        }
    }

    assert!(out.join("root.txt").is_file());
    assert!(out.join("da.txt").is_file());
    assert!(out.join("de.txt").is_file());
    assert!(!out.join("fr.txt").exists());
    assert!(!out.join("de__PHONEBOOK.txt").exists());

    let text = std::fs::read_to_string(out.join("root.txt"))?;
    assert!(text.starts_with("// Generated"));
    assert!(text.contains("\t\t00DF{\"ss\"}\n"));
    Ok(())
}

#[test]
fn locale_files_hold_only_differences_from_root() -> anyhow::Result<()> {
    let td = tempfile::tempdir()?;
    generate::run(&options("rules", td.path()))?;
    let de = td.path().join("de.txt");
    let root = td.path().join("root.txt");

    assert_eq!(entry(&root, "primary", "0041").as_deref(), Some("a"));
    assert_eq!(entry(&de, "primary", "0041"), None);
    assert_eq!(entry(&de, "primary", "00E4").as_deref(), Some("ae"));
    assert_eq!(entry(&root, "primary", "00E4").as_deref(), Some("a\u{300}"));

    // overlaying de on root gives de's own map back
    let t = FoldingTable::load(td.path(), "de_DE", Strength::Primary)?;
    assert_eq!(t.get(&['A']), Some("a"));
    assert_eq!(t.get(&['a', '\u{308}']), Some("ae"));
    assert_eq!(t.get(&['a', '\u{301}']), Some("a\u{300}"));
    Ok(())
}

#[test]
fn locale_mapping_overrides_root() -> anyhow::Result<()> {
    let td = tempfile::tempdir()?;
    generate::run(&options("rules", td.path()))?;
    let da = td.path().join("da.txt");
    let root = td.path().join("root.txt");

    // root treats the ring as an accent, da as a letter of its own
    assert_eq!(entry(&root, "primary", "00E5").as_deref(), Some("a\u{300}"));
    assert_eq!(entry(&da, "primary", "00E5").as_deref(), Some("a\u{30a}"));

    let t = FoldingTable::load(td.path(), "da", Strength::Primary)?;
    assert_eq!(t.get(&['A', '\u{30a}']), Some("a\u{30a}"));
    assert_eq!(t.get(&['a', '\u{30a}']), Some("a\u{30a}"));
    assert_eq!(t.get(&['a', '\u{300}']), Some("a\u{300}"));
    Ok(())
}

#[test]
fn report_serializes_to_json() -> anyhow::Result<()> {
    let td = tempfile::tempdir()?;
    let report = generate::run(&options("rules", &td.path().join("out")))?;
    let p = td.path().join("report.json");
    report.write_json(&p)?;

    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&p)?)?;
    let root = &v["locales"][0];
    assert_eq!(root["locale"], "root");
    assert!(root["written"]["primary"].as_u64().unwrap() > 0);
    assert!(root.get("skipped").is_none());
    Ok(())
}

#[test]
fn unresolved_class_stops_higher_strengths() -> anyhow::Result<()> {
    let td = tempfile::tempdir()?;
    let report = generate::run(&options("unresolved", td.path()))?;

    assert!(!report.is_complete());
    let root = &report.locales[0];
    assert_eq!(root.unresolved.len(), 1);
    assert_eq!(root.written.len(), 1);

    let text = std::fs::read_to_string(td.path().join("root.txt"))?;
    assert!(text.contains("\tprimary{"));
    assert!(!text.contains("secondary{"));
    assert!(!text.contains("tertiary{"));
    Ok(())
}

#[test]
fn missing_source_dir_is_fatal() {
    let td = tempfile::tempdir().unwrap();
    let opts = GenerateOptions {
        source_dir: td.path().join("nope"),
        dest_dir: td.path().join("out"),
        build: BuildOptions::default(),
    };
    assert!(generate::run(&opts).is_err());
}

#[test]
fn key_dump_lists_shared_classes() -> anyhow::Result<()> {
    let catalog = colfold_table::RuleCatalog::open(&testdata("rules"))?;
    let source = catalog.source("root")?;
    let opts = options("rules", Path::new("unused")).build;

    let mut out = Vec::new();
    generate::dump_key_sequences(&source, Strength::Primary, &opts, &mut out)?;
    let text = String::from_utf8(out)?;

    let line = text
        .lines()
        .find(|l| l.starts_with("[1FA2.00.00]\t"))
        .expect("class of a");
    assert!(line.contains("<0041>") && line.contains("<0061>"));
    // sharp s is alone in its class
    assert!(!text.lines().any(|l| l.starts_with("[1FB4.00.00][1FB4.00.00]\t")));
    Ok(())
}
