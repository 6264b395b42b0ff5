// crates/colfold_table/src/resbundle/writer.rs
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::key::encode_key;
use crate::strength::Strength;

pub const HEADER: &str = "// Generated by gencolf. Do not edit.";

/// Одна секция `<strength>{...}` файла локали.
#[derive(Debug, Clone)]
pub struct Section {
    pub strength: Strength,
    pub mappings: BTreeMap<String, String>,
}

/// Убирает записи, совпадающие с root. Если root складывает строку,
/// которую локаль оставляет как есть, пишется тождественная запись,
/// иначе при наложении на root вернулось бы чужое отображение.
pub fn consolidate(
    mappings: &BTreeMap<String, String>,
    root: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let Some(root) = root else {
        return mappings.clone();
    };

    let mut out: BTreeMap<String, String> = mappings
        .iter()
        .filter(|(from, to)| root.get(*from) != Some(*to))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for from in root.keys() {
        if !mappings.contains_key(from) {
            out.insert(from.clone(), from.clone());
        }
    }
    out
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

/// Текст ресурса. Пустые секции не пишутся.
pub fn render(locale: &str, sections: &[Section]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(locale);
    out.push_str("{\n");
    for section in sections {
        if section.mappings.is_empty() {
            continue;
        }
        out.push('\t');
        out.push_str(section.strength.as_str());
        out.push_str("{\n");
        for (from, to) in &section.mappings {
            out.push_str("\t\t");
            out.push_str(&encode_key(from));
            out.push_str("{\"");
            out.push_str(&escape(to));
            out.push_str("\"}\n");
        }
        out.push_str("\t}\n");
    }
    out.push_str("}\n");
    out
}

/// Пишет `<dir>/<locale>.txt`.
pub fn write_locale(dir: &Path, locale: &str, sections: &[Section]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;
    let path = dir.join(format!("{locale}.txt"));
    let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    w.write_all(render(locale, sections).as_bytes())?;
    w.flush()?;
    tracing::info!(
        path = %path.display(),
        sections = sections.iter().filter(|s| !s.mappings.is_empty()).count(),
        "folding table written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn renders_sorted_hex_keys_and_escapes() {
        let sections = vec![
            Section {
                strength: Strength::Primary,
                mappings: map(&[("\u{e4}", "ae"), ("A", "a"), ("\u{ff02}", "\"")]),
            },
            Section {
                strength: Strength::Secondary,
                mappings: BTreeMap::new(),
            },
        ];
        let text = render("de", &sections);
        assert_eq!(
            text,
            "// Generated by gencolf. Do not edit.\n\
             de{\n\
             \tprimary{\n\
             \t\t0041{\"a\"}\n\
             \t\t00E4{\"ae\"}\n\
             \t\tFF02{\"\\\"\"}\n\
             \t}\n\
             }\n"
        );
    }

    #[test]
    fn consolidation_drops_root_duplicates_and_keeps_overrides() {
        let root = map(&[("A", "a"), ("\u{e4}", "a\u{300}"), ("\u{c5}", "a\u{30a}")]);
        let de = map(&[("A", "a"), ("\u{e4}", "ae"), ("\u{c4}", "ae")]);
        let out = consolidate(&de, Some(&root));
        assert_eq!(
            out,
            map(&[("\u{e4}", "ae"), ("\u{c4}", "ae"), ("\u{c5}", "\u{c5}")])
        );
        assert_eq!(consolidate(&de, None), de);
    }

    #[test]
    fn rendered_contraction_keys_read_back() {
        use crate::resbundle::reader::{lookup, parse_bundle};

        let sections = vec![Section {
            strength: Strength::Primary,
            mappings: map(&[("A\u{30a}", "a\u{30a}"), ("\u{e5}", "a\u{30a}"), ("\u{df}", "ss")]),
        }];
        let (name, res) = parse_bundle(&render("da", &sections)).unwrap();
        assert_eq!(name, "da");
        for (from, to) in &sections[0].mappings {
            let key = encode_key(from);
            assert_eq!(
                lookup(&res, &["primary", key.as_str()]).and_then(|r| r.as_str()),
                Some(to.as_str()),
                "{key}"
            );
        }
    }

    #[test]
    fn escapes_every_occurrence() {
        assert_eq!(escape(r#"a\b"c\"#), r#"a\\b\"c\\"#);
    }
}
