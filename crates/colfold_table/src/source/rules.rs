// crates/colfold_table/src/source/rules.rs
//
// Источник элементов коллации из текстовых файлов правил в синтаксисе
// allkeys.txt:
//
//   @collations standard search
//   0061 ; [.1FA2.0020.0002] # LATIN SMALL LETTER A
//   0061 030A ; [.2100.0020.0002]
//
// Каталог: каталог с `<locale>.txt`; локаль наследует правила родителей
// (de_DE -> de -> root).
use anyhow::{Context, Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

use super::CollationElementSource;
use crate::element::CollationElement;
use crate::strength::Strength;

pub const ROOT_LOCALE: &str = "root";

static WEIGHTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([*.])([0-9A-Fa-f]{4,6})\.([0-9A-Fa-f]{4})\.([0-9A-Fa-f]{4})\]")
        .expect("weights regex")
});

/// Разобранный файл правил одной локали.
#[derive(Debug, Clone, Default)]
pub struct RuleFile {
    pub locale: String,
    pub path: PathBuf,
    /// Варианты коллации из `@collations` (standard, search, ...).
    pub collations: Vec<String>,
    /// Ключи уже в NFD.
    pub entries: HashMap<Vec<char>, Vec<CollationElement>>,
    /// Ключи, записанные в файле несколькими кодовыми точками (в NFD).
    /// Прекомпозиты вроде U+0344 сюда не попадают.
    pub contractions: BTreeSet<Vec<char>>,
}

impl RuleFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read rule file {}", path.display()))?;
        let locale = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("bad rule file name: {}", path.display()))?;
        let mut file = Self::parse(locale, &text)
            .with_context(|| format!("parse rule file {}", path.display()))?;
        file.path = path.to_path_buf();
        Ok(file)
    }

    pub fn parse(locale: &str, text: &str) -> Result<Self> {
        let mut file = RuleFile {
            locale: locale.to_string(),
            ..Default::default()
        };

        for (no, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if let Some(directive) = line.strip_prefix('@') {
                let mut parts = directive.split_whitespace();
                if parts.next() == Some("collations") {
                    file.collations.extend(parts.map(|s| s.to_string()));
                }
                // прочие директивы (@version, @implicitweights) не нужны
                continue;
            }

            let (keys, weights) = line
                .split_once(';')
                .ok_or_else(|| anyhow!("line {}: expected '<code points> ; <weights>'", no + 1))?;

            let mut key = String::new();
            for hex in keys.split_whitespace() {
                let cp = u32::from_str_radix(hex, 16)
                    .map_err(|e| anyhow!("line {}: bad code point '{hex}': {e}", no + 1))?;
                let ch = char::from_u32(cp)
                    .ok_or_else(|| anyhow!("line {}: U+{cp:04X} is not a scalar value", no + 1))?;
                key.push(ch);
            }
            if key.is_empty() {
                bail!("line {}: empty key", no + 1);
            }

            let elements = parse_weights(weights).with_context(|| format!("line {}", no + 1))?;
            if elements.is_empty() {
                bail!("line {}: no collation elements", no + 1);
            }

            let raw: Vec<char> = key.chars().collect();
            let nfd: Vec<char> = key.nfd().collect();
            if raw != nfd {
                // U+0340 -> U+0300 и т.п.: запись в NFD приоритетнее
                if let Some(prev) = file.entries.get(&nfd) {
                    if *prev != elements {
                        tracing::warn!(
                            locale = %locale,
                            line = no + 1,
                            key = %crate::key::encode_key(&key),
                            "canonical equivalent already has other weights, entry ignored"
                        );
                    }
                    continue;
                }
            }
            if raw.len() > 1 {
                file.contractions.insert(nfd.clone());
            }
            file.entries.insert(nfd, elements);
        }
        Ok(file)
    }

    pub fn has_collation(&self, name: &str) -> bool {
        self.collations.iter().any(|c| c == name)
    }
}

fn parse_weights(s: &str) -> Result<Vec<CollationElement>> {
    let mut out = Vec::new();
    for cap in WEIGHTS_RE.captures_iter(s) {
        let p = u32::from_str_radix(&cap[2], 16)?;
        let s2 = u32::from_str_radix(&cap[3], 16)?;
        let t = u32::from_str_radix(&cap[4], 16)?;
        if p > 0xFFFF || s2 > 0xFF || t > 0xFF {
            bail!("weights [{:04X}.{:04X}.{:04X}] do not fit a collation element", p, s2, t);
        }
        // cap[1] == "*": переменный вес; при non-ignorable обработке не влияет
        out.push(CollationElement::new(p as u16, s2 as u8, t as u8));
    }
    Ok(out)
}

/// Родитель локали: `de_DE -> de`, `de__PHONEBOOK -> de`, `de -> root`.
pub fn parent_locale(locale: &str) -> Option<String> {
    if locale == ROOT_LOCALE || locale.is_empty() {
        return None;
    }
    match locale.rfind('_') {
        Some(idx) => {
            let parent = locale[..idx].trim_end_matches('_');
            if parent.is_empty() {
                Some(ROOT_LOCALE.to_string())
            } else {
                Some(parent.to_string())
            }
        }
        None => Some(ROOT_LOCALE.to_string()),
    }
}

/// Все файлы правил каталога.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    files: BTreeMap<String, RuleFile>,
}

impl RuleCatalog {
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("rule directory {} does not exist", dir.display());
        }
        let mut paths = Vec::new();
        collect_txt(dir, &mut paths)?;

        let mut files = BTreeMap::new();
        for p in paths {
            let f = RuleFile::load(&p)?;
            tracing::debug!(locale = %f.locale, entries = f.entries.len(), "rule file loaded");
            if let Some(prev) = files.insert(f.locale.clone(), f) {
                bail!("duplicate rule file for locale {}", prev.locale);
            }
        }
        if !files.contains_key(ROOT_LOCALE) {
            bail!("{} has no {ROOT_LOCALE}.txt", dir.display());
        }
        Ok(Self { files })
    }

    /// Локали в порядке имён (root входит).
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Есть ли у локали собственная коллация `search`. Для root всегда да.
    pub fn supports_search(&self, locale: &str) -> bool {
        if locale == ROOT_LOCALE {
            return true;
        }
        self.files
            .get(locale)
            .map(|f| f.has_collation("search"))
            .unwrap_or(false)
    }

    /// Источник для локали: root, затем предки, затем сама локаль.
    pub fn source(&self, locale: &str) -> Result<RuleSource> {
        if !self.files.contains_key(locale) {
            bail!("no rules for locale {locale}");
        }
        let mut chain = vec![locale.to_string()];
        let mut cur = locale.to_string();
        while let Some(parent) = parent_locale(&cur) {
            chain.push(parent.clone());
            cur = parent;
        }

        let mut entries: HashMap<Vec<char>, Vec<CollationElement>> = HashMap::new();
        let mut contractions = BTreeSet::new();
        for l in chain.iter().rev() {
            if let Some(f) = self.files.get(l) {
                for (k, v) in &f.entries {
                    entries.insert(k.clone(), v.clone());
                }
                contractions.extend(f.contractions.iter().cloned());
            }
        }
        Ok(RuleSource::from_entries(locale, entries, contractions))
    }
}

fn collect_txt(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let rd = fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))?;
    for entry in rd {
        let path = entry?.path();
        if path.is_dir() {
            collect_txt(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("txt") {
            out.push(path);
        }
    }
    out.sort();
    Ok(())
}

/// Коллатор одной локали поверх слитых правил.
#[derive(Debug, Clone)]
pub struct RuleSource {
    locale: String,
    entries: HashMap<Vec<char>, Vec<CollationElement>>,
    contractions: BTreeSet<Vec<char>>,
    max_key_len: usize,
}

impl RuleSource {
    pub fn from_entries(
        locale: &str,
        entries: HashMap<Vec<char>, Vec<CollationElement>>,
        contractions: BTreeSet<Vec<char>>,
    ) -> Self {
        let max_key_len = entries.keys().map(|k| k.len()).max().unwrap_or(1);
        Self {
            locale: locale.to_string(),
            entries,
            contractions,
            max_key_len,
        }
    }

    /// Элементы без обрезки по уровню.
    pub fn raw_elements(&self, text: &str) -> Vec<CollationElement> {
        let mut chars: Vec<char> = text.nfd().collect();
        let mut out = Vec::with_capacity(chars.len() * 2);
        let mut i = 0;

        while i < chars.len() {
            // 1) самое длинное непрерывное совпадение
            let longest = self.max_key_len.min(chars.len() - i);
            let mut matched = None;
            for len in (1..=longest).rev() {
                if self.entries.contains_key(&chars[i..i + len]) {
                    matched = Some(len);
                    break;
                }
            }

            let Some(mut len) = matched else {
                out.extend(implicit_weights(chars[i]));
                i += 1;
                continue;
            };

            // 2) разрывные сокращения: подтягиваем неблокированные нестартеры
            let mut j = i + len;
            let mut max_ccc = 0u8;
            while j < chars.len() {
                let ccc = canonical_combining_class(chars[j]);
                if ccc == 0 {
                    break;
                }
                let unblocked = j == i + len || max_ccc < ccc;
                if unblocked {
                    let mut probe = chars[i..i + len].to_vec();
                    probe.push(chars[j]);
                    if self.entries.contains_key(&probe) {
                        let c = chars.remove(j);
                        chars.insert(i + len, c);
                        len += 1;
                        j = i + len;
                        max_ccc = 0;
                        continue;
                    }
                }
                max_ccc = max_ccc.max(ccc);
                j += 1;
            }

            if let Some(elements) = self.entries.get(&chars[i..i + len]) {
                out.extend_from_slice(elements);
            }
            i += len;
        }
        out
    }
}

impl CollationElementSource for RuleSource {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn elements(&self, text: &str, strength: Strength) -> Vec<CollationElement> {
        self.raw_elements(text)
            .into_iter()
            .map(|e| e.masked(strength))
            .collect()
    }

    fn contractions(&self) -> Vec<String> {
        self.contractions.iter().map(|k| k.iter().collect()).collect()
    }
}

/// Неявные веса UCA для кодовых точек без явной записи.
pub fn implicit_weights(ch: char) -> [CollationElement; 2] {
    let cp = ch as u32;
    let base: u32 = match cp {
        0x4E00..=0x9FFF | 0xF900..=0xFAFF => 0xFB40,
        0x3400..=0x4DBF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
        | 0x30000..=0x3134F => 0xFB80,
        _ => 0xFBC0,
    };
    let aaaa = (base + (cp >> 15)) as u16;
    let bbbb = ((cp & 0x7FFF) | 0x8000) as u16;
    [
        CollationElement::new(aaaa, 0x20, 0x02),
        CollationElement::new(bbbb, 0, 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "\
# tiny root
0061 ; [.1FA2.0020.0002] # a
0041 ; [.1FA2.0020.0008] # A
0301 ; [.0000.0024.0002]
030A ; [.0000.0029.0002]
0316 ; [.0000.0037.0002]
";

    const DA: &str = "\
@collations standard search
0061 030A ; [.2100.0020.0002]
";

    fn source(extra: Option<&str>) -> RuleSource {
        let root = RuleFile::parse("root", ROOT).unwrap();
        let mut entries = root.entries;
        let mut contractions = root.contractions;
        if let Some(t) = extra {
            let f = RuleFile::parse("da", t).unwrap();
            entries.extend(f.entries);
            contractions.extend(f.contractions);
        }
        RuleSource::from_entries("da", entries, contractions)
    }

    #[test]
    fn parses_directives_and_weights() {
        let f = RuleFile::parse("da", DA).unwrap();
        assert!(f.has_collation("search"));
        assert_eq!(f.entries.len(), 1);
        assert_eq!(
            f.entries[&vec!['a', '\u{30a}']],
            vec![CollationElement::new(0x2100, 0x20, 0x02)]
        );
    }

    #[test]
    fn oversized_secondary_is_an_error() {
        let err = RuleFile::parse("x", "0061 ; [.1FA2.0120.0002]").unwrap_err();
        assert!(format!("{err:#}").contains("do not fit"));
    }

    #[test]
    fn precomposed_key_is_stored_decomposed() {
        let f = RuleFile::parse("x", "00E5 ; [.2100.0020.0002]").unwrap();
        assert!(f.entries.contains_key(&vec!['a', '\u{30a}']));
        assert!(f.contractions.is_empty());
    }

    #[test]
    fn canonical_duplicates_do_not_override_or_contract() {
        let text = "\
0301 ; [.0000.0024.0002]
0341 ; [.0000.0062.0002]
0308 ; [.0000.002B.0002]
0344 ; [.0000.002B.0002][.0000.0024.0002]
";
        let f = RuleFile::parse("root", text).unwrap();
        // U+0341 decomposes to U+0301 and must not replace its weights
        assert_eq!(f.entries[&vec!['\u{301}']], vec![CollationElement::new(0, 0x24, 0x02)]);
        // U+0344 is one code point in the file, so not a contraction
        assert!(f.entries.contains_key(&vec!['\u{308}', '\u{301}']));
        assert!(f.contractions.is_empty());

        let s = RuleSource::from_entries("root", f.entries, f.contractions);
        assert!(s.contractions().is_empty());
    }

    #[test]
    fn contractions_come_from_multi_code_point_lines() {
        let s = source(Some(DA));
        assert_eq!(s.contractions(), vec!["a\u{30a}".to_string()]);
    }

    #[test]
    fn discontiguous_contraction_skips_unblocked_mark() {
        let s = source(Some(DA));
        let els = s.elements("a\u{316}\u{30a}", Strength::Primary);
        assert_eq!(els[0].primary, 0x2100);
        let els2 = s.elements("\u{e5}\u{316}", Strength::Primary);
        assert_eq!(els, els2);
    }

    #[test]
    fn unknown_code_points_get_implicit_weights() {
        let s = source(None);
        let els = s.elements("\u{4e00}", Strength::Tertiary);
        assert_eq!(els[0], CollationElement::new(0xFB40, 0x20, 0x02));
        assert_eq!(els[1], CollationElement::new(0xCE00, 0, 0));
        let els = s.elements("z", Strength::Primary);
        assert_eq!(els[0].primary, 0xFBC0);
    }

    #[test]
    fn parent_chain() {
        assert_eq!(parent_locale("de_DE").as_deref(), Some("de"));
        assert_eq!(parent_locale("de__PHONEBOOK").as_deref(), Some("de"));
        assert_eq!(parent_locale("de").as_deref(), Some("root"));
        assert_eq!(parent_locale("root"), None);
    }
}
