// crates/colfold_table/src/table.rs
use anyhow::{Context, Result, anyhow, bail};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

use crate::key::decode_key;
use crate::resbundle::{Resource, lookup, read_bundle};
use crate::source::rules::{ROOT_LOCALE, parent_locale};
use crate::strength::Strength;

/// Таблица свёртки для одной (locale, strength), готовая к поиску.
///
/// Ключи и значения хранятся в NFD. Каждое многосимвольное значение
/// дополнительно зарегистрировано как ключ само на себя, чтобы
/// канонические сокращения распознавались целиком.
#[derive(Debug, Clone, Default)]
pub struct FoldingTable {
    locale: String,
    strength: Strength,
    entries: HashMap<Box<[char]>, Box<str>>,
    max_key_len: usize,
}

impl FoldingTable {
    pub fn empty(locale: &str, strength: Strength) -> Self {
        Self {
            locale: locale.to_string(),
            strength,
            entries: HashMap::new(),
            max_key_len: 0,
        }
    }

    /// Из пар `from -> canonical` (например, прямо из `FoldingMap`).
    pub fn from_mappings<I>(locale: &str, strength: Strength, mappings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut t = Self::empty(locale, strength);
        let mut layer = HashMap::new();
        for (from, to) in mappings {
            insert_nfd(&mut layer, &from, &to)?;
        }
        t.merge(layer);
        t.add_identity_keys();
        Ok(t)
    }

    /// Секция `strength` из root, поверх неё секция локали.
    pub fn from_bundles(
        locale: &str,
        strength: Strength,
        root: &Resource,
        overlay: Option<&Resource>,
    ) -> Result<Self> {
        let mut t = Self::empty(locale, strength);
        for bundle in std::iter::once(root).chain(overlay) {
            let Some(section) = lookup(bundle, &[strength.as_str()]).and_then(|r| r.as_table()) else {
                continue;
            };
            let mut layer = HashMap::new();
            for (key, value) in section {
                let from = decode_key(key)?;
                let to = value
                    .as_str()
                    .ok_or_else(|| anyhow!("entry {key} is not a string"))?;
                insert_nfd(&mut layer, &from, to)?;
            }
            // слой локали целиком перекрывает root
            t.merge(layer);
        }
        t.add_identity_keys();
        Ok(t)
    }

    /// Загружает `root.txt` и самый специфичный файл цепочки локали.
    pub fn load(data_dir: &Path, locale: &str, strength: Strength) -> Result<Self> {
        let root_path = data_dir.join(format!("{ROOT_LOCALE}.txt"));
        let (_, root) = read_bundle(&root_path)?;
        let overlay = match locale_bundle_path(data_dir, locale) {
            Some(p) if p != root_path => Some(read_bundle(&p)?.1),
            _ => None,
        };
        let t = Self::from_bundles(locale, strength, &root, overlay.as_ref())
            .with_context(|| format!("build folding table for {locale}/{strength}"))?;
        tracing::debug!(locale = %locale, strength = %strength, entries = t.len(), "folding table loaded");
        Ok(t)
    }

    fn merge(&mut self, layer: HashMap<Box<[char]>, Box<str>>) {
        for (k, v) in layer {
            self.max_key_len = self.max_key_len.max(k.len());
            self.entries.insert(k, v);
        }
    }

    fn add_identity_keys(&mut self) {
        let values: Vec<Box<str>> = self
            .entries
            .values()
            .filter(|v| v.chars().nth(1).is_some())
            .cloned()
            .collect();
        for v in values {
            let key: Box<[char]> = v.chars().collect::<Vec<_>>().into_boxed_slice();
            let len = key.len();
            if let Entry::Vacant(e) = self.entries.entry(key) {
                e.insert(v);
                self.max_key_len = self.max_key_len.max(len);
            }
        }
    }

    pub fn get(&self, key: &[char]) -> Option<&str> {
        self.entries.get(key).map(|v| &**v)
    }

    pub fn contains(&self, key: &[char]) -> bool {
        self.entries.contains_key(key)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn max_key_len(&self) -> usize {
        self.max_key_len
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn insert_nfd(layer: &mut HashMap<Box<[char]>, Box<str>>, from: &str, to: &str) -> Result<()> {
    if to.is_empty() {
        bail!("empty canonical string for {}", crate::key::encode_key(from));
    }
    let raw: Vec<char> = from.chars().collect();
    let key: Box<[char]> = from.nfd().collect::<Vec<_>>().into_boxed_slice();
    let value: Box<str> = to.nfd().collect::<String>().into_boxed_str();

    // "a\u{308}" и "ä" дают один ключ; запись, уже бывшая в NFD, приоритетнее
    let already_nfd = *raw == *key;
    match layer.entry(key) {
        Entry::Vacant(v) => {
            v.insert(value);
        }
        Entry::Occupied(mut o) => {
            if already_nfd {
                o.insert(value);
            }
        }
    }
    Ok(())
}

/// Самый специфичный существующий файл: `de_DE.txt`, `de.txt`, `root.txt`.
pub fn locale_bundle_path(data_dir: &Path, locale: &str) -> Option<PathBuf> {
    let mut cur = Some(locale.to_string());
    while let Some(l) = cur {
        let p = data_dir.join(format!("{l}.txt"));
        if p.is_file() {
            return Some(p);
        }
        cur = parent_locale(&l);
    }
    None
}
