// crates/colfold_table/src/build/mod.rs
pub mod classes;
pub mod resolver;
pub mod selector;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::collections::btree_map::Entry;
use std::ops::RangeInclusive;

use crate::element::CollationKeySequence;
use crate::source::CollationElementSource;
use crate::strength::Strength;

/// С какой длины ключа неразрешённый класс считается ошибкой таблицы.
pub const UNRESOLVED_MIN_KEY_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub code_points: RangeInclusive<u32>,
    /// Максимум составных вариантов на класс.
    pub composite_limit: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            code_points: 0..=0x10FFFF,
            composite_limit: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedClass {
    pub key: String,
    pub members: Vec<String>,
}

/// Результат построения для (locale, strength).
#[derive(Debug, Clone, Default)]
pub struct FoldingMap {
    pub locale: String,
    pub strength: Strength,
    /// from -> canonical
    pub mappings: BTreeMap<String, String>,
    pub unresolved: Vec<UnresolvedClass>,
    pub class_count: usize,
}

impl FoldingMap {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

pub fn build_folding_map<S>(source: &S, strength: Strength, opts: &BuildOptions) -> FoldingMap
where
    S: CollationElementSource + ?Sized,
{
    let classes = classes::collect_classes(source, strength, &opts.code_points);
    let class_count = classes.len();

    let mut canonical: HashMap<CollationKeySequence, String> = HashMap::with_capacity(class_count);
    let mut mappings = BTreeMap::new();
    let mut unresolved = Vec::new();

    for class in classes {
        let mut members = class.members;

        // 1) составные представители из более коротких классов
        if class.key.len() >= 2 {
            let extra = resolver::composites(&class.key, &canonical, opts.composite_limit);
            if extra.is_empty()
                && members.len() >= 2
                && class.key.len() >= UNRESOLVED_MIN_KEY_LEN
            {
                tracing::warn!(
                    locale = %source.locale(),
                    strength = %strength,
                    key = %class.key,
                    members = members.len(),
                    "equivalence class could not be resolved"
                );
                unresolved.push(UnresolvedClass {
                    key: class.key.to_string(),
                    members: members.clone(),
                });
            }
            for s in extra {
                if !members.contains(&s) {
                    members.push(s);
                }
            }
        }

        // 2) канонический представитель
        let Some(best) = selector::select_canonical(&members).map(|s| s.to_string()) else {
            continue;
        };

        // 3) остальные члены -> canonical; при конфликте побеждает первый
        for m in &members {
            if *m == best {
                continue;
            }
            match mappings.entry(m.clone()) {
                Entry::Vacant(v) => {
                    v.insert(best.clone());
                }
                Entry::Occupied(o) => {
                    tracing::debug!(
                        from = %crate::key::encode_key(m),
                        kept = %crate::key::encode_key(o.get()),
                        dropped = %crate::key::encode_key(&best),
                        "conflicting folding target"
                    );
                }
            }
        }
        canonical.insert(class.key, best);
    }

    tracing::info!(
        locale = %source.locale(),
        strength = %strength,
        classes = class_count,
        mappings = mappings.len(),
        unresolved = unresolved.len(),
        "folding map built"
    );

    FoldingMap {
        locale: source.locale().to_string(),
        strength,
        mappings,
        unresolved,
        class_count,
    }
}
