// crates/colfold_table/src/build/classes.rs
use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::element::CollationKeySequence;
use crate::source::CollationElementSource;
use crate::strength::Strength;

/// Строки с одинаковым ключом на одном уровне.
#[derive(Debug, Clone)]
pub struct EquivalenceClass {
    pub key: CollationKeySequence,
    pub members: Vec<String>,
}

/// Перебирает все кодовые точки диапазона (кроме суррогатов) и все
/// сокращения источника, группирует по ключу. Классы упорядочены по длине
/// ключа, затем по самому ключу.
pub fn collect_classes<S>(
    source: &S,
    strength: Strength,
    code_points: &RangeInclusive<u32>,
) -> Vec<EquivalenceClass>
where
    S: CollationElementSource + ?Sized,
{
    let mut by_key: HashMap<CollationKeySequence, Vec<String>> = HashMap::new();
    let mut buf = [0u8; 4];

    for cp in code_points.clone() {
        // char::from_u32 отбрасывает суррогаты и значения > 10FFFF
        let Some(ch) = char::from_u32(cp) else {
            continue;
        };
        let text: &str = ch.encode_utf8(&mut buf);
        let key = source.key_sequence(text, strength);
        by_key.entry(key).or_default().push(text.to_string());
    }

    for text in source.contractions() {
        let key = source.key_sequence(&text, strength);
        let members = by_key.entry(key).or_default();
        if !members.contains(&text) {
            members.push(text);
        }
    }

    let mut classes: Vec<EquivalenceClass> = by_key
        .into_iter()
        .map(|(key, members)| EquivalenceClass { key, members })
        .collect();
    classes.sort_by(|a, b| a.key.len().cmp(&b.key.len()).then_with(|| a.key.cmp(&b.key)));
    classes
}
