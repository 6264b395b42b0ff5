// crates/colfold_table/src/element.rs
use std::cmp::Ordering;
use std::fmt;

use crate::strength::Strength;

/// Один элемент коллации: веса трёх уровней.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CollationElement {
    pub primary: u16,
    pub secondary: u8,
    pub tertiary: u8,
}

impl CollationElement {
    pub const IGNORABLE: CollationElement = CollationElement {
        primary: 0,
        secondary: 0,
        tertiary: 0,
    };

    pub const fn new(primary: u16, secondary: u8, tertiary: u8) -> Self {
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    pub fn is_ignorable(&self) -> bool {
        self.primary == 0 && self.secondary == 0 && self.tertiary == 0
    }

    /// Обнуляет компоненты ниже заданного уровня.
    pub fn masked(self, strength: Strength) -> Self {
        match strength {
            Strength::Primary => Self::new(self.primary, 0, 0),
            Strength::Secondary => Self::new(self.primary, self.secondary, 0),
            _ => self,
        }
    }
}

/// Ключ строки: последовательность элементов на одном уровне.
///
/// Подряд идущие игнорируемые элементы схлопываются в один при создании,
/// поэтому равенство ключей совпадает с равенством для коллатора.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CollationKeySequence {
    items: Vec<CollationElement>,
}

impl CollationKeySequence {
    pub fn new(mut items: Vec<CollationElement>) -> Self {
        items.dedup_by(|a, b| a.is_ignorable() && b.is_ignorable());
        Self { items }
    }

    pub fn items(&self) -> &[CollationElement] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Подпоследовательность `[start, end)` как самостоятельный ключ.
    pub fn run(&self, start: usize, end: usize) -> CollationKeySequence {
        CollationKeySequence {
            items: self.items[start..end].to_vec(),
        }
    }
}

impl Ord for CollationKeySequence {
    fn cmp(&self, other: &Self) -> Ordering {
        let primaries = |k: &Self| k.items.iter().map(|e| e.primary).collect::<Vec<_>>();
        let secondaries = |k: &Self| k.items.iter().map(|e| e.secondary).collect::<Vec<_>>();
        let tertiaries = |k: &Self| k.items.iter().map(|e| e.tertiary).collect::<Vec<_>>();

        primaries(self)
            .cmp(&primaries(other))
            .then_with(|| secondaries(self).cmp(&secondaries(other)))
            .then_with(|| tertiaries(self).cmp(&tertiaries(other)))
    }
}

impl PartialOrd for CollationKeySequence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CollationKeySequence {
    /// `[PPPP.SS.TT][...]`, как в отладочном дампе.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.items {
            write!(f, "[{:04X}.{:02X}.{:02X}]", e.primary, e.secondary, e.tertiary)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CollationElement = CollationElement::new(0x1FA2, 0x20, 0x02);
    const ACUTE: CollationElement = CollationElement::new(0, 0x22, 0x02);

    #[test]
    fn consecutive_ignorables_collapse() {
        let ign = CollationElement::IGNORABLE;
        let k = CollationKeySequence::new(vec![A, ign, ign, A, ign]);
        assert_eq!(k.len(), 4);
        assert_eq!(k.items()[1], ign);
        assert_eq!(k.items()[3], ign);
    }

    #[test]
    fn masking_drops_lower_levels() {
        assert!(ACUTE.masked(Strength::Primary).is_ignorable());
        assert_eq!(ACUTE.masked(Strength::Secondary).secondary, 0x22);
        assert_eq!(A.masked(Strength::Secondary).tertiary, 0);
    }

    #[test]
    fn primaries_decide_before_secondaries() {
        let b = CollationElement::new(0x1FA3, 0x20, 0x02);
        let left = CollationKeySequence::new(vec![A, CollationElement::new(0, 0x30, 2)]);
        let right = CollationKeySequence::new(vec![b]);
        assert_eq!(left.cmp(&right), Ordering::Less);
        assert_eq!(
            CollationKeySequence::new(vec![A]).to_string(),
            "[1FA2.20.02]"
        );
    }
}
