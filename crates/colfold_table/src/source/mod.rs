// crates/colfold_table/src/source/mod.rs
pub mod rules;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

use crate::element::{CollationElement, CollationKeySequence};
use crate::strength::Strength;

pub use rules::{RuleCatalog, RuleSource};

/// Точка расширения: поток элементов коллации для одной локали.
pub trait CollationElementSource {
    fn locale(&self) -> &str;

    /// Элементы строки, уже обрезанные до нужного уровня.
    fn elements(&self, text: &str, strength: Strength) -> Vec<CollationElement>;

    /// Строки-сокращения (contractions) и префиксы, известные коллатору.
    fn contractions(&self) -> Vec<String>;

    fn key_sequence(&self, text: &str, strength: Strength) -> CollationKeySequence {
        CollationKeySequence::new(self.elements(text, strength))
    }
}

/// Точка расширения: нормализация и классы комбинирования.
pub trait Normalization: Send + Sync {
    fn combining_class(&self, ch: char) -> u8;
    fn nfd(&self, text: &str) -> String;
}

/// Нормализация по таблицам `unicode-normalization`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeData;

impl Normalization for UnicodeData {
    fn combining_class(&self, ch: char) -> u8 {
        canonical_combining_class(ch)
    }

    fn nfd(&self, text: &str) -> String {
        text.nfd().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_data_basics() {
        let n = UnicodeData;
        assert_eq!(n.nfd("\u{e5}\u{316}"), "a\u{316}\u{30a}");
        assert_eq!(n.combining_class('a'), 0);
        assert_eq!(n.combining_class('\u{30a}'), 230);
        assert_eq!(n.combining_class('\u{316}'), 220);
    }
}
