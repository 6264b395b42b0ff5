// crates/colfold_table/src/build/selector.rs
use icu_properties::props::GeneralCategory;
use icu_properties::CodePointMapData;
use std::cmp::Ordering;

/// Класс регистра строки; меньшее значение предпочтительнее.
///
/// Класса «невалидная строка» нет: `String` не может содержать
/// непарный суррогат.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CaseClass {
    AllLowercase,
    SomeLowercase,
    MixedCase,
    SomeUppercase,
    AllUppercase,
}

pub fn case_class(s: &str) -> CaseClass {
    let gc = CodePointMapData::<GeneralCategory>::new();
    let mut size = 0usize;
    let mut lower = 0usize;
    let mut upper = 0usize;
    for ch in s.chars() {
        size += 1;
        match gc.get(ch) {
            GeneralCategory::LowercaseLetter => lower += 1,
            GeneralCategory::UppercaseLetter | GeneralCategory::TitlecaseLetter => upper += 1,
            _ => {}
        }
    }

    // пустая строка считается строчной
    if lower == size {
        CaseClass::AllLowercase
    } else if upper == size {
        CaseClass::AllUppercase
    } else if lower > 0 && upper == 0 {
        CaseClass::SomeLowercase
    } else if lower == 0 && upper < size {
        CaseClass::SomeUppercase
    } else {
        CaseClass::MixedCase
    }
}

pub fn has_cjk_compatibility(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c as u32, 0xF900..=0xFAFF | 0x2F800..=0x2FA1F))
}

/// Порядок предпочтения канонического представителя:
/// `Less` означает, что `a` лучше `b`.
pub fn compare(a: &str, b: &str) -> Ordering {
    // 1) больше кодовых точек лучше
    let (la, lb) = (a.chars().count(), b.chars().count());
    if la != lb {
        return lb.cmp(&la);
    }
    // 2) регистр
    let (ca, cb) = (case_class(a), case_class(b));
    if ca != cb {
        return ca.cmp(&cb);
    }
    // 3) без CJK compatibility
    let (ja, jb) = (has_cjk_compatibility(a), has_cjk_compatibility(b));
    if ja != jb {
        return ja.cmp(&jb);
    }
    // 4) лексикографически по кодовым точкам
    a.chars().cmp(b.chars())
}

pub fn select_canonical(members: &[String]) -> Option<&str> {
    members
        .iter()
        .min_by(|a, b| compare(a, b))
        .map(|s| s.as_str())
}
