mod common;

use colfold::Strength;
use colfold_table::RuleCatalog;
use colfold_table::{BuildOptions, build_folding_map};
use pretty_assertions::assert_eq;
use unicode_normalization::UnicodeNormalization;

const LOCALES: [&str; 3] = ["root", "da", "de"];

const SAMPLES: &[&str] = &[
    "",
    "Hello",
    "Stra\u{df}e",
    "K\u{e4}se",
    "\u{c5}NGSTR\u{d6}M",
    "a\u{323}\u{30a}",
    "\u{200d}\u{200d}x",
    "x\u{301}\u{301}",
    "\u{1e69}\u{1e63}",
    "\u{4e00}\u{3042}",
];

fn maps(locale: &str, strength: Strength) -> std::collections::BTreeMap<String, String> {
    let catalog = RuleCatalog::open(&common::rules_dir()).unwrap();
    let source = catalog.source(locale).unwrap();
    let opts = BuildOptions {
        code_points: 0..=0x24FF,
        ..Default::default()
    };
    build_folding_map(&source, strength, &opts).mappings
}

#[test]
fn canonical_strings_fold_to_themselves() {
    let td = common::generate_tables();
    for locale in LOCALES {
        for strength in Strength::GENERATED {
            let f = common::open(td.path(), locale, strength);
            for canonical in maps(locale, strength).values() {
                let expect: String = canonical.nfd().collect();
                assert_eq!(f.fold(canonical), expect, "{locale}/{strength}");
            }
        }
    }
}

#[test]
fn class_members_fold_alike() {
    let td = common::generate_tables();
    for locale in LOCALES {
        for strength in Strength::GENERATED {
            let f = common::open(td.path(), locale, strength);
            for (from, to) in maps(locale, strength) {
                assert_eq!(f.fold(&from), f.fold(&to), "{locale}/{strength}: {from:?}");
            }
        }
    }
}

#[test]
fn folding_is_a_fixed_point() {
    let td = common::generate_tables();
    for locale in LOCALES {
        for strength in Strength::GENERATED {
            let f = common::open(td.path(), locale, strength);
            for s in SAMPLES {
                let once = f.fold(s);
                assert_eq!(f.fold(&once), once, "{locale}/{strength}: {s:?}");
            }
        }
    }
}

#[test]
fn tertiary_equal_implies_primary_equal() {
    let td = common::generate_tables();
    for locale in LOCALES {
        let tertiary = common::open(td.path(), locale, Strength::Tertiary);
        let primary = common::open(td.path(), locale, Strength::Primary);
        for (from, to) in maps(locale, Strength::Tertiary) {
            assert_eq!(tertiary.fold(&from), tertiary.fold(&to));
            assert_eq!(primary.fold(&from), primary.fold(&to), "{locale}: {from:?}");
        }
    }
}
