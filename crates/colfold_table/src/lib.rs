pub mod build;
pub mod element;
pub mod generate;
pub mod key;
pub mod resbundle;
pub mod source;
pub mod strength;
pub mod table;

pub use build::{BuildOptions, FoldingMap, build_folding_map};
pub use element::{CollationElement, CollationKeySequence};
pub use key::{decode_key, encode_key};
pub use source::{CollationElementSource, Normalization, RuleCatalog, RuleSource, UnicodeData};
pub use strength::Strength;
pub use table::FoldingTable;
