// crates/colfold_table/src/resbundle/mod.rs
//
// Текстовый формат таблиц:
//
//   // Generated by gencolf. Do not edit.
//   de{
//       primary{
//           00E4{"ae"}
//       }
//   }
pub mod reader;
pub mod writer;

pub use reader::{Resource, lookup, parse_bundle, read_bundle};
pub use writer::{Section, consolidate, render, write_locale};
