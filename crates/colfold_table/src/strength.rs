// crates/colfold_table/src/strength.rs
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Уровень сравнения коллации. `Primary` используется по умолчанию (UCOL_DEFAULT).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    #[default]
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Identical,
}

impl Strength {
    /// Уровни, для которых генерируются таблицы.
    pub const GENERATED: [Strength; 3] = [Strength::Primary, Strength::Secondary, Strength::Tertiary];

    /// Имя секции в ресурсном файле.
    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Primary => "primary",
            Strength::Secondary => "secondary",
            Strength::Tertiary => "tertiary",
            Strength::Quaternary => "quaternary",
            Strength::Identical => "identical",
        }
    }

    pub fn is_generated(self) -> bool {
        Self::GENERATED.contains(&self)
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strength {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let v = match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "1" | "default" => Strength::Primary,
            "secondary" | "2" => Strength::Secondary,
            "tertiary" | "3" => Strength::Tertiary,
            "quaternary" | "4" => Strength::Quaternary,
            "identical" | "15" => Strength::Identical,
            other => bail!("unknown strength: {other}"),
        };
        Ok(v)
    }
}
