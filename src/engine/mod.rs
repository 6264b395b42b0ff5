pub mod matcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colfold_table::resbundle::read_bundle;
use colfold_table::table::locale_bundle_path;
use colfold_table::{FoldingTable, Normalization, Strength, UnicodeData};

use crate::config::FoldConfig;
use crate::error::FoldError;
use matcher::Matcher;

/// Whether the UTF-16 result got its NUL terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStatus {
    Terminated,
    /// Output filled the destination exactly; no room for the terminator.
    NotTerminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldOutcome {
    /// Code units written, terminator excluded.
    pub len: usize,
    pub status: FoldStatus,
}

impl FoldOutcome {
    /// Buffer size that holds the result plus terminator.
    pub fn needed(&self) -> usize {
        self.len + 1
    }
}

/// An opened (locale, strength) folding instance.
///
/// The table is an immutable snapshot, so `fold` can be called from many
/// threads at once.
#[derive(Clone)]
pub struct CollationFolding {
    locale: String,
    strength: Strength,
    table: Arc<FoldingTable>,
    matcher: Matcher,
}

impl std::fmt::Debug for CollationFolding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollationFolding")
            .field("locale", &self.locale)
            .field("strength", &self.strength)
            .field("entries", &self.table.len())
            .finish()
    }
}

/// `""`, `"root"`, `"de-DE"`, `"de_DE-u-co-search"` -> `root`, `de_DE`.
pub fn normalize_locale(locale: &str) -> String {
    let base = locale
        .split("-u-")
        .next()
        .unwrap_or("")
        .split('@')
        .next()
        .unwrap_or("")
        .trim();
    if base.is_empty() || base.eq_ignore_ascii_case("root") {
        return "root".to_string();
    }
    base.replace('-', "_")
}

impl CollationFolding {
    /// Opens using `FoldConfig::from_env()`.
    pub fn open(locale: &str, strength: Strength) -> Result<Self, FoldError> {
        Self::open_with(&FoldConfig::from_env(), locale, strength)
    }

    pub fn open_with(cfg: &FoldConfig, locale: &str, strength: Strength) -> Result<Self, FoldError> {
        let locale = normalize_locale(locale);
        let table = match load_table(Path::new(&cfg.data_dir), &locale, strength) {
            Ok(t) => t,
            Err(FoldError::Unsupported(s)) => {
                tracing::warn!(locale = %locale, strength = %s, "no folding data for strength, identity only");
                FoldingTable::empty(&locale, strength)
            }
            Err(e) => return Err(e),
        };
        tracing::info!(locale = %locale, strength = %strength, entries = table.len(), "collation folding opened");
        Ok(Self::from_table(cfg, table))
    }

    pub fn from_table(cfg: &FoldConfig, table: FoldingTable) -> Self {
        let norm: Arc<dyn Normalization> = Arc::new(UnicodeData);
        Self {
            locale: table.locale().to_string(),
            strength: table.strength(),
            table: Arc::new(table),
            matcher: Matcher::new(cfg.max_key_len, cfg.max_lookahead, norm),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn table(&self) -> &FoldingTable {
        &self.table
    }

    pub fn fold(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        self.matcher.fold_into(&self.table, text, &mut out);
        out
    }

    /// UTF-16 buffer form.
    ///
    /// `source_len == -1` reads up to the first NUL. On success the result
    /// is NUL-terminated when it fits with room to spare, otherwise the
    /// status is `NotTerminated`. When the result does not fit at all,
    /// nothing is written and `BufferOverflow` carries the size to retry
    /// with. Unpaired surrogates are copied through unchanged.
    pub fn fold_utf16(
        &self,
        source: Option<&[u16]>,
        source_len: i32,
        destination: Option<&mut [u16]>,
        capacity: i32,
    ) -> Result<FoldOutcome, FoldError> {
        if source_len < -1 {
            return Err(FoldError::IllegalArgument("source length below -1"));
        }
        if source.is_none() && source_len != 0 {
            return Err(FoldError::IllegalArgument("null source with nonzero length"));
        }
        if capacity < 0 {
            return Err(FoldError::IllegalArgument("negative destination capacity"));
        }
        if destination.is_none() && capacity != 0 {
            return Err(FoldError::IllegalArgument("null destination with nonzero capacity"));
        }
        let capacity = capacity as usize;
        if let Some(d) = destination.as_deref() {
            if capacity > d.len() {
                return Err(FoldError::IllegalArgument("capacity exceeds destination length"));
            }
        }

        let units: &[u16] = match (source, source_len) {
            (None, _) => &[],
            (Some(s), -1) => {
                let end = s.iter().position(|&u| u == 0).unwrap_or(s.len());
                &s[..end]
            }
            (Some(s), n) => {
                let n = n as usize;
                if n > s.len() {
                    return Err(FoldError::IllegalArgument("source length exceeds source buffer"));
                }
                &s[..n]
            }
        };

        let folded = self.fold_units(units);
        let len = folded.len();
        if len > capacity {
            return Err(FoldError::BufferOverflow { needed: len + 1 });
        }

        let status = if len == capacity {
            FoldStatus::NotTerminated
        } else {
            FoldStatus::Terminated
        };
        if let Some(d) = destination {
            d[..len].copy_from_slice(&folded);
            if status == FoldStatus::Terminated {
                d[len] = 0;
            }
        }
        Ok(FoldOutcome { len, status })
    }

    fn fold_units(&self, units: &[u16]) -> Vec<u16> {
        let mut out: Vec<u16> = Vec::with_capacity(units.len());
        let mut run = String::new();
        let mut buf = String::new();

        for item in char::decode_utf16(units.iter().copied()) {
            match item {
                Ok(ch) => run.push(ch),
                Err(e) => {
                    // a lone surrogate splits matching
                    self.flush_run(&mut run, &mut buf, &mut out);
                    out.push(e.unpaired_surrogate());
                }
            }
        }
        self.flush_run(&mut run, &mut buf, &mut out);
        out
    }

    fn flush_run(&self, run: &mut String, buf: &mut String, out: &mut Vec<u16>) {
        if run.is_empty() {
            return;
        }
        buf.clear();
        self.matcher.fold_into(&self.table, run, buf);
        out.extend(buf.encode_utf16());
        run.clear();
    }
}

fn load_table(data_dir: &Path, locale: &str, strength: Strength) -> Result<FoldingTable, FoldError> {
    if !strength.is_generated() {
        return Err(FoldError::Unsupported(strength));
    }
    let root_path = data_dir.join("root.txt");
    if !root_path.is_file() {
        return Err(FoldError::ResourceMissing(root_path));
    }

    let read = |p: &PathBuf| {
        read_bundle(p)
            .map(|(_, r)| r)
            .map_err(|e| FoldError::Load {
                path: p.clone(),
                message: format!("{e:#}"),
            })
    };

    let root = read(&root_path)?;
    let overlay = match locale_bundle_path(data_dir, locale) {
        Some(p) if p != root_path => Some(read(&p)?),
        _ => None,
    };

    FoldingTable::from_bundles(locale, strength, &root, overlay.as_ref())
        .map_err(|e| FoldError::Internal(format!("{e:#}")))
}
