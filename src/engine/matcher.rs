use std::sync::Arc;

use colfold_table::{FoldingTable, Normalization};

pub const CGJ: char = '\u{34F}';

/// Longest-match over NFD text with discontiguous contraction handling.
/// Holds no per-call state, so one instance serves all threads.
#[derive(Clone)]
pub struct Matcher {
    max_key_len: usize,
    max_lookahead: usize,
    norm: Arc<dyn Normalization>,
}

impl Matcher {
    pub fn new(max_key_len: usize, max_lookahead: usize, norm: Arc<dyn Normalization>) -> Self {
        Self {
            max_key_len: max_key_len.max(1),
            max_lookahead,
            norm,
        }
    }

    /// Appends the folded form of `text` to `out`.
    pub fn fold_into(&self, table: &FoldingTable, text: &str, out: &mut String) {
        if text.is_empty() {
            return;
        }
        let mut chars: Vec<char> = self.norm.nfd(text).chars().collect();
        let cap = self.max_key_len.min(table.max_key_len().max(1));
        let mut i = 0;

        while i < chars.len() {
            let len = self.best_match(table, &mut chars, i, cap);
            let seg = &chars[i..i + len];
            match table.get(seg) {
                Some(value) => emit(out, value.chars()),
                None => emit(out, seg.iter().copied()),
            }
            i += len;
        }
    }

    /// Picks the key starting at `start` and moves any spliced non-starters
    /// right behind it. Every contiguous key (a lone code point always
    /// counts) is tried with splicing; the longest total wins, and on a tie
    /// the one that pulled in more marks.
    fn best_match(&self, table: &FoldingTable, chars: &mut [char], start: usize, cap: usize) -> usize {
        let window = cap.min(chars.len() - start);
        let limit = chars.len().min(start + cap + self.max_lookahead);

        let mut best: Option<(usize, usize, Option<Vec<char>>)> = None;
        for prefix in (1..=window).rev() {
            if prefix > 1 && !table.contains(&chars[start..start + prefix]) {
                continue;
            }
            let followed_by_mark = prefix < cap
                && chars
                    .get(start + prefix)
                    .is_some_and(|&c| self.norm.combining_class(c) != 0);
            let (total, trial) = if followed_by_mark {
                let mut trial = chars[start..limit].to_vec();
                let total = self.splice(table, &mut trial, prefix, cap);
                (total, Some(trial))
            } else {
                (prefix, None)
            };
            let better = match &best {
                None => true,
                Some((t, s, _)) => (total, total - prefix) > (*t, *s),
            };
            if better {
                best = Some((total, total - prefix, trial));
            }
        }

        match best {
            Some((total, spliced, trial)) => {
                if let (true, Some(trial)) = (spliced > 0, trial) {
                    chars[start..limit].copy_from_slice(&trial);
                }
                total
            }
            None => 1,
        }
    }

    /// Extends `chars[..len]` with unblocked non-starters while that forms
    /// a key no longer than `cap`. The mark right after the initial match is
    /// skipped: whatever key it forms is itself a contiguous match.
    fn splice(&self, table: &FoldingTable, chars: &mut [char], mut len: usize, cap: usize) -> usize {
        let initial = len;
        let mut budget = self.max_lookahead;
        let mut probe: Vec<char> = Vec::with_capacity(cap);

        'outer: while budget > 0 && len < cap {
            let end = len;
            let limit = chars.len().min(end + self.max_lookahead);
            let mut max_ccc = 0u8;

            for j in end..limit {
                let ccc = self.norm.combining_class(chars[j]);
                if ccc == 0 {
                    break;
                }
                let adjacent = j == end;
                let unblocked = adjacent || max_ccc < ccc;
                if unblocked && !(adjacent && len == initial) {
                    probe.clear();
                    probe.extend_from_slice(&chars[..end]);
                    probe.push(chars[j]);
                    if table.contains(&probe) {
                        // move chars[j] right behind the match
                        chars[end..=j].rotate_right(1);
                        len += 1;
                        budget -= 1;
                        continue 'outer;
                    }
                }
                max_ccc = max_ccc.max(ccc);
            }
            break;
        }
        len
    }
}

fn emit(out: &mut String, value: impl Iterator<Item = char>) {
    for ch in value {
        if ch == CGJ && out.ends_with(CGJ) {
            continue;
        }
        out.push(ch);
    }
}
