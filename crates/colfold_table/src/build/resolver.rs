// crates/colfold_table/src/build/resolver.rs
use std::collections::HashMap;

use crate::element::CollationKeySequence;

/// Составные представители класса.
///
/// Ищет все разбиения ключа на непрерывные отрезки (каждый короче ключа),
/// у которых уже есть канонический представитель, и возвращает их
/// конкатенации. `memo[i]`: варианты для суффикса `key[i..]`.
/// Количество результатов на каждый суффикс ограничено `limit`.
pub fn composites(
    key: &CollationKeySequence,
    canonical: &HashMap<CollationKeySequence, String>,
    limit: usize,
) -> Vec<String> {
    let n = key.len();
    if n < 2 || limit == 0 {
        return Vec::new();
    }

    let mut memo: Vec<Vec<String>> = vec![Vec::new(); n + 1];
    memo[n].push(String::new());

    for i in (0..n).rev() {
        let mut found: Vec<String> = Vec::new();
        for j in (i + 1)..=n {
            if i == 0 && j == n {
                continue;
            }
            if memo[j].is_empty() {
                continue;
            }
            let Some(head) = canonical.get(&key.run(i, j)) else {
                continue;
            };
            for tail in &memo[j] {
                if found.len() >= limit {
                    break;
                }
                let s = format!("{head}{tail}");
                if !found.contains(&s) {
                    found.push(s);
                }
            }
        }
        memo[i] = found;
    }

    std::mem::take(&mut memo[0])
}
