// crates/colfold_table/src/key.rs
use anyhow::{Result, anyhow, bail};

/// Ключ таблицы: кодовые точки в hex (минимум 4 цифры, верхний регистр)
/// через один пробел, например `0041 0301` или `1F600`.
pub fn encode_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 5);
    for (i, ch) in text.chars().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:04X}", ch as u32));
    }
    out
}

/// Обратное преобразование. Суррогаты и значения вне диапазона отвергаются.
pub fn decode_key(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        bail!("empty folding key");
    }
    let mut out = String::new();
    for part in key.split(' ') {
        if part.is_empty() || part.len() > 6 {
            bail!("bad code point '{part}' in key '{key}'");
        }
        let cp = u32::from_str_radix(part, 16)
            .map_err(|e| anyhow!("bad code point '{part}' in key '{key}': {e}"))?;
        let ch = char::from_u32(cp).ok_or_else(|| anyhow!("U+{cp:04X} is not a scalar value"))?;
        out.push(ch);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_four_digits() {
        assert_eq!(encode_key("A\u{301}"), "0041 0301");
        assert_eq!(encode_key("\u{1F600}"), "1F600");
        assert_eq!(encode_key("\u{10FFFF}"), "10FFFF");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode_key("00E4").unwrap(), "ä");
        assert!(decode_key("D800").is_err());
        assert!(decode_key("0041  0301").is_err());
        assert!(decode_key("XYZ").is_err());
        assert!(decode_key("").is_err());
    }
}
