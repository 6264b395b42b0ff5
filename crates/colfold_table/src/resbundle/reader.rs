// crates/colfold_table/src/resbundle/reader.rs
use anyhow::{Context, Result, anyhow, bail};
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Узел ресурсного файла.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Table(BTreeMap<String, Resource>),
    String(String),
}

impl Resource {
    pub fn as_table(&self) -> Option<&BTreeMap<String, Resource>> {
        match self {
            Resource::Table(t) => Some(t),
            Resource::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Resource::String(s) => Some(s),
            Resource::Table(_) => None,
        }
    }
}

/// Поиск по пути без состояния: `lookup(&bundle, &["primary", "00E4"])`.
pub fn lookup<'a>(res: &'a Resource, path: &[&str]) -> Option<&'a Resource> {
    path.iter()
        .try_fold(res, |cur, name| cur.as_table().and_then(|t| t.get(*name)))
}

/// Читает файл через mmap; возвращает имя корневой таблицы и её содержимое.
pub fn read_bundle(path: &Path) -> Result<(String, Resource)> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let len = f.metadata()?.len();
    if len == 0 {
        bail!("{} is empty", path.display());
    }
    // SAFETY: файл открыт только на чтение и не меняется, пока жив mmap
    let m = unsafe { Mmap::map(&f)? };
    let text = std::str::from_utf8(&m).with_context(|| format!("{} is not UTF-8", path.display()))?;
    parse_bundle(text).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_bundle(text: &str) -> Result<(String, Resource)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut p = Parser {
        chars: text.chars().collect(),
        pos: 0,
    };
    let (name, res) = p.resource()?;
    p.skip_trivia()?;
    if p.pos < p.chars.len() {
        bail!("trailing data at offset {}", p.pos);
    }
    Ok((name, res))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('/') if self.chars.get(self.pos + 1) == Some(&'/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => {
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => bail!("unterminated comment"),
                            Some('*') if self.chars.get(self.pos + 1) == Some(&'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_trivia()?;
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => bail!("expected '{want}' at offset {}, found '{c}'", self.pos),
            None => bail!("expected '{want}', found end of input"),
        }
    }

    fn name(&mut self) -> Result<String> {
        self.skip_trivia()?;
        let start = self.pos;
        // имя читается до `{`: ключи вида `0041 030A` содержат пробелы
        while let Some(c) = self.peek() {
            if c == '{' || c == '}' || c == '"' {
                break;
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let raw = raw.trim_end();
        if raw.is_empty() {
            bail!("expected resource name at offset {}", start);
        }
        // `name:table`: тип игнорируется
        Ok(raw.split(':').next().unwrap_or("").to_string())
    }

    fn resource(&mut self) -> Result<(String, Resource)> {
        let name = self.name()?;
        self.expect('{')?;
        self.skip_trivia()?;

        if self.peek() == Some('"') {
            let s = self.string()?;
            self.expect('}')?;
            return Ok((name, Resource::String(s)));
        }

        let mut table = BTreeMap::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                None => bail!("unterminated table '{name}'"),
                Some(_) => {
                    let (k, v) = self.resource()?;
                    table.insert(k, v);
                }
            }
        }
        Ok((name, Resource::Table(table)))
    }

    fn string(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let c = self.peek().ok_or_else(|| anyhow!("unterminated string"))?;
            self.pos += 1;
            match c {
                '"' => break,
                '\\' => {
                    let e = self.peek().ok_or_else(|| anyhow!("dangling escape"))?;
                    self.pos += 1;
                    match e {
                        'u' => out.push(self.hex_escape(4)?),
                        'U' => out.push(self.hex_escape(8)?),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        other => out.push(other),
                    }
                }
                c => out.push(c),
            }
        }
        Ok(out)
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char> {
        if self.pos + digits > self.chars.len() {
            bail!("short \\u escape at offset {}", self.pos);
        }
        let hex: String = self.chars[self.pos..self.pos + digits].iter().collect();
        self.pos += digits;
        let cp = u32::from_str_radix(&hex, 16).map_err(|e| anyhow!("bad escape '{hex}': {e}"))?;
        char::from_u32(cp).ok_or_else(|| anyhow!("escape U+{cp:04X} is not a scalar value"))
    }
}
