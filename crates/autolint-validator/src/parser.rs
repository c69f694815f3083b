//! PHP class/interface/trait/enum extraction without a full parse.
//!
//! The approach follows Composer's `PhpFileParser`, with the regex
//! preprocessing replaced by an explicit state machine:
//! 1. Reduce the file to PHP code: drop inline regions outside `<?php ... ?>`,
//!    drop comments, replace string literals and heredoc/nowdoc bodies with
//!    `null`
//! 2. Quick check for a `class|interface|trait|enum` keyword
//! 3. Walk the remaining words, tracking `namespace` declarations and
//!    emitting declared names in file order

use memchr::memmem;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for quick keyword check (compiled once)
static QUICK_CHECK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:class|interface|trait|enum)\s").unwrap());

/// PHP definition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// Class definition.
    Class,
    /// Interface definition.
    Interface,
    /// Trait definition.
    Trait,
    /// Enum definition (PHP 8.1+, Hack).
    Enum,
}

impl DefinitionKind {
    /// Get string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::Enum => "enum",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        [Self::Class, Self::Interface, Self::Trait, Self::Enum]
            .into_iter()
            .find(|kind| word.eq_ignore_ascii_case(kind.as_str()))
    }
}

/// A declaration found in a PHP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpDefinition {
    /// The fully qualified name, without leading separator.
    pub fqcn: String,
    /// Definition type.
    pub kind: DefinitionKind,
}

/// Stateless PHP declaration scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpFileParser;

impl PhpFileParser {
    /// Find all declared class-like names in PHP source, in file order.
    #[must_use]
    pub fn find_classes(content: &str) -> Vec<String> {
        Self::find_definitions(content)
            .into_iter()
            .map(|d| d.fqcn)
            .collect()
    }

    /// Find all declarations in PHP source, in file order.
    #[must_use]
    pub fn find_definitions(content: &str) -> Vec<PhpDefinition> {
        let Some(cleaned) = Self::strip(content) else {
            return Vec::new();
        };

        if !QUICK_CHECK.is_match(&cleaned) {
            return Vec::new();
        }

        extract(&cleaned)
    }

    /// Reduce PHP source to code only.
    ///
    /// Returns `None` when the content has no PHP open tag at all.
    #[must_use]
    pub fn strip(content: &str) -> Option<String> {
        let bytes = content.as_bytes();
        let len = bytes.len();
        let first_open = memmem::find(bytes, b"<?")?;

        let mut out = Vec::with_capacity(len);
        let mut i = first_open;
        let mut in_php = false;

        while i < len {
            if !in_php {
                let Some(pos) = memmem::find(&bytes[i..], b"<?") else {
                    break;
                };
                i += pos + 2;
                i += open_tag_suffix_len(&bytes[i..]);
                out.push(b' ');
                in_php = true;
                continue;
            }

            let c = bytes[i];
            let next = bytes.get(i + 1).copied();

            match (c, next) {
                (b'?', Some(b'>')) => {
                    in_php = false;
                    i += 2;
                    out.push(b' ');
                }
                (b'/', Some(b'/')) => i = skip_line_comment(bytes, i + 2),
                (b'#', next) if next != Some(b'[') => i = skip_line_comment(bytes, i + 1),
                (b'/', Some(b'*')) => {
                    i = memmem::find(&bytes[i + 2..], b"*/").map_or(len, |pos| i + 2 + pos + 2);
                    out.push(b' ');
                }
                (b'\'' | b'"' | b'`', _) => {
                    i = skip_quoted(bytes, i);
                    out.extend_from_slice(b"null");
                }
                (b'<', Some(b'<')) if bytes.get(i + 2) == Some(&b'<') => {
                    if let Some(end) = heredoc_end(bytes, i) {
                        i = end;
                        out.extend_from_slice(b"null");
                    } else {
                        out.push(c);
                        i += 1;
                    }
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        // Only ASCII delimiters are removed, so multi-byte sequences stay intact.
        Some(
            String::from_utf8(out)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        )
    }
}

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x7f
}

const fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x7f
}

const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Length of `php`, `hh` or `=` following `<?`.
fn open_tag_suffix_len(rest: &[u8]) -> usize {
    if rest.len() >= 3 && rest[..3].eq_ignore_ascii_case(b"php") {
        3
    } else if rest.len() >= 2 && rest[..2].eq_ignore_ascii_case(b"hh") {
        2
    } else if rest.first() == Some(&b'=') {
        1
    } else {
        0
    }
}

/// Index of the newline or `?>` that ends a single-line comment.
fn skip_line_comment(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\n' | b'\r' => return i,
            b'?' if bytes.get(i + 1) == Some(&b'>') => return i,
            _ => i += 1,
        }
    }
    i
}

/// Index just past the closing quote of the literal opened at `start`.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index just past the closing identifier of the heredoc/nowdoc opened at
/// `start`, or `None` when `<<<` does not open one.
fn heredoc_end(bytes: &[u8], start: usize) -> Option<usize> {
    let len = bytes.len();
    let mut i = start + 3;
    while i < len && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }

    let quote = match bytes.get(i) {
        Some(&q @ (b'\'' | b'"')) => {
            i += 1;
            Some(q)
        }
        _ => None,
    };

    let ident_start = i;
    if !bytes.get(i).is_some_and(|&b| is_ident_start(b)) {
        return None;
    }
    while i < len && is_ident(bytes[i]) {
        i += 1;
    }
    let ident = &bytes[ident_start..i];

    if let Some(q) = quote {
        if bytes.get(i) != Some(&q) {
            return None;
        }
        i += 1;
    }

    match bytes.get(i) {
        Some(b'\r') if bytes.get(i + 1) == Some(&b'\n') => i += 2,
        Some(b'\n' | b'\r') => i += 1,
        _ => return None,
    }

    // The closing identifier may be indented (PHP 7.3+).
    let mut line = i;
    while line < len {
        let mut p = line;
        while p < len && matches!(bytes[p], b' ' | b'\t') {
            p += 1;
        }
        if bytes[p..].starts_with(ident)
            && !bytes.get(p + ident.len()).is_some_and(|&b| is_ident(b))
        {
            return Some(p + ident.len());
        }
        line = match memchr::memchr(b'\n', &bytes[line..]) {
            Some(pos) => line + pos + 1,
            None => len,
        };
    }
    Some(len)
}

fn extract(cleaned: &str) -> Vec<PhpDefinition> {
    let bytes = cleaned.as_bytes();
    let len = bytes.len();
    let mut definitions = Vec::new();
    let mut namespace = String::new();
    let mut i = 0;

    while i < len {
        if !is_ident_start(bytes[i]) || (i > 0 && is_ident(bytes[i - 1])) {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        while end < len && is_ident(bytes[end]) {
            end += 1;
        }
        let word = &cleaned[start..end];

        // `$class`, `Foo::class`, `$this->class`
        if start > 0 && matches!(bytes[start - 1], b'$' | b':' | b'>') {
            i = end;
            continue;
        }

        if let Some(kind) = DefinitionKind::from_keyword(word) {
            i = match declared_name(cleaned, end) {
                Some((name, name_end)) => {
                    if let Some(name) = normalize_name(name, kind) {
                        let fqcn = format!("{namespace}{name}");
                        definitions.push(PhpDefinition {
                            fqcn: fqcn.trim_start_matches('\\').to_string(),
                            kind,
                        });
                    }
                    name_end
                }
                None => end,
            };
        } else if word.eq_ignore_ascii_case("namespace") {
            i = match namespace_declaration(cleaned, end) {
                Some((name, decl_end)) => {
                    namespace = name;
                    namespace.push('\\');
                    decl_end
                }
                None => end,
            };
        } else {
            i = end;
        }
    }

    definitions
}

/// Name following a type keyword: mandatory whitespace, then an identifier
/// that may contain `:` and `-` (XHP, Hack enums).
fn declared_name(cleaned: &str, keyword_end: usize) -> Option<(&str, usize)> {
    let bytes = cleaned.as_bytes();
    let mut i = keyword_end;
    if !bytes.get(i).is_some_and(|&b| is_space(b)) {
        return None;
    }
    while i < bytes.len() && is_space(bytes[i]) {
        i += 1;
    }

    let name_start = i;
    if !bytes.get(i).is_some_and(|&b| is_ident_start(b) || b == b':') {
        return None;
    }
    while i < bytes.len() && (is_ident(bytes[i]) || matches!(bytes[i], b':' | b'-')) {
        i += 1;
    }
    Some((&cleaned[name_start..i], i))
}

fn normalize_name(name: &str, kind: DefinitionKind) -> Option<String> {
    // Anonymous classes: `new class extends Foo`, `new class implements Bar`
    if name == "extends" || name == "implements" {
        return None;
    }

    if name.starts_with(':') {
        // XHP element class, `:foo:bar-baz` becomes `xhp_foo__bar_baz`
        let mangled = name.replace('-', "_").replace(':', "__");
        return Some(format!("xhp{}", &mangled[1..]));
    }

    if kind == DefinitionKind::Enum {
        // `enum Foo: int` and `enum Foo:int` capture the colon and backing type
        if let Some(colon) = name.rfind(':') {
            return Some(name[..colon].to_string());
        }
    }

    Some(name.to_string())
}

/// Parse `namespace Foo\Bar;`, `namespace Foo\Bar {` or `namespace {` after
/// the keyword. Returns the name with whitespace removed.
fn namespace_declaration(cleaned: &str, keyword_end: usize) -> Option<(String, usize)> {
    let bytes = cleaned.as_bytes();
    let len = bytes.len();
    let mut name = String::new();
    let mut i = keyword_end;

    let mut j = i;
    while j < len && is_space(bytes[j]) {
        j += 1;
    }
    if j > i && bytes.get(j).is_some_and(|&b| is_ident_start(b)) {
        let (segment, segment_end) = identifier(cleaned, j);
        name.push_str(segment);
        i = segment_end;

        loop {
            let mut k = i;
            while k < len && is_space(bytes[k]) {
                k += 1;
            }
            if bytes.get(k) != Some(&b'\\') {
                break;
            }
            k += 1;
            while k < len && is_space(bytes[k]) {
                k += 1;
            }
            if !bytes.get(k).is_some_and(|&b| is_ident_start(b)) {
                break;
            }
            let (segment, segment_end) = identifier(cleaned, k);
            name.push('\\');
            name.push_str(segment);
            i = segment_end;
        }
    }

    while i < len && is_space(bytes[i]) {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'{' | b';') => Some((name, i + 1)),
        _ => None,
    }
}

fn identifier(cleaned: &str, start: usize) -> (&str, usize) {
    let bytes = cleaned.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_ident(bytes[end]) {
        end += 1;
    }
    (&cleaned[start..end], end)
}
