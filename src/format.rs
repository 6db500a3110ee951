//! Compiler for SWIFT's field-format mini-language.
//!
//! A format spec like `3!a15d` or `4*35x` is compiled once into an immutable
//! [`FormatMatcher`] which consumes a field value left to right. Digits give a
//! maximum length, a `!` prefix makes the length exact, the trailing letter
//! selects a charset class, `count*len` bounds a multi-line value, `/` is a
//! literal separator and `[...]` marks an optional group.
//!
//! Compilation failures are fatal at schema-load time only; a compiled
//! matcher never fails, it just reports whether a value conforms.

use crate::error::FormatSpecError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Character classes of the SWIFT format language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// `n` — digits only
    Numeric,
    /// `a` — uppercase letters
    Alpha,
    /// `c` — uppercase letters and digits
    AlphaNum,
    /// `x` — the SWIFT default charset
    Swift,
    /// `d` — digits with at most one comma as the fractional separator
    Decimal,
}

impl Charset {
    fn from_letter(letter: char) -> Result<Self, FormatSpecError> {
        match letter {
            'n' => Ok(Charset::Numeric),
            'a' => Ok(Charset::Alpha),
            'c' => Ok(Charset::AlphaNum),
            'x' => Ok(Charset::Swift),
            'd' => Ok(Charset::Decimal),
            other => Err(FormatSpecError::UnknownCharset(other)),
        }
    }

    pub fn accepts(self, c: char) -> bool {
        match self {
            Charset::Numeric => c.is_ascii_digit(),
            Charset::Alpha => c.is_ascii_uppercase(),
            Charset::AlphaNum => c.is_ascii_uppercase() || c.is_ascii_digit(),
            Charset::Swift => {
                c.is_ascii_alphanumeric()
                    || matches!(c, '/' | '-' | '?' | ':' | '(' | ')' | '.' | ',' | '\'' | '+' | ' ')
            }
            Charset::Decimal => c.is_ascii_digit() || c == ',',
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Charset::Numeric => "numeric",
            Charset::Alpha => "alphabetic",
            Charset::AlphaNum => "alphanumeric",
            Charset::Swift => "SWIFT-charset",
            Charset::Decimal => "decimal",
        }
    }
}

/// One length-bounded run of characters from a single charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub len: usize,
    pub exact: bool,
    pub charset: Charset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Seg(Segment),
    /// Literal `/` separating independently validated segments.
    Slash,
    Optional(Vec<Token>),
}

/// Compiled, executable form of a format spec. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatMatcher {
    SingleLine {
        spec: String,
        tokens: Vec<Token>,
    },
    MultiLine {
        spec: String,
        /// Optional leading line, e.g. the `[/34x]` account line of field 59.
        first: Option<Vec<Token>>,
        max_lines: usize,
        line: Segment,
    },
}

impl FormatMatcher {
    pub fn compile(spec: &str) -> Result<Self, FormatSpecError> {
        let chars: Vec<char> = spec.chars().collect();
        if chars.is_empty() {
            return Err(FormatSpecError::Empty);
        }

        let mut parser = Parser { chars: &chars, pos: 0 };
        let (tokens, multi) = parser.tokens(false)?;

        match multi {
            Some((max_lines, line)) => Ok(FormatMatcher::MultiLine {
                spec: spec.to_string(),
                first: if tokens.is_empty() { None } else { Some(tokens) },
                max_lines,
                line,
            }),
            None => Ok(FormatMatcher::SingleLine {
                spec: spec.to_string(),
                tokens,
            }),
        }
    }

    pub fn spec(&self) -> &str {
        match self {
            FormatMatcher::SingleLine { spec, .. } => spec,
            FormatMatcher::MultiLine { spec, .. } => spec,
        }
    }

    /// Check a field value against this matcher. `Err` carries a
    /// human-readable expectation for the report, never a process error.
    pub fn matches(&self, value: &str) -> Result<(), String> {
        match self {
            FormatMatcher::SingleLine { tokens, .. } => {
                // Continuation lines of a single-line field are joined with a
                // single space before matching.
                let joined = value.replace('\n', " ");
                match_line(tokens, &joined)
            }
            FormatMatcher::MultiLine {
                first,
                max_lines,
                line,
                ..
            } => {
                let lines: Vec<&str> = value.split('\n').collect();
                let mut body_start = 0;

                if let Some(first_tokens) = first {
                    if match_line(first_tokens, lines[0]).is_ok() {
                        body_start = 1;
                    } else if !all_optional(first_tokens) {
                        return Err(format!(
                            "first line does not match leading format of {}",
                            self.spec()
                        ));
                    }
                }

                let body = &lines[body_start..];
                if body.len() > *max_lines {
                    return Err(format!(
                        "at most {} lines allowed, found {}",
                        max_lines,
                        body.len()
                    ));
                }
                for (index, text) in body.iter().enumerate() {
                    match_segment_line(line, text)
                        .map_err(|reason| format!("line {}: {}", body_start + index + 1, reason))?;
                }
                Ok(())
            }
        }
    }
}

fn all_optional(tokens: &[Token]) -> bool {
    tokens.iter().all(|t| matches!(t, Token::Optional(_)))
}

/// Match one full line against a token list; leftover text is a failure.
fn match_line(tokens: &[Token], input: &str) -> Result<(), String> {
    let chars: Vec<char> = input.chars().collect();
    let end = match_tokens(tokens, &chars, 0)?;
    if end != chars.len() {
        return Err(format!("unexpected text after position {end}"));
    }
    Ok(())
}

fn match_tokens(tokens: &[Token], chars: &[char], mut pos: usize) -> Result<usize, String> {
    for token in tokens {
        match token {
            Token::Seg(segment) => pos = match_segment(segment, chars, pos)?,
            Token::Slash => {
                if chars.get(pos) != Some(&'/') {
                    return Err(format!("expected '/' at position {}", pos + 1));
                }
                pos += 1;
            }
            Token::Optional(inner) => {
                if let Ok(next) = match_tokens(inner, chars, pos) {
                    pos = next;
                }
            }
        }
    }
    Ok(pos)
}

/// Consume one segment starting at `pos`, with remaining-length bookkeeping
/// for concatenated formats such as `3!a15d`.
fn match_segment(segment: &Segment, chars: &[char], pos: usize) -> Result<usize, String> {
    let mut taken = 0;
    let mut commas = 0;

    while taken < segment.len {
        let Some(&c) = chars.get(pos + taken) else { break };
        if !segment.charset.accepts(c) {
            break;
        }
        if segment.charset == Charset::Decimal && c == ',' {
            commas += 1;
            // a second comma ends the decimal run
            if commas > 1 {
                break;
            }
        }
        taken += 1;
    }

    if segment.exact && taken != segment.len {
        return Err(format!(
            "expected exactly {} {} characters at position {}",
            segment.len,
            segment.charset.describe(),
            pos + 1
        ));
    }
    if taken == 0 {
        return Err(format!(
            "expected at least one {} character at position {}",
            segment.charset.describe(),
            pos + 1
        ));
    }
    Ok(pos + taken)
}

/// One line of a multi-line value: bounded length, single charset.
fn match_segment_line(segment: &Segment, line: &str) -> Result<(), String> {
    let count = line.chars().count();
    if segment.exact && count != segment.len {
        return Err(format!(
            "expected exactly {} characters, found {count}",
            segment.len
        ));
    }
    if count > segment.len {
        return Err(format!(
            "at most {} characters allowed, found {count}",
            segment.len
        ));
    }
    let mut commas = 0;
    for c in line.chars() {
        if !segment.charset.accepts(c) {
            return Err(format!(
                "'{c}' is not a {} character",
                segment.charset.describe()
            ));
        }
        if segment.charset == Charset::Decimal && c == ',' {
            commas += 1;
            if commas > 1 {
                return Err("more than one decimal comma".to_string());
            }
        }
    }
    Ok(())
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn number(&mut self) -> Result<usize, FormatSpecError> {
        let start = self.pos;
        let mut value = 0usize;
        while let Some(c) = self.peek() {
            let Some(digit) = c.to_digit(10) else { break };
            value = value * 10 + digit as usize;
            self.pos += 1;
        }
        if self.pos == start {
            match self.peek() {
                Some(c) => Err(FormatSpecError::UnexpectedChar(c, self.pos)),
                None => Err(FormatSpecError::DanglingRepeat),
            }
        } else if value == 0 {
            Err(FormatSpecError::ZeroLength(start))
        } else {
            Ok(value)
        }
    }

    /// Parse `!`-flag and charset letter after a length.
    fn segment_tail(&mut self, len: usize) -> Result<Segment, FormatSpecError> {
        let exact = if self.peek() == Some('!') {
            self.pos += 1;
            true
        } else {
            false
        };
        match self.bump() {
            Some(letter) => Ok(Segment {
                len,
                exact,
                charset: Charset::from_letter(letter)?,
            }),
            None => Err(FormatSpecError::MissingCharset),
        }
    }

    /// Parse a token run. Returns the tokens plus the multi-line bound if the
    /// spec ends in a `count*len` line format.
    #[allow(clippy::type_complexity)]
    fn tokens(
        &mut self,
        in_optional: bool,
    ) -> Result<(Vec<Token>, Option<(usize, Segment)>), FormatSpecError> {
        let mut tokens = Vec::new();

        loop {
            match self.peek() {
                None => {
                    if in_optional {
                        return Err(FormatSpecError::UnterminatedOptional);
                    }
                    return Ok((tokens, None));
                }
                Some(']') => {
                    if !in_optional {
                        return Err(FormatSpecError::UnexpectedChar(']', self.pos));
                    }
                    self.pos += 1;
                    return Ok((tokens, None));
                }
                Some('[') => {
                    self.pos += 1;
                    let (inner, multi) = self.tokens(true)?;
                    if multi.is_some() {
                        return Err(FormatSpecError::UnexpectedChar('*', self.pos));
                    }
                    tokens.push(Token::Optional(inner));
                }
                Some('/') => {
                    self.pos += 1;
                    tokens.push(Token::Slash);
                }
                Some(c) if c.is_ascii_digit() => {
                    let count = self.number()?;
                    if self.peek() == Some('*') {
                        if in_optional {
                            return Err(FormatSpecError::UnexpectedChar('*', self.pos));
                        }
                        self.pos += 1;
                        let len = self.number()?;
                        let line = self.segment_tail(len)?;
                        if self.peek().is_some() {
                            return Err(FormatSpecError::TrailingAfterMultiline);
                        }
                        return Ok((tokens, Some((count, line))));
                    }
                    tokens.push(Token::Seg(self.segment_tail(count)?));
                }
                Some(other) => return Err(FormatSpecError::UnexpectedChar(other, self.pos)),
            }
        }
    }
}

/// Read-mostly cache of compiled matchers keyed by spec string. Compilation
/// is deterministic, so a duplicate concurrent compile only wastes one
/// redundant computation.
#[derive(Debug, Default)]
pub struct MatcherCache {
    inner: Mutex<HashMap<String, Arc<FormatMatcher>>>,
}

impl MatcherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, spec: &str) -> Result<Arc<FormatMatcher>, FormatSpecError> {
        if let Some(matcher) = self
            .inner
            .lock()
            .expect("matcher cache lock poisoned")
            .get(spec)
        {
            return Ok(matcher.clone());
        }

        // Compile outside the lock; idempotent, so a racing compile is fine.
        let compiled = Arc::new(FormatMatcher::compile(spec)?);
        let mut map = self.inner.lock().expect("matcher cache lock poisoned");
        Ok(map
            .entry(spec.to_string())
            .or_insert(compiled)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_exact_and_max_lengths() {
        let matcher = FormatMatcher::compile("6!n").unwrap();
        assert!(matcher.matches("241201").is_ok());
        assert!(matcher.matches("2412").is_err());
        assert!(matcher.matches("2412010").is_err());

        let matcher = FormatMatcher::compile("16x").unwrap();
        assert!(matcher.matches("LC1").is_ok());
        assert!(matcher.matches("A234567890123456").is_ok());
        assert!(matcher.matches("A2345678901234567").is_err());
    }

    #[test]
    fn concatenated_segments_consume_left_to_right() {
        let matcher = FormatMatcher::compile("3!a15d").unwrap();
        assert!(matcher.matches("USD500000,00").is_ok());
        assert!(matcher.matches("USD").is_err()); // no amount
        assert!(matcher.matches("US500000").is_err()); // currency too short
        assert!(matcher.matches("USD500,000,00").is_err()); // two commas
    }

    #[test]
    fn slash_separated_segments() {
        let matcher = FormatMatcher::compile("2n/2n").unwrap();
        assert!(matcher.matches("10/10").is_ok());
        assert!(matcher.matches("5/5").is_ok());
        assert!(matcher.matches("100/10").is_err());
        assert!(matcher.matches("10-10").is_err());
    }

    #[test]
    fn multiline_bounds_lines_and_length() {
        let matcher = FormatMatcher::compile("4*35x").unwrap();
        assert!(matcher.matches("APPLICANT CO\nMAIN STREET 1\nLONDON").is_ok());
        assert!(matcher.matches("A\nB\nC\nD\nE").is_err()); // five lines
        let long = "X".repeat(36);
        assert!(matcher.matches(&long).is_err());
    }

    #[test]
    fn optional_leading_account_line() {
        let matcher = FormatMatcher::compile("[/34x]4*35x").unwrap();
        assert!(matcher.matches("/12345678\nBENEFICIARY CO\nPARIS").is_ok());
        assert!(matcher.matches("BENEFICIARY CO\nPARIS").is_ok());
    }

    #[test]
    fn optional_tail_segment() {
        let matcher = FormatMatcher::compile("4!a2!a2!c[3!c]").unwrap();
        assert!(matcher.matches("CITIUS33").is_ok());
        assert!(matcher.matches("CITIUS33XXX").is_ok());
        assert!(matcher.matches("CITIUS").is_err());
    }

    #[test]
    fn invalid_specs_fail_compilation() {
        assert!(FormatMatcher::compile("").is_err());
        assert!(FormatMatcher::compile("16z").is_err());
        assert!(FormatMatcher::compile("x").is_err());
        assert!(FormatMatcher::compile("0n").is_err());
        assert!(FormatMatcher::compile("[3!a").is_err());
        assert!(FormatMatcher::compile("4*35x2n").is_err());
    }

    #[test]
    fn cache_returns_equivalent_matchers() {
        let cache = MatcherCache::new();
        let a = cache.get("3!a15d").unwrap();
        let b = cache.get("3!a15d").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, FormatMatcher::compile("3!a15d").unwrap());
    }
}
