//! Source text → value sequence.
//!
//! The parser produces a flat block of values (nested blocks and parens as
//! sub-sequences) plus a parallel table of source locations, one record per
//! parsed value in parse order. It is whitespace-insensitive except where
//! whitespace terminates tokens.
//!
//! Dotted tokens are scanned as a chain of segments and classified
//! afterwards: a single numeric segment is an integer, two numeric segments
//! are a decimal, anything else with more than one segment is a path. This
//! one rule resolves `3.14` vs `a.b.c` vs `1.2.3` without backtracking.

use smallvec::SmallVec;
use std::rc::Rc;

use crate::{
    error::{Error, ErrorId},
    intern::Interns,
    types::{BinarySeries, BlockSeries, StringSeries},
    value::{PathData, PathSeg, Value},
};

/// Maximum nesting depth for blocks and parens during parsing, preventing
/// host stack overflow on pathological input before evaluation ever runs.
pub(crate) const MAX_NESTING_DEPTH: u32 = 200;

/// A 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    pub line: u32,
    pub column: u32,
}

/// Per-parse table of source locations, one entry per value in parse order.
///
/// This is the line-of-source table the error-reporting boundary consumes.
#[derive(Debug, Clone)]
pub struct SourceMap {
    file: Box<str>,
    locs: Vec<Loc>,
}

impl SourceMap {
    /// The source name given to `parse`.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Location of the nth parsed value (parse order, containers before
    /// their children).
    pub fn location(&self, value_index: usize) -> Option<Loc> {
        self.locs.get(value_index).copied()
    }

    /// Number of recorded value locations.
    pub fn len(&self) -> usize {
        self.locs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locs.is_empty()
    }
}

/// Result of parsing: the value sequence and its location table.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub(crate) block: BlockSeries,
    map: SourceMap,
}

impl Parsed {
    pub fn source_map(&self) -> &SourceMap {
        &self.map
    }

    /// Number of top-level values.
    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }
}

/// Parses `src` into a value sequence, interning word spellings into
/// `interns`. Syntax errors carry the offending source line as `near` and an
/// empty call stack.
pub(crate) fn parse(src: &str, file: &str, interns: &mut Interns) -> Result<Parsed, Error> {
    let mut parser = Parser {
        src,
        pos: 0,
        line: 1,
        col: 1,
        interns,
        locs: Vec::new(),
        depth: 0,
    };
    let values = parser.parse_sequence(None)?;
    Ok(Parsed {
        block: BlockSeries::new(values),
        map: SourceMap {
            file: file.into(),
            locs: parser.locs,
        },
    })
}

/// A raw path segment before classification.
enum RawSeg {
    Tok(String),
    Str(String),
    Paren(BlockSeries),
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    col: u32,
    interns: &'a mut Interns,
    locs: Vec<Loc>,
    depth: u32,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, byte_offset: usize) -> Option<char> {
        self.src[self.pos + byte_offset..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn err(&self, id: ErrorId, message: impl Into<String>) -> Error {
        let near = self
            .src
            .lines()
            .nth(self.line as usize - 1)
            .unwrap_or("")
            .trim()
            .to_owned();
        Error::syntax(id, message).with_near(near)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_sequence(&mut self, closer: Option<char>) -> Result<Vec<Value>, Error> {
        let mut values = Vec::new();
        loop {
            self.skip_trivia();
            let Some(c) = self.peek() else {
                return match closer {
                    Some(']') => Err(self.err(ErrorId::UnclosedBlock, "Unclosed block")),
                    Some(_) => Err(self.err(ErrorId::UnclosedBlock, "Unclosed paren")),
                    None => Ok(values),
                };
            };
            if Some(c) == closer {
                self.bump();
                return Ok(values);
            }
            if c == ']' || c == ')' {
                return Err(self.err(ErrorId::UnclosedBlock, format!("Unexpected '{c}'")));
            }
            self.locs.push(Loc {
                line: self.line,
                column: self.col,
            });
            let value = self.parse_value()?;
            values.push(value);
        }
    }

    fn enter_nested(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.err(
                ErrorId::Custom("nesting-too-deep".to_owned()),
                "Block nesting exceeds depth limit",
            ));
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value, Error> {
        let c = self.peek().expect("parse_value called at end of input");
        match c {
            '[' => {
                self.bump();
                self.enter_nested()?;
                let values = self.parse_sequence(Some(']'))?;
                self.depth -= 1;
                Ok(Value::Block(BlockSeries::new(values)))
            }
            '(' => {
                let paren = self.parse_paren()?;
                if self.at_path_continuation() {
                    return Err(self.err(
                        ErrorId::PathEvalBase,
                        "Path may not begin with an eval segment",
                    ));
                }
                Ok(Value::Paren(paren))
            }
            '"' => {
                let text = self.parse_string_literal()?;
                if self.at_path_continuation() {
                    self.parse_segments_after(RawSeg::Str(text))
                } else {
                    Ok(Value::Str(StringSeries::new(&text)))
                }
            }
            '#' => {
                self.bump();
                if self.peek() == Some('{') {
                    self.bump();
                    self.parse_binary()
                } else {
                    Err(self.err(ErrorId::InvalidCharacter, "Unexpected '#'"))
                }
            }
            '\'' => {
                self.bump();
                match self.parse_chain()? {
                    Value::Word(sym) => Ok(Value::LitWord(sym)),
                    other => Err(self.err(
                        ErrorId::InvalidCharacter,
                        format!("Invalid lit-word ({})", other.ty()),
                    )),
                }
            }
            ':' => {
                self.bump();
                match self.parse_chain()? {
                    Value::Word(sym) => Ok(Value::GetWord(sym)),
                    Value::Path(data) => Ok(Value::GetPath(data)),
                    other => Err(self.err(
                        ErrorId::InvalidCharacter,
                        format!("Invalid get-word ({})", other.ty()),
                    )),
                }
            }
            _ => self.parse_chain(),
        }
    }

    fn parse_paren(&mut self) -> Result<BlockSeries, Error> {
        self.bump();
        self.enter_nested()?;
        let values = self.parse_sequence(Some(')'))?;
        self.depth -= 1;
        Ok(BlockSeries::new(values))
    }

    /// True when the cursor sits on `.` directly followed by a segment start.
    fn at_path_continuation(&self) -> bool {
        self.peek() == Some('.')
            && self
                .peek_at('.'.len_utf8())
                .is_some_and(|c| c == '(' || c == '"' || is_word_char(c))
    }

    /// Parses a token chain: a refinement, a number, a word, or a dotted
    /// path, with an optional trailing `:` for the set flavor.
    fn parse_chain(&mut self) -> Result<Value, Error> {
        // refinements are a distinct token class, never path heads
        if self.peek() == Some('-')
            && self.peek_at(1) == Some('-')
            && self.peek_at(2).is_some_and(|c| c.is_alphabetic())
        {
            self.bump();
            self.bump();
            let token = self.scan_token();
            let sym = self.interns.intern(&token);
            return Ok(Value::Refinement(sym));
        }
        let token = self.scan_token();
        if token.is_empty() {
            let c = self.peek().map_or(String::from("end of input"), |c| format!("'{c}'"));
            return Err(self.err(ErrorId::InvalidCharacter, format!("Unexpected {c}")));
        }
        self.parse_segments_after(RawSeg::Tok(token))
    }

    fn parse_segments_after(&mut self, first: RawSeg) -> Result<Value, Error> {
        let mut segments: SmallVec<[RawSeg; 4]> = SmallVec::new();
        segments.push(first);
        while self.at_path_continuation() {
            self.bump(); // the '.'
            match self.peek() {
                Some('(') => segments.push(RawSeg::Paren(self.parse_paren()?)),
                Some('"') => segments.push(RawSeg::Str(self.parse_string_literal()?)),
                _ => {
                    let token = self.scan_token();
                    if token.is_empty() {
                        return Err(self.err(ErrorId::InvalidCharacter, "Malformed path"));
                    }
                    segments.push(RawSeg::Tok(token));
                }
            }
        }
        let set_flavor = if self.peek() == Some(':') {
            self.bump();
            true
        } else {
            false
        };
        self.classify(segments, set_flavor)
    }

    fn classify(&mut self, segments: SmallVec<[RawSeg; 4]>, set_flavor: bool) -> Result<Value, Error> {
        // single token: number or word
        if segments.len() == 1 {
            if let RawSeg::Tok(t) = &segments[0] {
                if is_integer_token(t) {
                    if set_flavor {
                        return Err(self.err(ErrorId::InvalidCharacter, "Invalid set-word"));
                    }
                    return self.parse_integer(t).map(Value::Int);
                }
                let sym = self.word_symbol(t)?;
                return Ok(if set_flavor {
                    Value::SetWord(sym)
                } else {
                    Value::Word(sym)
                });
            }
            // a lone string segment never reaches classify
            unreachable!("single non-token segment");
        }
        // two numeric tokens: decimal literal
        if segments.len() == 2
            && let (RawSeg::Tok(a), RawSeg::Tok(b)) = (&segments[0], &segments[1])
            && is_integer_token(a)
            && b.bytes().all(|c| c.is_ascii_digit())
            && !b.is_empty()
        {
            if set_flavor {
                return Err(self.err(ErrorId::InvalidCharacter, "Invalid set-word"));
            }
            let text = format!("{a}.{b}");
            let value: f64 = text
                .parse()
                .map_err(|_| self.err(ErrorId::InvalidCharacter, format!("Invalid decimal '{text}'")))?;
            return Ok(Value::Decimal(value));
        }
        // otherwise: a path
        let mut path_segments: SmallVec<[PathSeg; 4]> = SmallVec::new();
        for seg in segments {
            path_segments.push(match seg {
                RawSeg::Tok(t) if is_integer_token(&t) => PathSeg::Int(self.parse_integer(&t)?),
                RawSeg::Tok(t) => PathSeg::Word(self.word_symbol(&t)?),
                RawSeg::Str(s) => PathSeg::Str(s.into_boxed_str()),
                RawSeg::Paren(p) => PathSeg::Paren(p),
            });
        }
        let data = Rc::new(PathData {
            segments: path_segments,
        });
        Ok(if set_flavor {
            Value::SetPath(data)
        } else {
            Value::Path(data)
        })
    }

    fn parse_integer(&self, token: &str) -> Result<i64, Error> {
        token
            .parse()
            .map_err(|_| self.err(ErrorId::InvalidCharacter, format!("Integer literal out of range '{token}'")))
    }

    fn word_symbol(&mut self, token: &str) -> Result<crate::intern::Symbol, Error> {
        let first = token.chars().next().expect("empty word token");
        if first.is_ascii_digit() {
            return Err(self.err(ErrorId::InvalidCharacter, format!("Invalid token '{token}'")));
        }
        Ok(self.interns.intern(token))
    }

    fn scan_token(&mut self) -> String {
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            token.push(c);
            self.bump();
        }
        token
    }

    fn parse_string_literal(&mut self) -> Result<String, Error> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err(ErrorId::UnclosedBlock, "Unterminated string literal")),
                Some('"') => return Ok(text),
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    Some(other) => {
                        return Err(self.err(
                            ErrorId::InvalidCharacter,
                            format!("Unsupported escape '\\{other}'"),
                        ));
                    }
                    None => return Err(self.err(ErrorId::UnclosedBlock, "Unterminated string literal")),
                },
                Some(c) => text.push(c),
            }
        }
    }

    /// Parses `#{ … }` after the opening brace. Whitespace between digit
    /// pairs is ignored.
    fn parse_binary(&mut self) -> Result<Value, Error> {
        let mut nibbles: Vec<u8> = Vec::new();
        loop {
            match self.bump() {
                None => return Err(self.err(ErrorId::UnclosedBlock, "Unterminated binary literal")),
                Some('}') => break,
                Some(c) if c.is_ascii_hexdigit() => {
                    nibbles.push(c.to_digit(16).expect("hex digit") as u8);
                }
                Some(c) if c.is_whitespace() => {}
                Some(c) => {
                    let id = if nibbles.is_empty() {
                        ErrorId::InvalidCharacter
                    } else {
                        ErrorId::InvalidBinaryDigit
                    };
                    return Err(self.err(id, format!("Invalid character '{c}' in binary literal")));
                }
            }
        }
        if nibbles.len() % 2 != 0 {
            return Err(self.err(
                ErrorId::InvalidBinaryLength,
                "Binary literal has an odd number of hex digits",
            ));
        }
        let bytes = nibbles.chunks_exact(2).map(|pair| (pair[0] << 4) | pair[1]).collect();
        Ok(Value::Binary(BinarySeries::new(bytes)))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '-' | '*' | '/' | '=' | '<' | '>' | '?' | '!' | '~')
}

fn is_integer_token(t: &str) -> bool {
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    !digits.is_empty() && digits.bytes().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interns;

    fn parse_one(src: &str) -> Value {
        let mut interns = Interns::new();
        let parsed = parse(src, "test", &mut interns).expect("parse failed");
        parsed.block.get(0).expect("no value parsed")
    }

    #[test]
    fn dotted_token_classification() {
        assert!(matches!(parse_one("42"), Value::Int(42)));
        assert!(matches!(parse_one("-7"), Value::Int(-7)));
        assert!(matches!(parse_one("3.14"), Value::Decimal(d) if (d - 3.14).abs() < 1e-12));
        assert!(matches!(parse_one("a.b"), Value::Path(_)));
        assert!(matches!(parse_one("1.2.3"), Value::Path(_)));
        assert!(matches!(parse_one("<="), Value::Word(_)));
    }

    #[test]
    fn word_flavors() {
        assert!(matches!(parse_one("x"), Value::Word(_)));
        assert!(matches!(parse_one("x:"), Value::SetWord(_)));
        assert!(matches!(parse_one(":x"), Value::GetWord(_)));
        assert!(matches!(parse_one("'x"), Value::LitWord(_)));
        assert!(matches!(parse_one("--part"), Value::Refinement(_)));
    }

    #[test]
    fn locations_are_one_based() {
        let mut interns = Interns::new();
        let parsed = parse("a\n  b", "test", &mut interns).unwrap();
        let map = parsed.source_map();
        assert_eq!(map.location(0), Some(Loc { line: 1, column: 1 }));
        assert_eq!(map.location(1), Some(Loc { line: 2, column: 3 }));
    }

    #[test]
    fn binary_whitespace_is_ignored() {
        let Value::Binary(bin) = parse_one("#{DE AD be ef}") else {
            panic!("expected binary");
        };
        assert_eq!(bin.tail_bytes(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn leading_eval_segment_is_rejected() {
        let mut interns = Interns::new();
        let err = parse("(a).b", "test", &mut interns).unwrap_err();
        assert_eq!(err.id, ErrorId::PathEvalBase);
    }
}
