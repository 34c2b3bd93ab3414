use std::collections::HashMap;
use std::ops::Range;

use crate::parser::error::ParseError;
use crate::source::SourceLine;

// ---------------------------------------------------------------------------
// Reserved tokens
// ---------------------------------------------------------------------------

/// Header marker: a line starting with this opens a new section.
pub const HEADER_MARKER: &str = "----";

/// Internal tag name given to header lines.
pub const SECTION_TAG: &str = "section";

/// Implicit tag when a line has class names but no explicit tag.
pub const DIV_TAG: &str = "div";

/// Implicit tag when a line is bare text.
pub const TEXT_TAG: &str = "text";

/// Tag carried by the synthetic line a collapsed code block becomes.
pub const CODE_BLOCK_TAG: &str = "codeblock";

/// Background tags attach directly under their section.
pub const BACKGROUND_TAG: &str = "background";
pub const BACKGROUND_VIDEO_TAG: &str = "background_video";

/// Footers attach to the enclosing section regardless of nesting depth.
pub const FOOTER_TAG: &str = "footer";

/// Stands in for newlines inside a collapsed code-block payload.
pub const CODE_LINE_PLACEHOLDER: &str = "__CODE_BLOCK_SPACE";

// ---------------------------------------------------------------------------
// Classified line
// ---------------------------------------------------------------------------

/// The structured result of running the line grammar over one source line.
#[derive(Debug, Clone)]
pub struct ClassifiedLine {
    /// Count of leading tab/space characters; the sole nesting signal.
    pub indent: i32,
    /// `section`, an explicit `@name`, or the implicit `div`/`text`.
    pub tag: String,
    pub classes: Vec<String>,
    pub options: HashMap<String, String>,
    /// Whatever follows the grammar tokens, trimmed. May be empty.
    pub text: String,
    /// Byte span of the source line, for diagnostics.
    pub span: Range<usize>,
}

impl ClassifiedLine {
    /// A line that carries no tag, no classes, and no text contributes
    /// nothing to the tree and is dropped before building.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.classes.is_empty() && self.tag == TEXT_TAG
    }
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Classify one line.
///
/// Clause precedence: header (`----…`), named tag (`@name`, with optional
/// `(key=value …)` options), div shorthand (leading `.class` clauses). Each
/// clause may be followed by further `.class` clauses. Anything left over
/// becomes the line's trailing text, so a line matching no clause is plain
/// text. Whitespace between grammar tokens is insignificant.
pub fn parse_line(line: &SourceLine, file_id: usize) -> Result<ClassifiedLine, ParseError> {
    let indent = line
        .text
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count() as i32;

    let mut cur = Cursor::new(&line.text);
    cur.skip_ws();

    let mut tag: Option<String> = None;
    let mut classes = Vec::new();
    let mut options = HashMap::new();

    if cur.eat_str(HEADER_MARKER) {
        // Extra dashes are decoration.
        while cur.eat('-') {}
        tag = Some(SECTION_TAG.to_string());
        parse_class_clauses(&mut cur, &mut classes);
    } else if cur.peek() == Some('@') {
        // Once the sigil is seen the line is committed to the tag clause.
        cur.bump();
        let name = cur.ident().ok_or_else(|| {
            ParseError::grammar("expected a tag name after '@'", line.span.clone(), file_id)
        })?;
        tag = Some(name);
        cur.skip_ws();
        if cur.peek() == Some('(') {
            options = parse_options(&mut cur, line, file_id)?;
        }
        parse_class_clauses(&mut cur, &mut classes);
    } else if at_class_clause(&cur) {
        parse_class_clauses(&mut cur, &mut classes);
    }

    let text = cur.rest().trim().to_string();

    let tag = match tag {
        Some(tag) => tag,
        None if !classes.is_empty() => DIV_TAG.to_string(),
        None => TEXT_TAG.to_string(),
    };

    Ok(ClassifiedLine {
        indent,
        tag,
        classes,
        options,
        text,
        span: line.span.clone(),
    })
}

fn at_class_clause(cur: &Cursor<'_>) -> bool {
    cur.peek() == Some('.') && cur.peek_at(1).is_some_and(is_ident_char)
}

/// Consume `.name` clauses. Stops (without consuming trailing whitespace)
/// at the first thing that is not a class clause.
fn parse_class_clauses(cur: &mut Cursor<'_>, classes: &mut Vec<String>) {
    loop {
        let mark = cur.mark();
        cur.skip_ws();
        if !at_class_clause(cur) {
            cur.reset(mark);
            return;
        }
        cur.bump();
        match cur.ident() {
            Some(name) => classes.push(name),
            None => {
                cur.reset(mark);
                return;
            }
        }
    }
}

/// Parse a parenthesized `key=value` list. Groups may nest; their pairs
/// flatten into one map. A repeated key overwrites the earlier value.
fn parse_options(
    cur: &mut Cursor<'_>,
    line: &SourceLine,
    file_id: usize,
) -> Result<HashMap<String, String>, ParseError> {
    let grammar =
        |message: &str| ParseError::grammar(message.to_string(), line.span.clone(), file_id);

    let mut options = HashMap::new();
    let mut depth = 0usize;

    loop {
        cur.skip_ws();
        match cur.peek() {
            Some('(') => {
                cur.bump();
                depth += 1;
            }
            Some(')') => {
                cur.bump();
                depth -= 1;
                if depth == 0 {
                    return Ok(options);
                }
            }
            None => return Err(grammar("unterminated option list")),
            Some(_) => {
                let key = cur
                    .ident()
                    .ok_or_else(|| grammar("expected an option key"))?;
                cur.skip_ws();
                if !cur.eat('=') {
                    return Err(grammar(&format!("expected '=' after option key '{}'", key)));
                }
                cur.skip_ws();
                let value = match cur.peek() {
                    Some(quote @ ('\'' | '"')) => {
                        cur.bump();
                        cur.take_until(quote)
                            .ok_or_else(|| grammar("unterminated quoted option value"))?
                    }
                    _ => cur
                        .ident()
                        .ok_or_else(|| grammar(&format!("expected a value for option '{}'", key)))?,
                };
                options.insert(key, value);
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Byte cursor over one line.
struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Cursor { s, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.s[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.s[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.s[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
    }

    fn mark(&self) -> usize {
        self.pos
    }

    fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    /// Consume a run of identifier characters; `None` if the run is empty.
    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.pos == start {
            None
        } else {
            Some(self.s[start..self.pos].to_string())
        }
    }

    /// Consume up to (and past) the next occurrence of `end`, returning the
    /// text before it. `None` if `end` never occurs.
    fn take_until(&mut self, end: char) -> Option<String> {
        let rest = &self.s[self.pos..];
        let at = rest.find(end)?;
        let value = rest[..at].to_string();
        self.pos += at + end.len_utf8();
        Some(value)
    }

    fn rest(&self) -> &str {
        &self.s[self.pos..]
    }
}
