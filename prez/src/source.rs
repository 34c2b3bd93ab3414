use std::ops::Range;

/// Comment marker: lines starting with this (after left-trim) are dropped.
pub const COMMENT_MARKER: &str = "//";

/// One surviving input line, with its byte span in the original source for
/// error reporting with codespan-reporting.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub text: String,
    pub span: Range<usize>,
}

/// Split source into lines, dropping blank lines and `//` comments and
/// right-trimming the rest. Byte spans cover each original line (without
/// its terminator).
pub fn filter_lines(source: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for raw in source.split_inclusive('\n') {
        let line = raw.trim_end_matches(['\n', '\r']);
        let span = offset..offset + line.len();
        offset += raw.len();

        if line.trim().is_empty() {
            continue;
        }
        if line.trim_start().starts_with(COMMENT_MARKER) {
            continue;
        }
        lines.push(SourceLine {
            text: line.trim_end().to_string(),
            span,
        });
    }

    lines
}
