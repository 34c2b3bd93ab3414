use crate::parser::line::{CODE_BLOCK_TAG, CODE_LINE_PLACEHOLDER, HEADER_MARKER};
use crate::source::SourceLine;

/// Code fence toggle: three backticks at the start of a (left-trimmed) line.
pub const CODE_FENCE: &str = "```";

/// Cheap header check used for splitting, independent of the full grammar:
/// only the first four characters are inspected, so an indented marker does
/// not open a section.
pub fn is_section_header(text: &str) -> bool {
    text.starts_with(HEADER_MARKER)
}

/// Split filtered lines into sections. A header line flushes the running
/// section (unless it is the very first line); whatever remains at end of
/// input is flushed as-is, so a file that opens with non-header content
/// still produces a leading section; the builder rejects it later.
pub fn split_sections(lines: Vec<SourceLine>) -> Vec<Vec<SourceLine>> {
    let mut sections = Vec::new();
    let mut section: Vec<SourceLine> = Vec::new();

    for line in lines {
        if is_section_header(&line.text) && !section.is_empty() {
            sections.push(std::mem::take(&mut section));
        }
        section.push(line);
    }
    if !section.is_empty() {
        sections.push(section);
    }

    sections
}

/// Collapse each fenced code block into one synthetic `@codeblock` line so
/// its content survives the line grammar untouched.
///
/// The payload is the block's interior lines joined with
/// [`CODE_LINE_PLACEHOLDER`]; the synthetic line is indented by the count
/// of leading plain spaces on the closing fence line, and its span covers
/// the whole block. An unterminated block is silently dropped.
pub fn extract_code_blocks(lines: Vec<SourceLine>) -> Vec<SourceLine> {
    let mut out = Vec::new();
    let mut inside = false;
    let mut open_at = 0;
    let mut buffer: Vec<SourceLine> = Vec::new();

    for line in lines {
        let is_fence = line.text.trim_start().starts_with(CODE_FENCE);
        if is_fence {
            inside = !inside;
        }

        if is_fence && inside {
            // Opening fence: neither buffered nor passed through.
            open_at = line.span.start;
        } else if is_fence {
            // Closing fence: emit the collapsed block.
            let indent = line.text.chars().take_while(|c| *c == ' ').count();
            let payload = buffer
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join(CODE_LINE_PLACEHOLDER);
            out.push(SourceLine {
                text: format!("{}@{} {}", " ".repeat(indent), CODE_BLOCK_TAG, payload),
                span: open_at..line.span.end,
            });
            buffer.clear();
        } else if inside {
            buffer.push(line);
        } else {
            out.push(line);
        }
    }

    out
}
