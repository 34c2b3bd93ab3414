pub mod builder;
pub mod error;
pub mod line;
pub mod section;

pub use error::{ErrorKind, ParseError};

use crate::Deck;
use crate::source::{self, SourceLine};
use crate::tags::TagRegistry;
use crate::tree::Tree;

/// Compiler entry point.
///
/// Pipeline: filter the source's lines, split them into sections, collapse
/// each section's code fences, classify each line, then build one tree per
/// section. Custom tags and the inline-markup expander are collaborator
/// seams wired in before compiling; both default to doing nothing.
pub struct Compiler<'a> {
    source: String,
    file_id: usize,
    tags: Option<&'a TagRegistry>,
    inline: Option<&'a dyn Fn(&str) -> String>,
}

impl<'a> Compiler<'a> {
    pub fn new(source: String, file_id: usize) -> Self {
        Compiler {
            source,
            file_id,
            tags: None,
            inline: None,
        }
    }

    /// Use `tags` for custom tag dispatch. The registry must be fully
    /// populated before compiling; it is only read from here.
    pub fn with_tags(mut self, tags: &'a TagRegistry) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Expand inline markup in trailing text with `inline`. Without this,
    /// text is inserted verbatim.
    pub fn with_inline(mut self, inline: &'a dyn Fn(&str) -> String) -> Self {
        self.inline = Some(inline);
        self
    }

    /// Compile the whole source. A failing section aborts that section;
    /// errors from all sections are collected and returned together.
    pub fn compile(&self) -> Result<Deck, Vec<ParseError>> {
        let empty_tags = TagRegistry::new();
        let tags = self.tags.unwrap_or(&empty_tags);
        let verbatim = |text: &str| text.to_string();
        let inline: &dyn Fn(&str) -> String = match self.inline {
            Some(inline) => inline,
            None => &verbatim,
        };

        let lines = source::filter_lines(&self.source);

        let mut sections = Vec::new();
        let mut errors = Vec::new();
        for section_lines in section::split_sections(lines) {
            match self.compile_section(section_lines, tags, inline) {
                Ok(tree) => sections.push(tree),
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(Deck {
                sections,
                source_id: self.file_id,
            })
        } else {
            Err(errors)
        }
    }

    fn compile_section(
        &self,
        lines: Vec<SourceLine>,
        tags: &TagRegistry,
        inline: &dyn Fn(&str) -> String,
    ) -> Result<Tree, ParseError> {
        // The splitter never emits an empty section, so these spans exist.
        let span = match (lines.first(), lines.last()) {
            (Some(first), Some(last)) => first.span.start..last.span.end,
            _ => 0..0,
        };

        let lines = section::extract_code_blocks(lines);

        let mut classified = Vec::new();
        for raw in &lines {
            let parsed = line::parse_line(raw, self.file_id)?;
            if !parsed.is_empty() {
                classified.push(parsed);
            }
        }

        if classified.is_empty() {
            return Err(ParseError::structure(
                "section contains no content",
                span,
                self.file_id,
            ));
        }

        builder::build_section(&classified, tags, inline, self.file_id)
    }
}
