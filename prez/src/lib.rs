pub mod parser;
pub mod source;
pub mod tags;
pub mod tree;

use crate::tree::Tree;

/// A compiled slide deck.
#[derive(Debug, Clone)]
pub struct Deck {
    /// One tree per section, in source order; each root is a header node.
    pub sections: Vec<Tree>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}
