use std::collections::HashMap;

use crate::parser::line::ClassifiedLine;
use crate::tree::{NodeId, Tree};

/// A custom tag constructor. It fully owns node creation for its tag; the
/// builder applies classes, options, and text afterwards, exactly as it
/// does for generic nodes.
///
/// When the constructor runs for a section header line, the first node it
/// allocates becomes the section root.
pub type TagConstructor = Box<dyn Fn(&ClassifiedLine, &mut Tree) -> NodeId>;

/// Registry of custom tag constructors, consulted by the tree builder
/// before generic node creation.
///
/// Populate it during setup, then share it read-only across compiles; the
/// builder takes it by shared reference and never mutates it.
#[derive(Default)]
pub struct TagRegistry {
    constructors: HashMap<String, TagConstructor>,
}

impl TagRegistry {
    pub fn new() -> Self {
        TagRegistry {
            constructors: HashMap::new(),
        }
    }

    /// Register `construct` for `name`, replacing any previous entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        construct: impl Fn(&ClassifiedLine, &mut Tree) -> NodeId + 'static,
    ) {
        self.constructors.insert(name.into(), Box::new(construct));
    }

    pub fn get(&self, name: &str) -> Option<&TagConstructor> {
        self.constructors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}
