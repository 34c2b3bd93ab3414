use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use prez::tags::TagRegistry;

/// Optional TOML config. Its only job today is declaring data-driven
/// custom tags:
///
/// ```toml
/// [tags.note]
/// element = "aside"
/// classes = ["note"]
/// attrs = { role = "note" }
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tags: HashMap<String, TagSpec>,
}

/// One declared custom tag: the element it produces plus baked-in classes
/// and attributes. Classes and options written on the source line are
/// applied on top by the builder.
#[derive(Debug, Deserialize)]
pub struct TagSpec {
    pub element: String,

    #[serde(default)]
    pub classes: Vec<String>,

    #[serde(default)]
    pub attrs: HashMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
    }

    /// Turn the declared tags into a registry of constructors.
    pub fn into_registry(self) -> TagRegistry {
        let mut registry = TagRegistry::new();
        for (name, spec) in self.tags {
            registry.register(name, move |_line, tree| {
                let id = tree.new_element(&spec.element);
                for class in &spec.classes {
                    tree.add_class(id, class);
                }
                for (key, value) in &spec.attrs {
                    tree.set_attr(id, key, value);
                }
                id
            });
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::Config;

    #[test]
    fn declared_tags_become_constructors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[tags.note]\nelement = \"aside\"\nclasses = [\"note\"]\nattrs = {{ role = \"note\" }}\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let registry = config.into_registry();
        assert!(registry.contains("note"));
        assert!(!registry.contains("warn"));

        let source = "----\n@note remember this".to_string();
        let deck = prez::parser::Compiler::new(source, 0)
            .with_tags(&registry)
            .compile()
            .unwrap();

        let tree = &deck.sections[0];
        let node = tree.children(tree.root())[0];
        assert_eq!(tree.name(node), "aside");
        assert_eq!(tree.classes(node), ["note"]);
        assert_eq!(tree.attr(node, "role"), Some("note"));
        assert_eq!(tree.text(node), Some("remember this"));
    }

    #[test]
    fn missing_config_reports_path() {
        let err = Config::load(std::path::Path::new("/nonexistent/prez.toml")).unwrap_err();
        assert!(err.contains("/nonexistent/prez.toml"));
    }
}
