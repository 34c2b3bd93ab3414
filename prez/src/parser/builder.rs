use crate::parser::error::ParseError;
use crate::parser::line::{
    BACKGROUND_TAG, BACKGROUND_VIDEO_TAG, CODE_BLOCK_TAG, ClassifiedLine, DIV_TAG, FOOTER_TAG,
    HEADER_MARKER, SECTION_TAG,
};
use crate::tags::TagRegistry;
use crate::tree::{NodeId, Tree};

/// Sentinel depth for the header node: below any real indentation, so the
/// first content line always nests under it.
const HEADER_INDENT: i32 = -5;

/// Sentinel depth for the wrapper inserted after a background tag.
const WRAP_INDENT: i32 = -2;

const WRAP_CLASS: &str = "wrap";

/// Build one section tree from its classified, non-empty lines.
///
/// The first line must be the section header; it becomes the root. Every
/// later line is placed by comparing its indentation against the recorded
/// depth of the most recently placed node, with background and footer tags
/// special-cased to attach under the section itself.
pub fn build_section(
    lines: &[ClassifiedLine],
    tags: &TagRegistry,
    inline: &dyn Fn(&str) -> String,
    file_id: usize,
) -> Result<Tree, ParseError> {
    let Some((header, rest)) = lines.split_first() else {
        return Err(ParseError::structure("section is empty", 0..0, file_id));
    };
    if header.tag != SECTION_TAG {
        return Err(ParseError::structure(
            format!(
                "section must start with a '{}' header line, found '{}'",
                HEADER_MARKER, header.tag
            ),
            header.span.clone(),
            file_id,
        ));
    }

    let mut tree = Tree::new();
    let root = instantiate(&mut tree, header, tags, inline);
    tree.set_indent(root, HEADER_INDENT);
    let mut current = root;

    for line in rest {
        let node = instantiate(&mut tree, line, tags, inline);
        tree.set_indent(node, line.indent);

        if line.tag == BACKGROUND_TAG || line.tag == BACKGROUND_VIDEO_TAG {
            if tree.name(current) != SECTION_TAG {
                return Err(ParseError::structure(
                    format!("'{}' must appear directly under a section header", line.tag),
                    line.span.clone(),
                    file_id,
                ));
            }
            tree.append(current, node);
            // Subsequent lines nest in a wrapper, not the section itself.
            let wrap = tree.new_element(DIV_TAG);
            tree.add_class(wrap, WRAP_CLASS);
            tree.set_indent(wrap, WRAP_INDENT);
            tree.append(current, wrap);
            current = wrap;
            continue;
        }

        if line.tag == FOOTER_TAG {
            // Footers belong to the slide no matter how deep we are.
            let section = tree.enclosing(current, SECTION_TAG).ok_or_else(|| {
                ParseError::structure(
                    "footer outside of any section",
                    line.span.clone(),
                    file_id,
                )
            })?;
            tree.append(section, node);
        } else if line.indent > depth(&tree, current) {
            tree.append(current, node);
        } else if line.indent == depth(&tree, current) {
            let parent = tree.parent(current).ok_or_else(|| {
                ParseError::structure(
                    "line has no open level to attach to",
                    line.span.clone(),
                    file_id,
                )
            })?;
            tree.append(parent, node);
        } else {
            // Dedent: close every level at or deeper than this line and
            // attach to the first strictly shallower ancestor.
            let mut anchor = current;
            while depth(&tree, anchor) >= line.indent {
                anchor = tree.parent(anchor).ok_or_else(|| {
                    ParseError::structure(
                        "dedent does not match any open level",
                        line.span.clone(),
                        file_id,
                    )
                    .with_note("check the line's leading whitespace against its section")
                })?;
            }
            tree.append(anchor, node);
        }

        current = node;
    }

    // Indentation is construction-only bookkeeping.
    tree.clear_indents();
    Ok(tree)
}

fn depth(tree: &Tree, id: NodeId) -> i32 {
    tree.indent(id).unwrap_or(i32::MIN)
}

/// Create the node for one classified line: custom constructor when the tag
/// is registered, generic element otherwise. Classes, options, and text are
/// applied the same way in both cases.
fn instantiate(
    tree: &mut Tree,
    line: &ClassifiedLine,
    tags: &TagRegistry,
    inline: &dyn Fn(&str) -> String,
) -> NodeId {
    let id = match tags.get(&line.tag) {
        Some(construct) => construct(line, tree),
        None => tree.new_element(&line.tag),
    };

    for class in &line.classes {
        tree.add_class(id, class);
    }
    for (key, value) in &line.options {
        tree.set_attr(id, key, value);
    }
    if !line.text.is_empty() {
        if line.tag == CODE_BLOCK_TAG {
            // Fence content is opaque: never inline-expanded.
            tree.set_text(id, &line.text);
        } else {
            tree.set_text(id, &inline(&line.text));
        }
    }

    id
}
