mod config;

use std::path::Path;
use std::process;

use clap::Parser;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use prez::parser::Compiler;
use prez::tags::TagRegistry;
use prez::tree::Tree;

#[derive(Parser)]
#[command(name = "prez", version, about = "Slide-markup compiler")]
struct Cli {
    /// Slide source file to compile
    file: String,

    /// Parse only, don't print the trees (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Print one summary line per section instead of the trees
    #[arg(long)]
    list_sections: bool,

    /// TOML file declaring custom tags
    #[arg(short, long)]
    config: Option<String>,

    /// Suppress the tree dump (errors are still reported)
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored error output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    // Read source
    let source = match std::fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", cli.file, e);
            process::exit(1);
        }
    };

    // Custom tags come from the config file, registered before compiling.
    let registry = match &cli.config {
        Some(path) => match config::Config::load(Path::new(path)) {
            Ok(config) => config.into_registry(),
            Err(message) => {
                eprintln!("error: {}", message);
                process::exit(1);
            }
        },
        None => TagRegistry::new(),
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(cli.file.clone(), source.clone());

    // Compile
    let deck = match Compiler::new(source, file_id)
        .with_tags(&registry)
        .with_inline(&expand_inline)
        .compile()
    {
        Ok(deck) => deck,
        Err(errors) => {
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            for error in &errors {
                let diagnostic = error.to_diagnostic();
                let _ =
                    term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            }
            process::exit(1);
        }
    };

    // --check: compile succeeded, exit
    if cli.check {
        eprintln!(
            "ok: {} parsed successfully ({} sections)",
            cli.file,
            deck.sections.len()
        );
        return;
    }

    // --list-sections: one line per slide
    if cli.list_sections {
        for (index, section) in deck.sections.iter().enumerate() {
            println!("{}", section_summary(index, section));
        }
        return;
    }

    if !cli.quiet {
        for section in &deck.sections {
            print!("{}", section);
        }
    }
}

/// One listing line per slide: index, header classes, leading text.
fn section_summary(index: usize, tree: &Tree) -> String {
    let root = tree.root();
    let classes = tree.classes(root).join(" ");
    let title = tree.text(root).unwrap_or("");
    format!("{:>3}  <section class=\"{}\"> {}", index, classes, title)
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::section_summary;

    #[test]
    fn section_listing_shows_classes_and_leading_text() {
        let source = "---- .title .dark Welcome\n@p hi\n---- .plain\n".to_string();
        let deck = prez::parser::Compiler::new(source, 0).compile().unwrap();

        assert_eq!(
            section_summary(0, &deck.sections[0]),
            "  0  <section class=\"title dark\"> Welcome"
        );
        // No leading text: the line ends after the classes.
        assert_eq!(
            section_summary(1, &deck.sections[1]),
            "  1  <section class=\"plain\">"
        );
    }
}

/// The inline-markup collaborator: expand one line of text as inline
/// Markdown. pulldown-cmark renders a lone line as a paragraph, so the
/// wrapper is stripped again.
fn expand_inline(text: &str) -> String {
    let parser = pulldown_cmark::Parser::new(text);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    let html = html.trim();
    html.strip_prefix("<p>")
        .and_then(|h| h.strip_suffix("</p>"))
        .unwrap_or(html)
        .to_string()
}
