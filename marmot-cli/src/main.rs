//! Marmot CLI - markup parsing and debugging tool
//!
//! Usage:
//!   marmot <file>                  Parse and display the DOM tree
//!   marmot <file> --json           Output the DOM as JSON
//!   marmot <file> --tokens         Show the token stream first
//!   marmot --source '<a>hi</a>'    Parse a string directly
//!   marmot page.html --html        Permissive HTML mode

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use marmot_common::warning::set_printing;
use marmot_dom::{DomTree, NodeId, NodeType};
use marmot_markup::{MarkupParser, MarkupTokenizer, ParserOptions, print_tree};
use owo_colors::OwoColorize;
use serde_json::{Value, json};

/// Marmot CLI - parse XML or HTML and print the resulting tree
#[derive(Parser, Debug)]
#[command(name = "marmot", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Markup file to parse
    file: Option<PathBuf>,

    /// Parse this markup string instead of a file
    #[arg(short, long, conflicts_with = "file")]
    source: Option<String>,

    /// Permissive HTML mode: void elements need no closing tag
    #[arg(long)]
    html: bool,

    /// Print the token stream before the tree
    #[arg(short, long)]
    tokens: bool,

    /// Print JSON instead of the indented tree
    #[arg(short, long)]
    json: bool,

    /// Do not print parse issues
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    // Issues are printed per parse below, with their lines
    set_printing(false);

    let source = match (&cli.source, &cli.file) {
        (Some(source), _) => source.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?,
        (None, None) => bail!("no input: pass a file or --source"),
    };

    let options = ParserOptions { html: cli.html };

    if cli.tokens {
        print_tokens(&source, options, cli.json)?;
    }

    let mut parser = MarkupParser::new(source, options);
    let result = parser.parse();
    if !cli.quiet {
        for issue in parser.issues() {
            eprintln!("{} {issue}", "warning:".yellow().bold());
        }
    }
    let tree = match result {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.json {
        let mut out = BufWriter::new(io::stdout().lock());
        write_json(&tree, &mut out)?;
        writeln!(out)?;
        out.flush()?;
    } else {
        println!("=== DOM Tree ({} nodes) ===", tree.len());
        print_tree(&tree, tree.root(), 0);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_tokens(source: &str, options: ParserOptions, as_json: bool) -> Result<()> {
    let tokens = MarkupTokenizer::new(source, options.into()).into_tokens();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        println!("=== Tokens ({}) ===", tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            println!("  {i:3}: {token}");
        }
        println!();
    }
    Ok(())
}

/// One pending step of the JSON walk.
enum JsonStep {
    Node(NodeId),
    Separator,
    Close,
}

/// Write the tree as compact JSON.
///
/// Containers are streamed: their own fields first, then a `children` array
/// filled from an explicit stack, so deep trees never become a deeply nested
/// `Value` or recurse.
fn write_json(tree: &DomTree, out: &mut impl Write) -> Result<()> {
    let mut stack = vec![JsonStep::Node(tree.root())];
    while let Some(step) = stack.pop() {
        let id = match step {
            JsonStep::Separator => {
                out.write_all(b",")?;
                continue;
            }
            JsonStep::Close => {
                out.write_all(b"]}")?;
                continue;
            }
            JsonStep::Node(id) => id,
        };
        let fields = serde_json::to_string(&node_fields(tree, id))?;
        let is_container = tree.get(id).is_some_and(|node| {
            matches!(node.node_type, NodeType::Document(_) | NodeType::Element(_))
        });
        if !is_container {
            out.write_all(fields.as_bytes())?;
            continue;
        }

        let open = fields.strip_suffix('}').unwrap_or(&fields);
        write!(out, "{open},\"children\":[")?;
        stack.push(JsonStep::Close);
        for (index, &child) in tree.children(id).iter().enumerate().rev() {
            stack.push(JsonStep::Node(child));
            if index > 0 {
                stack.push(JsonStep::Separator);
            }
        }
    }
    Ok(())
}

/// A node's own fields, without its children.
fn node_fields(tree: &DomTree, id: NodeId) -> Value {
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };

    match &node.node_type {
        NodeType::Document(data) => json!({
            "type": "document",
            "doctype": data.doctype.map(|slot| node_fields(tree, slot)),
            "xmlDeclaration": data.xml_declaration.map(|slot| node_fields(tree, slot)),
        }),
        NodeType::Element(data) => json!({
            "type": "element",
            "prefix": data.prefix,
            "name": data.name,
            "attributes": data.attrs,
        }),
        NodeType::Doctype(data) => json!({
            "type": "doctype",
            "name": data.name,
            "docType": data.doc_type,
            "publicId": data.public_id,
            "systemId": data.system_id,
        }),
        NodeType::Comment(text) => json!({ "type": "comment", "content": text }),
        NodeType::Cdata(text) => json!({ "type": "cdata", "content": text }),
        NodeType::Text(text) => json!({ "type": "text", "content": text }),
        NodeType::XmlDeclaration(attrs) => json!({
            "type": "xmlDeclaration",
            "attributes": attrs,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: parse `source` and render it through `write_json`.
    fn render(source: &str) -> String {
        let tree = marmot_markup::parse(source).expect("parse");
        let mut out = Vec::new();
        write_json(&tree, &mut out).expect("write");
        String::from_utf8(out).expect("utf-8")
    }

    #[test]
    fn test_json_matches_tree_shape() {
        let rendered = render("<!DOCTYPE r><r a=\"1\">hi<!--c--><s/></r>");
        let value: Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(value["type"], "document");
        assert_eq!(value["doctype"]["name"], "r");
        assert!(value["xmlDeclaration"].is_null());

        let root = &value["children"][0];
        assert_eq!(root["name"], "r");
        assert_eq!(root["attributes"]["a"], "1");
        let children = root["children"].as_array().expect("children array");
        assert_eq!(children.len(), 3);
        assert_eq!(children[0]["content"], "hi");
        assert_eq!(children[1]["type"], "comment");
        assert_eq!(children[2]["children"], json!([]));
    }

    #[test]
    fn test_json_of_deep_tree() {
        const DEPTH: usize = 100_000;
        let source = format!("{}{}", "<a>".repeat(DEPTH), "</a>".repeat(DEPTH));
        let rendered = render(&source);
        assert_eq!(rendered.matches("\"children\":[").count(), DEPTH + 1);
        assert!(rendered.ends_with(&"]}".repeat(DEPTH + 1)));
    }
}
