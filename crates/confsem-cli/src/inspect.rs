//! # Inspect Subcommand
//!
//! Walks a document against its schema and reports what the walker saw
//! at every node, in visit order.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use confsem_core::Body;
use confsem_schema::BodySchema;
use confsem_walk::{walk, Node, NodeSchema, Visitor, WalkContext};

use crate::{load_document, load_schema};

/// Arguments for `confsem inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Body schema descriptor (YAML, or JSON by `.json` extension).
    #[arg(long)]
    pub schema: PathBuf,

    /// Already-parsed document (YAML, or JSON by `.json` extension).
    #[arg(long)]
    pub document: PathBuf,

    /// Print the report as a JSON array instead of text.
    #[arg(long)]
    pub json: bool,
}

/// What the walker saw at one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    /// `body`, `attribute` or `block`.
    pub kind: &'static str,
    /// Attribute name, or block type followed by its labels.
    pub name: String,
    pub nesting_level: usize,
    pub has_schema: bool,
    pub unknown_schema: bool,
    /// Child block counts, only reported at bodies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tallies: Option<BTreeMap<String, u64>>,
}

#[derive(Debug, Default)]
struct Recorder {
    reports: Vec<NodeReport>,
}

impl Visitor for Recorder {
    fn visit(&mut self, ctx: &WalkContext, node: Node<'_>, schema: Option<NodeSchema<'_>>) {
        let (kind, name) = match node {
            Node::Body(_) => ("body", String::new()),
            Node::Attribute(attr) => ("attribute", attr.name.clone()),
            Node::Block(block) => {
                let mut name = block.block_type.clone();
                for label in &block.labels {
                    name.push_str(&format!(" {label:?}"));
                }
                ("block", name)
            }
        };
        let tallies = match node {
            Node::Body(_) => ctx.tallies().map(|t| t.by_type.clone()),
            _ => None,
        };
        self.reports.push(NodeReport {
            kind,
            name,
            nesting_level: ctx.nesting_level(),
            has_schema: schema.is_some(),
            unknown_schema: ctx.is_unknown_schema(),
            tallies,
        });
    }
}

/// Walk `body` and collect one report per visited node.
pub fn inspect(body: &Body, schema: &BodySchema) -> Vec<NodeReport> {
    let mut recorder = Recorder::default();
    walk(Node::Body(body), Some(NodeSchema::Body(schema)), &mut recorder);
    recorder.reports
}

/// Execute `confsem inspect`.
///
/// Returns exit code 2 when any node was walked under an unknown schema.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let schema = load_schema(&args.schema)?;
    let document = load_document(&args.document)?;

    let reports = inspect(&document, &schema);
    let unknown = reports.iter().filter(|r| r.unknown_schema).count();
    tracing::info!(nodes = reports.len(), unknown, "walk complete");

    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("failed to serialize report")?;
        println!("{json}");
    } else {
        for line in reports.iter().map(render) {
            println!("{line}");
        }
    }

    Ok(if unknown > 0 { 2 } else { 0 })
}

fn render(report: &NodeReport) -> String {
    let indent = "  ".repeat(report.nesting_level);
    let mut line = format!("{indent}{}", report.kind);
    if !report.name.is_empty() {
        line.push(' ');
        line.push_str(&report.name);
    }
    if !report.has_schema {
        line.push_str(" [no schema]");
    }
    if report.unknown_schema {
        line.push_str(" [unknown schema]");
    }
    if let Some(tallies) = report.tallies.as_ref().filter(|t| !t.is_empty()) {
        let counts: Vec<String> = tallies.iter().map(|(k, n)| format!("{k}={n}")).collect();
        line.push_str(&format!(" ({})", counts.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsem_core::{Attribute, Block, Expression, Range, Value};

    fn literal_attr(name: &str) -> Attribute {
        Attribute {
            name: name.into(),
            expr: Expression::Literal {
                value: Value::string("x"),
                range: Range::default(),
            },
            range: Range::default(),
            name_range: Range::default(),
        }
    }

    fn schema() -> BodySchema {
        BodySchema::from_descriptor(
            "schema.yaml",
            r#"
attributes:
  top: { constraint: { kind: literal_type, of_type: string } }
blocks:
  item:
    labels: [{ name: name }]
    body:
      attributes:
        inner: { constraint: { kind: literal_type, of_type: string } }
"#,
        )
        .unwrap()
    }

    fn document() -> Body {
        Body {
            attributes: vec![literal_attr("top"), literal_attr("stray")],
            blocks: vec![Block {
                block_type: "item".into(),
                labels: vec!["a".into()],
                label_ranges: vec![],
                body: Body {
                    attributes: vec![literal_attr("inner")],
                    ..Default::default()
                },
                def_range: Range::default(),
                range: Range::default(),
            }],
            range: Range::default(),
        }
    }

    #[test]
    fn reports_schema_presence_and_levels() {
        let reports = inspect(&document(), &schema());
        let top = reports.iter().find(|r| r.name == "top").unwrap();
        assert!(top.has_schema);
        assert_eq!(top.nesting_level, 0);

        let stray = reports.iter().find(|r| r.name == "stray").unwrap();
        assert!(!stray.has_schema);

        let inner = reports.iter().find(|r| r.name == "inner").unwrap();
        assert_eq!(inner.nesting_level, 1);
        assert!(reports.iter().all(|r| !r.unknown_schema));
    }

    #[test]
    fn block_names_include_labels() {
        let reports = inspect(&document(), &schema());
        assert!(reports.iter().any(|r| r.kind == "block" && r.name == "item \"a\""));
    }

    #[test]
    fn root_body_reports_tallies() {
        let reports = inspect(&document(), &schema());
        let root = reports
            .iter()
            .find(|r| r.kind == "body" && r.nesting_level == 0)
            .unwrap();
        assert_eq!(root.tallies.as_ref().and_then(|t| t.get("item")), Some(&1));
    }

    #[test]
    fn render_marks_missing_schema() {
        let report = NodeReport {
            kind: "attribute",
            name: "stray".into(),
            nesting_level: 2,
            has_schema: false,
            unknown_schema: true,
            tallies: None,
        };
        assert_eq!(render(&report), "    attribute stray [no schema] [unknown schema]");
    }

    #[test]
    fn run_inspect_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.yaml");
        let doc_path = dir.path().join("doc.json");
        std::fs::write(
            &schema_path,
            "attributes:\n  a: { constraint: { kind: literal_type, of_type: number } }\n",
        )
        .unwrap();
        std::fs::write(
            &doc_path,
            r#"{"attributes":[{"name":"a","expr":{"kind":"literal","value":1}}]}"#,
        )
        .unwrap();

        let args = InspectArgs {
            schema: schema_path,
            document: doc_path,
            json: true,
        };
        assert_eq!(run_inspect(&args).unwrap(), 0);

        let missing = InspectArgs {
            document: dir.path().join("absent.json"),
            ..args
        };
        assert!(run_inspect(&missing).is_err());
    }
}
