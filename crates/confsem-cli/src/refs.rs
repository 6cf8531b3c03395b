//! # Refs Subcommand
//!
//! Extracts targets and origins from a document and resolves the
//! definitions each origin refers to. With `--at LINE:COL` only origins
//! covering that position are resolved.
//!
//! The document is treated as a single configuration unit, so local
//! origins are matched against its own targets and path origins are
//! listed without being resolved.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Args;

use confsem_core::{Body, Path, Range};
use confsem_reference::{collect_origins, collect_targets, Origin, Origins, Target, Targets};
use confsem_schema::BodySchema;

use crate::{load_document, load_schema};

/// Arguments for `confsem refs`.
#[derive(Args, Debug)]
pub struct RefsArgs {
    /// Body schema descriptor (YAML, or JSON by `.json` extension).
    #[arg(long)]
    pub schema: PathBuf,

    /// Already-parsed document (YAML, or JSON by `.json` extension).
    #[arg(long)]
    pub document: PathBuf,

    /// Only resolve origins covering this 1-based `LINE:COL` position.
    #[arg(long)]
    pub at: Option<LinePos>,
}

/// A 1-based line and column, as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePos {
    pub line: usize,
    pub column: usize,
}

impl LinePos {
    /// Whether `range` covers this position. The end is exclusive.
    pub fn within(&self, range: &Range) -> bool {
        let here = (self.line, self.column);
        (range.start.line, range.start.column) <= here && here < (range.end.line, range.end.column)
    }
}

impl FromStr for LinePos {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, column) = s
            .split_once(':')
            .ok_or_else(|| format!("expected LINE:COL, got {s:?}"))?;
        let parse = |part: &str, what: &str| {
            part.trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("{what} must be a positive integer, got {part:?}"))
        };
        Ok(Self {
            line: parse(line, "line")?,
            column: parse(column, "column")?,
        })
    }
}

impl fmt::Display for LinePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Extraction and matching results for one document.
#[derive(Debug, Clone)]
pub struct RefsReport {
    pub targets: Targets,
    pub origins: Origins,
}

impl RefsReport {
    /// Extract targets and origins from `body`.
    pub fn collect(body: &Body, schema: &BodySchema) -> Self {
        Self {
            targets: collect_targets(body, schema),
            origins: collect_origins(body, schema),
        }
    }

    /// Origins to resolve: all of them, or those covering `at`.
    pub fn selected(&self, at: Option<LinePos>) -> Vec<&Origin> {
        self.origins
            .iter()
            .filter(|o| at.map_or(true, |pos| pos.within(o.range())))
            .collect()
    }

    /// Targets an origin refers to.
    pub fn definitions(&self, origin: &Origin) -> Vec<&Target> {
        self.targets.match_origin(origin).0
    }

    /// Number of origins in this document referring to `target`.
    pub fn reference_count(&self, target: &Target) -> usize {
        let unit = Path::new(".", "");
        self.origins.match_target(&unit, target, &unit).len()
    }
}

/// Execute `confsem refs`.
///
/// Returns exit code 2 when `--at` is given and no origin covers it.
pub fn run_refs(args: &RefsArgs) -> Result<u8> {
    let schema = load_schema(&args.schema)?;
    let document = load_document(&args.document)?;

    let report = RefsReport::collect(&document, &schema);
    tracing::info!(
        targets = report.targets.len(),
        origins = report.origins.len(),
        "extraction complete"
    );

    if args.at.is_none() {
        println!("targets:");
        for target in &report.targets {
            println!(
                "  {}  ({} references)",
                describe_target(target),
                report.reference_count(target)
            );
        }
        println!("origins:");
        for origin in &report.origins {
            println!("  {}", describe_origin(origin));
        }
    }

    let selected = report.selected(args.at);
    if let Some(at) = args.at {
        if selected.is_empty() {
            println!("no reference at {at}");
            return Ok(2);
        }
    }

    println!("definitions:");
    for origin in selected {
        println!("  {}", describe_origin(origin));
        if let Origin::Direct(direct) = origin {
            println!("    -> {} {}", direct.target_path, direct.target_range);
            continue;
        }
        let defs = report.definitions(origin);
        if defs.is_empty() {
            println!("    -> (unresolved)");
        }
        for target in defs {
            println!("    -> {}", describe_target(target));
        }
    }

    Ok(0)
}

fn describe_target(target: &Target) -> String {
    let addr = if target.addr.is_empty() {
        &target.local_addr
    } else {
        &target.addr
    };
    let mut text = addr.to_string();
    if let Some(ty) = &target.ty {
        text.push_str(&format!(": {ty}"));
    }
    if !target.scope_id.is_empty() {
        text.push_str(&format!(" [{}]", target.scope_id));
    }
    text.push_str(&format!(" @ {}", target.range));
    text
}

fn describe_origin(origin: &Origin) -> String {
    match origin {
        Origin::Local(o) => format!("local {} @ {}", o.addr, o.range),
        Origin::Path(o) => format!("path {} in {} @ {}", o.target_addr, o.target_path, o.range),
        Origin::Direct(o) => format!("direct {} @ {}", o.target_path, o.range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsem_core::{Attribute, Block, Expression, Pos, Traversal, TraverseStep, Value};

    fn span(line: usize, start: usize, end: usize) -> Range {
        Range::new("main.cfg", Pos::new(line, start, 0), Pos::new(line, end, 0))
    }

    fn schema() -> BodySchema {
        BodySchema::from_descriptor(
            "schema.yaml",
            r#"
attributes:
  out: { constraint: { kind: reference, of_scope_id: variable } }
blocks:
  variable:
    labels: [{ name: name }]
    address:
      steps: [{ kind: static, name: var }, { kind: label, index: 0 }]
      scope_id: variable
      as_reference: true
"#,
        )
        .unwrap()
    }

    /// ```text
    /// 1  variable "region" {}
    /// 2  out = var.region
    /// ```
    fn document() -> Body {
        Body {
            attributes: vec![Attribute {
                name: "out".into(),
                expr: Expression::Traversal(Traversal::new(
                    vec![
                        TraverseStep::Root("var".into()),
                        TraverseStep::Attr("region".into()),
                    ],
                    span(2, 7, 17),
                )),
                range: span(2, 1, 17),
                name_range: span(2, 1, 4),
            }],
            blocks: vec![Block {
                block_type: "variable".into(),
                labels: vec!["region".into()],
                label_ranges: vec![],
                body: Body::default(),
                def_range: span(1, 1, 18),
                range: span(1, 1, 21),
            }],
            range: Range::new("main.cfg", Pos::new(1, 1, 0), Pos::new(3, 1, 0)),
        }
    }

    #[test]
    fn parse_line_pos() {
        let pos: LinePos = "12:9".parse().unwrap();
        assert_eq!(pos, LinePos { line: 12, column: 9 });
        assert_eq!(pos.to_string(), "12:9");
        assert!("12".parse::<LinePos>().is_err());
        assert!("0:4".parse::<LinePos>().is_err());
        assert!("a:b".parse::<LinePos>().is_err());
    }

    #[test]
    fn within_is_end_exclusive() {
        let r = span(2, 7, 17);
        assert!(LinePos { line: 2, column: 7 }.within(&r));
        assert!(LinePos { line: 2, column: 16 }.within(&r));
        assert!(!LinePos { line: 2, column: 17 }.within(&r));
        assert!(!LinePos { line: 1, column: 10 }.within(&r));
    }

    #[test]
    fn definition_at_position() {
        let report = RefsReport::collect(&document(), &schema());
        let selected = report.selected(Some(LinePos { line: 2, column: 9 }));
        assert_eq!(selected.len(), 1);

        let defs = report.definitions(selected[0]);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].addr.to_string(), "var.region");
        assert_eq!(report.reference_count(defs[0]), 1);
    }

    #[test]
    fn nothing_selected_outside_references() {
        let report = RefsReport::collect(&document(), &schema());
        assert!(report.selected(Some(LinePos { line: 1, column: 3 })).is_empty());
        assert_eq!(report.selected(None).len(), report.origins.len());
    }

    #[test]
    fn descriptions() {
        let report = RefsReport::collect(&document(), &schema());
        let target = report.targets.iter().next().unwrap();
        assert_eq!(describe_target(target), "var.region [variable] @ main.cfg:1,1-1,21");
        let origin = report.origins.iter().next().unwrap();
        assert_eq!(describe_origin(origin), "local var.region @ main.cfg:2,7-2,17");
    }

    #[test]
    fn run_refs_reports_missing_position() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.yaml");
        let doc_path = dir.path().join("doc.json");
        std::fs::write(&schema_path, "attributes: {}\n").unwrap();
        std::fs::write(
            &doc_path,
            serde_json::to_string(&Body {
                attributes: vec![Attribute {
                    name: "a".into(),
                    expr: Expression::Literal {
                        value: Value::int(1),
                        range: Range::default(),
                    },
                    range: Range::default(),
                    name_range: Range::default(),
                }],
                ..Default::default()
            })
            .unwrap(),
        )
        .unwrap();

        let args = RefsArgs {
            schema: schema_path,
            document: doc_path,
            at: Some(LinePos { line: 1, column: 1 }),
        };
        assert_eq!(run_refs(&args).unwrap(), 2);

        let all = RefsArgs { at: None, ..args };
        assert_eq!(run_refs(&all).unwrap(), 0);
    }
}
