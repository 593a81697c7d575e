//! Minimal CLI: declare the sample model, then derive docs or check documents.
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use modelkit::{FieldOptions, ModelInstance, SchemaBuilder, SchemaRef};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// declare the built-in Location sample model, derive its schema documents,
/// or check JSON documents against it
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the sample model's hash skeleton
    Skeleton(SkeletonOut),
    /// print the sample model's JSON-Schema style document
    JsonSchema(JsonSchemaOut),
    /// construct each input document against the sample model and report
    Check(CheckSettings),
}

#[derive(Args, Debug)]
struct SkeletonOut {
    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct JsonSchemaOut {
    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CheckSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// print the serialized instance for each document that passes
    #[arg(long, default_value_t = false)]
    emit: bool,

    /// print a JSON report to stdout instead of per-line output
    #[arg(long, default_value_t = false)]
    report: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    checked: usize,
    passed: usize,
    failures: Vec<CheckFailure>,
}

#[derive(Debug, Serialize)]
struct CheckFailure {
    path: String,
    error: String,
}

// ---------------------------------------------------------------------------
// SAMPLE MODEL
// ---------------------------------------------------------------------------

/// The Location/Polygon/Coord model the demo commands run against.
pub fn sample_location_schema() -> anyhow::Result<SchemaRef> {
    let coord = SchemaBuilder::new("Coord")
        .describe("one lat/lng pair on a polygon outline")
        .one("lat", "number", FieldOptions::new().describe("latitude in degrees"))?
        .one("lng", "number", FieldOptions::new().describe("longitude in degrees"))?
        .build();
    let polygon = SchemaBuilder::new("Polygon")
        .many("coords", &coord, FieldOptions::new().describe("outline points, in order"))?
        .build();
    let location = SchemaBuilder::new("Location")
        .describe("a named place with a polygon outline")
        .one("name", "string", FieldOptions::new().describe("display name"))?
        .one("polygon", &polygon, FieldOptions::new())?
        .many("sub_location_ids", "string", FieldOptions::new())?
        .build();
    Ok(location)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATION
// ---------------------------------------------------------------------------

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Skeleton(target) => {
                let location = sample_location_schema()?;
                let source = serde_json::to_string_pretty(&location.skeleton())?;
                write_or_print(target.out.as_ref(), &source)
            }
            Command::JsonSchema(target) => {
                let location = sample_location_schema()?;
                let source = serde_json::to_string_pretty(&location.json_schema())?;
                write_or_print(target.out.as_ref(), &source)
            }
            Command::Check(settings) => run_check(settings),
        }
    }
}

fn run_check(settings: &CheckSettings) -> anyhow::Result<()> {
    let location = sample_location_schema()?;
    let source_paths = resolve_input_patterns(&settings.input)?;
    let checked = source_paths.len();
    let mut failures = Vec::new();
    for source_path in &source_paths {
        let display_path = source_path.display().to_string();
        match check_document(&location, source_path) {
            Ok(instance) => {
                if !settings.report {
                    println!("{} {display_path}", "ok".green().bold());
                }
                if settings.emit {
                    println!("{}", serde_json::to_string_pretty(&instance)?);
                }
            }
            Err(error) => {
                if !settings.report {
                    println!("{} {display_path}: {error:#}", "fail".red().bold());
                }
                failures.push(CheckFailure {
                    path: display_path,
                    error: format!("{error:#}"),
                });
            }
        }
    }
    let failed = failures.len();
    if settings.report {
        let report = CheckReport {
            checked,
            passed: checked - failed,
            failures,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {checked} documents failed validation");
    }
    Ok(())
}

fn check_document(schema: &SchemaRef, path: &Path) -> anyhow::Result<ModelInstance> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let Value::Object(mapping) = value else {
        anyhow::bail!("top-level JSON must be an object");
    };
    Ok(schema.construct(mapping)?)
}

fn write_or_print(out: Option<&PathBuf>, content: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, content)
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{content}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// INTERNAL HELPERS
// ---------------------------------------------------------------------------

fn resolve_input_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in
                glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))?
            {
                let path = entry.with_context(|| format!("unreadable match for: {pattern}"))?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                // an explicit glob that matches nothing is an error, not a no-op
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }
    Ok(out)
}
