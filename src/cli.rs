//! Minimal CLI: read JSON documents → (get | set) a value by key path
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use crate::access::Accessor;
use crate::config::AccessPolicy;
use crate::keypath::KeyPath;
use crate::logging::LogFormat;
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// read or write values nested inside JSON documents by dotted key path (e.g. `a.1.b`)
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// log output format (stderr); filter with RUST_LOG
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the value at a key path for each document (`null` when absent)
    Get(GetOut),
    /// write a value at a key path and print the resulting documents
    Set(SetOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// dotted key path, e.g. `0.subarray.1.leaf`
    #[arg(long, short)]
    path: String,

    /// report out-of-range indices and missing keys as errors
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// refuse writes whose kind differs from the container's elements
    #[arg(long, default_value_t = false)]
    kind_check: bool,
}

#[derive(clap::Parser, Debug)]
struct GetOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct SetOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// the value to write, as JSON text (`99`, `"text"`, `{"k": 1}`)
    #[arg(long)]
    value: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One parsed document and where it came from.
struct Document {
    source: String,
    json: serde_json::Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let json = serde_json::from_str::<serde_json::Value>(line).with_context(|| {
                        format!("failed to parse JSON line {} of {source_path_str}", line_no + 1)
                    })?;
                    documents.push(Document { source: format!("{source_path_str}:{}", line_no + 1), json });
                }
            } else {
                let json = serde_json::from_str::<serde_json::Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                documents.push(Document { source: source_path_str, json });
            }
        }
        debug!(count = documents.len(), "loaded documents");
        Ok(documents)
    }

    fn key_path(&self) -> Result<KeyPath> {
        self.path.parse::<KeyPath>().context("--path must not be empty")
    }

    fn accessor(&self) -> Accessor {
        let policy = if self.strict { AccessPolicy::strict() } else { AccessPolicy::default() };
        Accessor::new(policy.with_kind_check(self.kind_check))
    }

    /// Subnode selected by `--json-pointer`, or the whole document.
    fn select<'a>(&self, doc: &'a mut Document) -> Result<&'a mut serde_json::Value> {
        match self.json_pointer.as_deref() {
            None => Ok(&mut doc.json),
            Some(pointer) => doc
                .json
                .pointer_mut(pointer)
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {}", doc.source)),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Get(target) => {
                let settings = &target.input_settings;
                let path = settings.key_path()?;
                let accessor = settings.accessor();
                for mut doc in settings.load_documents()? {
                    let tree = Value::from(settings.select(&mut doc)?.take());
                    let found = accessor
                        .get(&tree, &path)
                        .with_context(|| format!("failed to read `{path}` in {}", doc.source))?;
                    let out = found.cloned().unwrap_or(Value::Null);
                    println!("{out}");
                }
                Ok(())
            }
            Command::Set(target) => {
                let settings = &target.input_settings;
                let path = settings.key_path()?;
                let accessor = settings.accessor();
                let value: Value = serde_json::from_str::<serde_json::Value>(&target.value)
                    .context("--value must be JSON text")?
                    .into();

                let mut rendered = Vec::new();
                for mut doc in settings.load_documents()? {
                    let source = doc.source.clone();
                    let node = settings.select(&mut doc)?;
                    let mut tree = Value::from(node.take());
                    accessor
                        .set(&mut tree, Some(value.clone()), &path)
                        .with_context(|| format!("failed to write `{path}` in {source}"))?;
                    *node = tree.into();
                    info!(%source, %path, "updated document");
                    rendered.push(if settings.ndjson {
                        serde_json::to_string(&doc.json)?
                    } else {
                        serde_json::to_string_pretty(&doc.json)?
                    });
                }

                let output = rendered.join("\n");
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, format!("{output}\n"))
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{output}");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CommandLineInterface::command().debug_assert();
    }

    #[test]
    fn literal_paths_pass_through() {
        let out = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(out, vec![PathBuf::from("a.json"), PathBuf::from("dir/b.json")]);
    }

    #[test]
    fn braces_are_literal_path_characters() {
        let out = resolve_file_path_patterns(["data/{id}.json"]).unwrap();
        assert_eq!(out, vec![PathBuf::from("data/{id}.json")]);
    }

    #[test]
    fn unmatched_glob_is_an_error() {
        assert!(resolve_file_path_patterns(["/nonexistent-dir/*.json"]).is_err());
    }

    #[test]
    fn set_rewrites_selected_subnode() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        let out = dir.path().join("out/doc.json");
        std::fs::write(&input, r#"{"data": {"a": [{"b": 10}, {"b": 20}]}}"#).unwrap();

        let cli = CommandLineInterface::try_parse_from([
            "keypath-box", "set",
            "--input", input.to_str().unwrap(),
            "--json-pointer", "/data",
            "--path", "a.1.b",
            "--value", "99",
            "--out", out.to_str().unwrap(),
        ]).unwrap();
        cli.run().unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"data": {"a": [{"b": 10}, {"b": 99}]}}));
    }

    #[test]
    fn strict_get_fails_on_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        std::fs::write(&input, "[1, 2, 3]").unwrap();

        let cli = CommandLineInterface::try_parse_from([
            "keypath-box", "get", "--strict",
            "--input", input.to_str().unwrap(),
            "--path", "5",
        ]).unwrap();
        assert!(cli.run().is_err());
    }
}
