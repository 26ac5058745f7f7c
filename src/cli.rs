//! Minimal CLI: JSON Schema → (ir | schema)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use schema_bridge::format::JSON_SCHEMA;
use schema_bridge::{ingest_str, render_string, Namer, SchemaRenderer, TypeContext, TypeGraph};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer types from JSON Schema documents and print the type graph or a regenerated schema
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// log at debug level (RUST_LOG still wins when set)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ingest and print the populated type graph as JSON
    Ir(IrOut),
    /// ingest and regenerate a JSON Schema document from the type graph
    Schema(JsonSchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// top-level type name (single input only; defaults to the file stem)
    #[arg(long)]
    top_level: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct IrOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct JsonSchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted; `.schema` is appended when there is no extension)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// names generated records must never use
    #[arg(long = "forbid", value_name = "NAME")]
    forbidden: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Ingest every input into one graph; top-level names come from file stems.
    fn load_graph(&self) -> Result<TypeGraph> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        if self.top_level.is_some() && source_paths.len() > 1 {
            bail!("--top-level can only be used with a single input");
        }
        let mut graph = TypeGraph::new();
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {}", source_path.display()))?;
            let name = match &self.top_level {
                Some(name) => name.clone(),
                None => top_level_name(&source_path),
            };
            ingest_str(&mut graph, &source, &name)
                .with_context(|| format!("failed to ingest {}", source_path.display()))?;
        }
        Ok(graph)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_tracing(&self) {
        let default = if self.verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Ir(target) => {
                let graph = target.input_settings.load_graph()?;
                let namer = Namer::default();
                let renderer = SchemaRenderer::new(&graph, &namer);
                let top_levels = graph
                    .top_levels()
                    .iter()
                    .map(|(name, ty)| (name.clone(), json!({
                        "type": ty,
                        "summary": namer.name_for_type(ty, renderer.names()),
                    })))
                    .collect::<serde_json::Map<_, _>>();
                let records = graph
                    .records()
                    .map(|(id, record)| json!({
                        "id": id,
                        "name": renderer.names().get(&id),
                        "record": record,
                    }))
                    .collect::<Vec<_>>();
                let dump = json!({ "records": records, "top_levels": top_levels });
                println!("{}", serde_json::to_string_pretty(&dump)?);
            }
            Command::Schema(target) => {
                let graph = target.input_settings.load_graph()?;
                let namer = Namer::new(target.forbidden.iter().cloned());
                let schema_src = render_string(&graph, &namer)?;
                if let Some(out) = target.out.as_ref() {
                    let out = with_default_extension(out);
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                    std::fs::write(&out, &schema_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    tracing::info!(path = %out.display(), format = JSON_SCHEMA.display_name, "wrote schema");
                } else {
                    print!("{schema_src}");
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn top_level_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "TopLevel".to_string())
}

fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(JSON_SCHEMA.extension)
    }
}

/// Characters that make an input a glob pattern rather than a literal path.
const GLOB_META: [char; 3] = ['*', '?', '['];

fn expand_input(input: &str) -> Result<Vec<PathBuf>> {
    if !input.contains(GLOB_META) {
        return Ok(vec![PathBuf::from(input)]);
    }
    let matches = glob::glob(input)
        .with_context(|| format!("invalid glob pattern: {input}"))?
        .collect::<Result<Vec<_>, _>>()?;
    if matches.is_empty() {
        bail!("glob pattern matched no files: {input}");
    }
    Ok(matches)
}

/// Expand every input in order; literal paths are taken as given.
fn resolve_file_path_patterns<I>(inputs: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = Vec::new();
    for input in inputs {
        out.extend(expand_input(input.as_ref())?);
    }
    Ok(out)
}
