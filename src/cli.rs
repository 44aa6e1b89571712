//! Minimal CLI: metamodel → (rust | stats)
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::codegen::Codegen;
use crate::config::GeneratorConfig;
use crate::ir::MetaModel;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Rust data types and JSON codecs from a protocol metamodel
#[derive(Parser, Debug)]
#[command(name = "metamodel-codegen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit Rust types and codecs
    Rust(RustOut),
    /// print entity counts for the metamodel
    Stats(StatsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// the metamodel JSON document
    #[arg(long, short)]
    input: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct RustOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON file with `excluded` and `stringAliases` name lists (built-in defaults if omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// output .rs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct StatsOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_model(&self) -> anyhow::Result<MetaModel> {
        tracing::info!(input = %self.input.display(), "loading metamodel");
        crate::path_de::load_json_file(&self.input)
            .with_context(|| format!("failed to load metamodel {}", self.input.display()))
    }
}

impl RustOut {
    fn load_config(&self) -> anyhow::Result<GeneratorConfig> {
        match self.config.as_ref() {
            None => Ok(GeneratorConfig::default()),
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("failed to load generator config {}", path.display())),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Rust(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let model = target.input_settings.load_model()?;
                let config = target.load_config()?;

                let mut cg = Codegen::new(&config);
                cg.emit(&model);
                let rust_src = cg.into_string();

                match target.out.as_ref() {
                    Some(out) => write_output(out, &rust_src)?,
                    None => print!("{rust_src}"),
                }
                Ok(())
            }
            Command::Stats(target) => {
                let model = target.input_settings.load_model()?;
                print_stats(&model);
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: &Path, source: &str) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, source).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(out = %out.display(), "wrote generated source");
    Ok(())
}

fn print_stats(model: &MetaModel) {
    println!("{} {}", "metamodel".bold(), model.meta_data.version.cyan());
    let rows = [
        ("enumerations", model.enumerations.len()),
        ("structures", model.structures.len()),
        ("type aliases", model.type_aliases.len()),
        ("requests", model.requests.len()),
        ("notifications", model.notifications.len()),
    ];
    for (label, count) in rows {
        println!("  {:<14} {}", label, count.to_string().green());
    }
}
