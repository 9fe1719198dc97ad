//! presetkit - ディレクトリに保存した preset をコマンドラインから操作する
//!
//! ```bash
//! presetkit --dir ./presets --key retirement add "Early" --input '{"age":55}' --tag aggressive
//! presetkit --key retirement list
//! presetkit --key retirement export --out retirement.json
//! presetkit --key college import retirement.json
//! ```
//!
//! ログは stderr、結果は stdout に出します（パイプで扱えるように）。

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use presetkit_core::{PresetConfig, PresetId, PresetLibrary, PresetPatch, TagId, TagType};

#[derive(Parser, Debug)]
#[command(name = "presetkit", version, about = "Manage saved calculator presets")]
struct Cli {
    /// TOML config file (missing file means defaults)
    #[arg(long, global = true, env = "PRESETKIT_CONFIG", default_value = "presetkit.toml")]
    config: PathBuf,

    /// Storage directory, overrides `storage_dir`
    #[arg(long, global = true, env = "PRESETKIT_DIR")]
    dir: Option<PathBuf>,

    /// Store key, overrides `key`
    #[arg(long, global = true, env = "PRESETKIT_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print presets in order
    List,

    /// Print one preset as JSON
    Show { id: String },

    Add {
        name: String,
        /// Input payload as JSON
        #[arg(long)]
        input: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<TagType>,
    },

    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        input: Option<String>,
    },

    Remove { id: String },

    Duplicate { id: String },

    /// Remove every preset under the key
    Clear,

    /// Move the preset at index `from` to index `to`
    Reorder { from: usize, to: usize },

    Tag {
        id: String,
        tag_type: TagType,
        #[arg(long)]
        label: Option<String>,
    },

    Untag { id: String, tag_id: String },

    /// Write an export envelope
    Export {
        /// File name hint, overrides `export_hint`
        #[arg(long)]
        hint: Option<String>,
        /// Output path (defaults to the generated file name)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import an export file (or a bare array) and merge it
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_tracing(&config.log_level);

    let stdout = io::stdout();
    run(cli.command, &config, &mut stdout.lock())
}

fn resolve_config(cli: &Cli) -> Result<PresetConfig> {
    let mut config = PresetConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(dir) = &cli.dir {
        config.storage_dir = dir.clone();
    }
    if let Some(key) = &cli.key {
        config.key = key.clone();
    }
    Ok(config)
}

/// `RUST_LOG` wins over the config level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("presetkit={level},presetkit_core={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_input(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("--input is not valid JSON: {raw}"))
}

fn run(command: Command, config: &PresetConfig, out: &mut impl Write) -> Result<()> {
    let mut library = PresetLibrary::<Value>::from_config(config)
        .with_context(|| format!("opening store {:?}", config.key))?;

    match command {
        Command::List => {
            for (index, preset) in library.store().presets().iter().enumerate() {
                let tags: Vec<&str> = preset.tags.iter().map(|t| t.tag_type.as_str()).collect();
                writeln!(out, "{index}\t{}\t{}\t[{}]", preset.id, preset.name, tags.join(","))?;
            }
        }

        Command::Show { id } => {
            let id = PresetId::new(id);
            let Some(preset) = library.store().get(&id) else {
                bail!("no preset with id {id}");
            };
            writeln!(out, "{}", serde_json::to_string_pretty(preset)?)?;
        }

        Command::Add {
            name,
            input,
            description,
            tags,
        } => {
            let input = parse_input(&input)?;
            let store = library.store_mut();
            let preset = store.add(&name, input, description, Vec::new())?;
            for tag_type in tags {
                store.add_tag(&preset.id, tag_type, None)?;
            }
            writeln!(out, "{}", preset.id)?;
        }

        Command::Edit {
            id,
            name,
            description,
            clear_description,
            input,
        } => {
            let id = existing(&library, id)?;
            let mut patch = PresetPatch::new();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if let Some(description) = description {
                patch = patch.description(description);
            }
            if clear_description {
                patch = patch.clear_description();
            }
            if let Some(input) = input {
                patch = patch.input(parse_input(&input)?);
            }
            if patch.is_empty() {
                bail!("nothing to edit");
            }
            library.store_mut().edit(&id, patch)?;
        }

        Command::Remove { id } => {
            let id = existing(&library, id)?;
            library.store_mut().remove(&id)?;
        }

        Command::Duplicate { id } => {
            let id = existing(&library, id)?;
            if let Some(copy) = library.store_mut().duplicate(&id)? {
                writeln!(out, "{}", copy.id)?;
            }
        }

        Command::Clear => {
            let removed = library.store().len();
            library.store_mut().clear()?;
            writeln!(out, "removed {removed} presets")?;
        }

        Command::Reorder { from, to } => {
            library.store_mut().reorder(from, to)?;
        }

        Command::Tag { id, tag_type, label } => {
            let id = existing(&library, id)?;
            library.store_mut().add_tag(&id, tag_type, label.as_deref())?;
            if let Some(tag) = library.store().get(&id).and_then(|p| p.tag(tag_type)) {
                writeln!(out, "{}", tag.id)?;
            }
        }

        Command::Untag { id, tag_id } => {
            let id = existing(&library, id)?;
            library.store_mut().remove_tag(&id, &TagId::new(tag_id))?;
        }

        Command::Export { hint, out: path } => {
            let file = match hint {
                Some(hint) => library.export_as(&hint)?,
                None => library.export()?,
            };
            let path = path.unwrap_or_else(|| PathBuf::from(&file.file_name));
            fs::write(&path, &file.bytes)
                .with_context(|| format!("writing export to {}", path.display()))?;
            writeln!(out, "{}", path.display())?;
        }

        Command::Import { path } => {
            let bytes =
                fs::read(&path).with_context(|| format!("reading import file {}", path.display()))?;
            let result = library.import(&bytes)?;
            if let Some(message) = result.error_message() {
                bail!("import failed: {message}");
            }
            writeln!(
                out,
                "imported {} presets ({} duplicates skipped)",
                result.presets.len(),
                result.duplicates_skipped
            )?;
        }
    }

    Ok(())
}

fn existing(library: &PresetLibrary<Value>, id: String) -> Result<PresetId> {
    let id = PresetId::new(id);
    if library.store().get(&id).is_none() {
        bail!("no preset with id {id}");
    }
    Ok(id)
}
