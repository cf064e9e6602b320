//! CR-005: CLI subcommands — init, validate, show, schema.

use crate::core::recipe::{self, Recipe, ENTRY_SECTIONS};
use crate::core::template::ComputeTemplate;
use crate::core::types::{EntriesMap, ExecutableEntry};
use clap::Subcommand;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter recipe
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Parse, classify, and validate a recipe
    Validate {
        /// Path to the recipe
        #[arg(short, long, default_value = "recipe.yaml")]
        file: PathBuf,
    },

    /// Show the classified entries of a recipe
    Show {
        /// Path to the recipe
        #[arg(short, long, default_value = "recipe.yaml")]
        file: PathBuf,

        /// Only show this entry (e.g. lifecycle/start)
        #[arg(short, long)]
        entry: Option<String>,

        /// Output JSON instead of a text tree
        #[arg(long)]
        json: bool,
    },

    /// Print the JSON schema of compute templates
    Schema,
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Show { file, entry, json } => cmd_show(&file, entry.as_deref(), json),
        Commands::Schema => cmd_schema(),
    }
}

const STARTER_RECIPE: &str = r#"name: my-service
description: "Describe the service here"

lifecycle:
  install: install.sh
  start: [./start.sh]
  stop: !script |
    shutdown()

custom_commands: {}

templates:
  default:
    image_id: ubuntu-22.04
    machine_memory_mb: 1600
    remote_directory: /opt/my-service
    local_directory: upload
    key_file: ENTER_KEY_FILE_NAME
"#;

fn cmd_init(path: &Path) -> Result<(), String> {
    let recipe_path = path.join("recipe.yaml");
    if recipe_path.exists() {
        return Err(format!("{} already exists", recipe_path.display()));
    }
    std::fs::write(&recipe_path, STARTER_RECIPE)
        .map_err(|e| format!("cannot write {}: {}", recipe_path.display(), e))?;

    println!("Initialized recipe at {}", path.display());
    println!("  Created: {}", recipe_path.display());
    println!("  Set templates.default.key_file before validating");
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let recipe = recipe::load_recipe(file)?;
    let errors = recipe::validate_recipe(&recipe);

    if errors.is_empty() {
        println!(
            "OK: {} ({} lifecycle entries, {} custom commands, {} templates)",
            recipe.name,
            recipe.lifecycle.len(),
            recipe.custom_commands.len(),
            recipe.templates.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_show(file: &Path, entry: Option<&str>, json: bool) -> Result<(), String> {
    let recipe = recipe::load_recipe(file)?;
    let output = match entry {
        Some(path) => render_selected(&recipe, path, json)?,
        None if json => render_recipe_json(&recipe)?,
        None => render_recipe_text(&recipe),
    };
    print!("{}", output);
    Ok(())
}

fn cmd_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(ComputeTemplate);
    let json = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("cannot serialize schema: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Render one section or entry selected by path.
fn render_selected(recipe: &Recipe, path: &str, json: bool) -> Result<String, String> {
    let trimmed = path.trim_matches('/');
    if let Some(section) = recipe.section(trimmed) {
        return if json {
            to_json(section)
        } else {
            Ok(render_section(trimmed, section))
        };
    }

    let entry = recipe
        .find(trimmed)
        .ok_or_else(|| format!("no entry '{}' in recipe '{}'", path, recipe.name))?;
    if json {
        return to_json(entry);
    }
    let (parent, key) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
    let mut out = String::new();
    if !parent.is_empty() {
        let _ = writeln!(out, "{}", parent);
    }
    write_entry(&mut out, key, entry, usize::from(!parent.is_empty()));
    Ok(out)
}

fn render_recipe_json(recipe: &Recipe) -> Result<String, String> {
    let doc = serde_json::json!({
        "name": recipe.name,
        "lifecycle": recipe.lifecycle,
        "custom_commands": recipe.custom_commands,
    });
    to_json(&doc)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("JSON error: {}", e))
}

/// Render every entry section as an indented text tree.
fn render_recipe_text(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Recipe: {}", recipe.name);
    for name in ENTRY_SECTIONS {
        if let Some(section) = recipe.section(name) {
            let _ = writeln!(out);
            out.push_str(&render_section(name, section));
        }
    }
    out
}

fn render_section(name: &str, entries: &EntriesMap) -> String {
    let leaves: usize = entries.values().map(ExecutableEntry::leaf_count).sum();
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} entries, {} actions)", name, entries.len(), leaves);
    for (key, entry) in entries {
        write_entry(&mut out, key, entry, 1);
    }
    out
}

fn write_entry(out: &mut String, key: &str, entry: &ExecutableEntry, depth: usize) {
    let pad = "  ".repeat(depth);
    match entry {
        ExecutableEntry::Command(command) => {
            let _ = writeln!(out, "{}{}: {}", pad, key, command);
        }
        ExecutableEntry::Commands(commands) => {
            let _ = writeln!(out, "{}{}:", pad, key);
            for command in commands {
                let _ = writeln!(out, "{}  - {}", pad, command);
            }
        }
        ExecutableEntry::Script(script) => {
            let _ = writeln!(out, "{}{}: !script", pad, key);
            for line in script.source().lines() {
                let _ = writeln!(out, "{}  | {}", pad, line);
            }
        }
        ExecutableEntry::Map(entries) => {
            let _ = writeln!(out, "{}{}:", pad, key);
            for (sub_key, sub_entry) in entries {
                write_entry(out, sub_key, sub_entry, depth + 1);
            }
        }
    }
}
