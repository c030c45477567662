//! Meow Brush command line
//!
//! Inspects and maintains the panel configuration stored on disk.
//!
//! # Usage
//!
//! ```bash
//! # List tool shortcuts and the favorites pinned under the eraser
//! meow-brush tools
//! meow-brush favorites --tool eraser
//!
//! # Back up and restore
//! meow-brush export
//! meow-brush export --out - > backup.json
//! meow-brush import brush-toolbar-config.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use meow_brush_lib::favorites::FavoritesRegistry;
use meow_brush_lib::settings::{self, DisplaySettings, ViewMode};
use meow_brush_lib::store::FileStore;
use meow_brush_lib::tools::ToolRegistry;

/// Meow Brush - brush favorites and tool shortcuts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Preference file. Defaults to the platform config directory:
    /// - Linux: ~/.config/meow-brush-favorites/preferences.json
    /// - macOS: ~/Library/Application Support/meow-brush-favorites/preferences.json
    /// - Windows: %APPDATA%\meow-brush-favorites\preferences.json
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tool shortcuts in toolbar order
    Tools,

    /// List favorites, optionally only those of one tool shortcut
    Favorites {
        #[arg(long)]
        tool: Option<String>,
    },

    /// Write the configuration document to a file, or to stdout with `-`
    Export {
        #[arg(short, long, default_value = settings::EXPORT_FILE_NAME)]
        out: PathBuf,
    },

    /// Replace tools, favorites and display settings from an exported document
    Import { path: PathBuf },

    /// Restore default tools and settings and remove all favorites
    Reset,

    /// Show the favorites view mode, or set it
    ViewMode { mode: Option<ViewMode> },
}

fn open_store(path: Option<PathBuf>) -> anyhow::Result<FileStore> {
    let path = match path {
        Some(path) => path,
        None => FileStore::default_path().context("No config directory on this platform")?,
    };
    FileStore::open(&path).with_context(|| format!("Failed to open store {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    meow_brush_lib::init_logging_with(if args.verbose { "debug" } else { "warn" });

    let store = open_store(args.store)?;
    tracing::debug!("[Store] Using {}", store.path().display());

    match args.command {
        Command::Tools => {
            let tools = ToolRegistry::load(store);
            for tool in tools.tools() {
                let color = tool.color.as_deref().unwrap_or("-");
                println!("{:<28} {:<8} {:<9} {}", tool.id, tool.kind.id(), color, tool.name);
            }
        }
        Command::Favorites { tool } => {
            let favorites = FavoritesRegistry::load(store);
            let entries: Vec<_> = match &tool {
                Some(tool_id) => favorites.filter_by_tool(tool_id),
                None => favorites.entries().iter().collect(),
            };
            for entry in entries {
                let kind = entry.kind.host_ref();
                let icon = entry.icon_key.clone().unwrap_or_else(|| entry.monogram(2));
                println!(
                    "{:<16} {:<10} {:<10} {:<6} {}",
                    entry.id,
                    entry.tool_id(),
                    kind,
                    icon,
                    entry.name
                );
            }
        }
        Command::Export { out } => {
            let document = settings::export_config(&store, &DisplaySettings::load(&store))?;
            if out.as_os_str() == "-" {
                println!("{}", document);
            } else {
                std::fs::write(&out, document)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                println!("Exported to {}", out.display());
            }
        }
        Command::Import { path } => {
            let document = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            settings::import_config(&store, &document)?;
            let tools = ToolRegistry::load(store.clone());
            let favorites = FavoritesRegistry::load(store);
            println!(
                "Imported {} tools and {} favorites",
                tools.tools().len(),
                favorites.entries().len()
            );
        }
        Command::Reset => {
            settings::reset_to_defaults(&store)?;
            let tools = ToolRegistry::load(store);
            println!("Reset to {} default tools", tools.tools().len());
        }
        Command::ViewMode { mode } => match mode {
            Some(mode) => {
                anyhow::ensure!(mode.save(&store), "Failed to save view mode");
                println!("{}", mode);
            }
            None => println!("{}", ViewMode::load(&store)),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_defaults_to_config_file_name() {
        let args = Args::try_parse_from(["meow-brush", "export"]).unwrap();
        match args.command {
            Command::Export { out } => assert_eq!(out, PathBuf::from(settings::EXPORT_FILE_NAME)),
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::try_parse_from(["meow-brush", "export", "--out", "-"]).unwrap();
        assert!(matches!(args.command, Command::Export { out } if out.as_os_str() == "-"));
    }
}
