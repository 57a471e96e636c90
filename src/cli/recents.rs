use clap::{Args, Subcommand};

use crate::cli::{IndexOptions, OutputFormat};
use crate::core::types::{Geometry, PresetId};
use crate::presets::PresetIndex;
use crate::recents::ledger::RibbonItem;

#[derive(Args)]
pub struct RecentsArgs {
    #[command(subcommand)]
    pub command: RecentsCommands,
}

#[derive(Subcommand)]
pub enum RecentsCommands {
    /// List recently used presets, newest first
    List,

    /// Record a preset as just used
    Add {
        /// Preset ID
        id: String,

        /// Geometry the preset was used for
        #[arg(short, long, default_value = "point")]
        geometry: Geometry,
    },

    /// Forget a recently used preset
    Remove {
        /// Preset ID
        id: String,

        #[arg(short, long, default_value = "point")]
        geometry: Geometry,
    },

    /// Move a recent preset in front of another
    Move {
        /// Preset ID to move
        id: String,

        #[arg(short, long, default_value = "point")]
        geometry: Geometry,

        /// Preset ID to place it before
        #[arg(long)]
        before: String,

        /// Geometry of the preset to place it before (defaults to --geometry)
        #[arg(long)]
        before_geometry: Option<Geometry>,
    },
}

pub fn run(
    args: RecentsArgs,
    options: &IndexOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    if options.recents.is_none() {
        eprintln!("Note: no --recents file given; changes will not be saved");
    }
    let mut index = options.build()?;

    match args.command {
        RecentsCommands::List => {}
        RecentsCommands::Add { id, geometry } => {
            let id = PresetId::new(id);
            let preset = index
                .item(&id)
                .ok_or_else(|| anyhow::anyhow!("Preset '{}' not found", id))?;
            if !preset.searchable {
                eprintln!("Preset '{}' is not searchable and is not recorded", id);
            }
            index.set_most_recent(&id, geometry);
        }
        RecentsCommands::Remove { id, geometry } => {
            index.remove_recent(&PresetId::new(id), geometry);
        }
        RecentsCommands::Move {
            id,
            geometry,
            before,
            before_geometry,
        } => {
            let item = RibbonItem::recent(PresetId::new(id), geometry);
            let before_geometry = before_geometry.unwrap_or(geometry);
            let before = RibbonItem::recent(PresetId::new(before), before_geometry);
            if !index.move_recent(&item, &before) {
                anyhow::bail!(
                    "Cannot move '{}' before '{}': both must be distinct recent presets",
                    item.preset,
                    before.preset
                );
            }
        }
    }

    print_recents(&mut index, format, verbose)
}

fn print_recents(
    index: &mut PresetIndex,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let items = index.get_recents().to_vec();
    if verbose {
        eprintln!("{} recent presets", items.len());
    }

    match format {
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No recent presets");
            }
            for (i, item) in items.iter().enumerate() {
                let name = index.item(&item.preset).map_or("", |p| p.name.as_str());
                println!("{:>3}. {:<32} {:<8} {}", i + 1, item.preset, item.geometry, name);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Tsv => {
            println!("rank\tid\tgeometry");
            for (i, item) in items.iter().enumerate() {
                println!("{}\t{}\t{}", i + 1, item.preset, item.geometry);
            }
        }
    }

    Ok(())
}
