use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::store::CollectionItem;
use crate::cli::{IndexOptions, OutputFormat};
use crate::core::category::Category;
use crate::core::preset::Preset;
use crate::core::types::{Geometry, PresetId};
use crate::presets::PresetIndex;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List presets in the catalog
    List {
        /// Only presets usable for this geometry
        #[arg(short, long)]
        geometry: Option<Geometry>,

        /// Include presets hidden from search
        #[arg(long)]
        all: bool,
    },

    /// Show details of a preset or category
    Show {
        /// Preset or category ID (e.g., "amenity/cafe")
        #[arg(required = true)]
        id: String,
    },

    /// Export the catalog to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,
    },
}

pub fn run(
    args: CatalogArgs,
    options: &IndexOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let index = options.build()?;

    if verbose {
        eprintln!(
            "Loaded catalog with {} presets, {} categories, {} fields",
            index.catalog().len(),
            index.catalog().categories().len(),
            index.catalog().fields().len()
        );
    }

    match args.command {
        CatalogCommands::List { geometry, all } => run_list(&index, geometry, all, format),
        CatalogCommands::Show { id } => run_show(&index, &PresetId::new(id), format),
        CatalogCommands::Export { output } => run_export(&index, output),
    }
}

fn geometry_list(geometry: &[Geometry]) -> String {
    geometry
        .iter()
        .map(|g| g.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn tag_list(preset: &Preset) -> String {
    preset
        .tags
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.values().join("|")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_list(
    index: &PresetIndex,
    geometry: Option<Geometry>,
    all: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let filtered: Vec<&Preset> = index
        .catalog()
        .presets()
        .iter()
        .filter(|p| all || p.searchable)
        .filter(|p| geometry.map_or(true, |g| p.match_geometry(g)))
        .collect();

    match format {
        OutputFormat::Text => {
            let id_width = filtered
                .iter()
                .map(|p| p.id.as_str().len())
                .max()
                .unwrap_or(2)
                .max(2);
            let name_width = filtered
                .iter()
                .map(|p| p.name.len().min(30))
                .max()
                .unwrap_or(4)
                .max(4);

            println!("Preset Catalog ({} presets)\n", filtered.len());
            println!(
                "{:<id_w$} {:<name_w$} {:<28} Tags",
                "ID",
                "Name",
                "Geometry",
                id_w = id_width,
                name_w = name_width
            );
            println!("{}", "-".repeat(id_width + name_width + 40));

            for preset in &filtered {
                let name: String = preset.name.chars().take(30).collect();
                println!(
                    "{:<id_w$} {:<name_w$} {:<28} {}",
                    preset.id,
                    name,
                    geometry_list(&preset.geometry),
                    tag_list(preset),
                    id_w = id_width,
                    name_w = name_width
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = filtered
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "id": p.id,
                        "name": p.name,
                        "geometry": p.geometry,
                        "tags": p.tags,
                        "match_score": p.match_score,
                        "searchable": p.searchable,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tgeometry\ttags");
            for preset in &filtered {
                println!(
                    "{}\t{}\t{}\t{}",
                    preset.id,
                    preset.name,
                    geometry_list(&preset.geometry),
                    tag_list(preset)
                );
            }
        }
    }

    Ok(())
}

fn run_show(index: &PresetIndex, id: &PresetId, format: OutputFormat) -> anyhow::Result<()> {
    let item = index
        .catalog()
        .item(id)
        .ok_or_else(|| anyhow::anyhow!("Preset '{}' not found", id))?;

    match item {
        CollectionItem::Preset(preset) => show_preset(index, preset, format),
        CollectionItem::Category(category) => show_category(category, format),
    }
}

fn show_preset(index: &PresetIndex, preset: &Preset, format: OutputFormat) -> anyhow::Result<()> {
    let catalog = index.catalog();
    let fields: Vec<&str> = catalog
        .preset_fields(&preset.id)
        .into_iter()
        .map(|f| f.id.as_str())
        .collect();
    let more_fields: Vec<&str> = catalog
        .preset_more_fields(&preset.id)
        .into_iter()
        .map(|f| f.id.as_str())
        .collect();

    match format {
        OutputFormat::Text => {
            println!("Preset: {}\n", preset.name);
            println!("ID:          {}", preset.id);
            println!("Geometry:    {}", geometry_list(&preset.geometry));
            println!("Tags:        {}", tag_list(preset));
            let add_tags: Vec<String> = preset
                .add_tags
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            println!("Add tags:    {}", add_tags.join(" "));
            println!("Match score: {}", preset.match_score);
            println!("Searchable:  {}", preset.searchable);
            println!("Addable:     {}", preset.addable());

            if let Some(replacement) = &preset.replacement {
                println!("Replaced by: {}", replacement);
            }
            if !preset.terms.is_empty() {
                println!("\nTerms: {}", preset.terms.join(", "));
            }
            if !fields.is_empty() {
                println!("\nFields: {}", fields.join(", "));
            }
            if !more_fields.is_empty() {
                println!("More fields: {}", more_fields.join(", "));
            }
        }
        OutputFormat::Json => {
            let mut output = serde_json::to_value(preset.to_definition())?;
            if let Some(obj) = output.as_object_mut() {
                obj.insert("id".to_string(), serde_json::json!(preset.id));
                obj.insert("resolvedFields".to_string(), serde_json::json!(fields));
                obj.insert("resolvedMoreFields".to_string(), serde_json::json!(more_fields));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tgeometry\ttags\tfields");
            println!(
                "{}\t{}\t{}\t{}\t{}",
                preset.id,
                preset.name,
                geometry_list(&preset.geometry),
                tag_list(preset),
                fields.join(",")
            );
        }
    }

    Ok(())
}

fn show_category(category: &Category, format: OutputFormat) -> anyhow::Result<()> {
    let members: Vec<&str> = category.members.iter().map(PresetId::as_str).collect();

    match format {
        OutputFormat::Text => {
            println!("Category: {}\n", category.name);
            println!("ID:       {}", category.id);
            println!("Geometry: {}", geometry_list(&category.geometry));
            println!("Members:  {}", members.join(", "));
        }
        OutputFormat::Json => {
            let mut output = serde_json::to_value(category.to_definition())?;
            if let Some(obj) = output.as_object_mut() {
                obj.insert("id".to_string(), serde_json::json!(category.id));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tgeometry\tmembers");
            println!(
                "{}\t{}\t{}\t{}",
                category.id,
                category.name,
                geometry_list(&category.geometry),
                members.join(",")
            );
        }
    }

    Ok(())
}

fn run_export(index: &PresetIndex, output: PathBuf) -> anyhow::Result<()> {
    let json = index.catalog().to_json()?;
    std::fs::write(&output, json)?;

    println!(
        "Exported {} presets to {}",
        index.catalog().len(),
        output.display()
    );

    Ok(())
}
