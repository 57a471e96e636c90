use clap::Args;

use crate::cli::{IndexOptions, OutputFormat};
use crate::core::types::Geometry;
use crate::matching::engine::{MatchSource, PresetMatch};
use crate::presets::PresetIndex;
use crate::utils::validation::parse_tags;

#[derive(Args)]
pub struct MatchArgs {
    /// Geometry of the feature (point, vertex, line, area, relation)
    #[arg(short, long, default_value = "point")]
    pub geometry: Geometry,

    /// Tags as key=value pairs
    pub tags: Vec<String>,
}

fn source_name(source: MatchSource) -> &'static str {
    match source {
        MatchSource::Scored => "scored",
        MatchSource::Address => "address",
        MatchSource::Fallback => "fallback",
    }
}

pub fn run(
    args: MatchArgs,
    options: &IndexOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let tags = parse_tags(&args.tags)?;
    let index = options.build()?;

    if verbose {
        eprintln!(
            "Matching {} tags as {} against {} presets",
            tags.len(),
            args.geometry,
            index.catalog().len()
        );
    }

    let found = index.find_match(&tags, args.geometry);

    match format {
        OutputFormat::Text => print_text(&index, &found, verbose),
        OutputFormat::Json => print_json(&index, &found)?,
        OutputFormat::Tsv => {
            println!("id\tname\tscore\tsource");
            println!(
                "{}\t{}\t{:.3}\t{}",
                found.preset.id,
                found.preset.name,
                found.score.value,
                source_name(found.source)
            );
        }
    }

    Ok(())
}

fn print_text(index: &PresetIndex, found: &PresetMatch<'_>, verbose: bool) {
    let preset = found.preset;
    println!("Preset: {} ({})", preset.name, preset.id);
    println!(
        "Score:  {:.3} ({})",
        found.score.value,
        source_name(found.source)
    );

    if verbose {
        println!(
            "        {} exact, {} wildcard",
            found.score.exact_keys, found.score.wildcard_keys
        );
        let geometry: Vec<&str> = preset.geometry.iter().map(|g| g.as_str()).collect();
        println!("Geometry: {}", geometry.join(", "));
    }

    let fields = index.catalog().preset_fields(&preset.id);
    if !fields.is_empty() {
        let ids: Vec<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        println!("Fields: {}", ids.join(", "));
    }
}

fn print_json(index: &PresetIndex, found: &PresetMatch<'_>) -> anyhow::Result<()> {
    let preset = found.preset;
    let fields: Vec<&str> = index
        .catalog()
        .preset_fields(&preset.id)
        .into_iter()
        .map(|f| f.id.as_str())
        .collect();

    let output = serde_json::json!({
        "id": preset.id,
        "name": preset.name,
        "geometry": preset.geometry,
        "score": {
            "value": found.score.value,
            "exact_keys": found.score.exact_keys,
            "wildcard_keys": found.score.wildcard_keys,
        },
        "source": found.source,
        "add_tags": preset.add_tags,
        "fields": fields,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
