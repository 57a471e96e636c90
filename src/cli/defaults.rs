use clap::Args;

use crate::cli::{IndexOptions, OutputFormat};
use crate::core::types::Geometry;

#[derive(Args)]
pub struct DefaultsArgs {
    /// Geometry of the new feature
    #[arg(short, long, default_value = "point")]
    pub geometry: Geometry,

    /// Maximum number of presets to offer
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,
}

pub fn run(
    args: DefaultsArgs,
    options: &IndexOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut index = options.build()?;
    if verbose && index.in_intro_mode() {
        eprintln!("Intro mode: recent presets are not offered");
    }

    let presets = index.defaults(args.geometry, args.limit);

    match format {
        OutputFormat::Text => {
            println!("Defaults for {} ({} presets)\n", args.geometry, presets.len());
            for (i, preset) in presets.iter().enumerate() {
                println!("{:>3}. {:<32} {}", i + 1, preset.id, preset.name);
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = presets
                .iter()
                .map(|p| serde_json::json!({ "id": p.id, "name": p.name }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("rank\tid\tname");
            for (i, preset) in presets.iter().enumerate() {
                println!("{}\t{}\t{}", i + 1, preset.id, preset.name);
            }
        }
    }

    Ok(())
}
