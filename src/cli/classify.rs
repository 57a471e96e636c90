use clap::{Args, Subcommand};

use crate::catalog::classify::TagTable;
use crate::cli::{IndexOptions, OutputFormat};
use crate::utils::validation::parse_tags;

#[derive(Args)]
pub struct ClassifyArgs {
    #[command(subcommand)]
    pub command: ClassifyCommands,
}

#[derive(Subcommand)]
pub enum ClassifyCommands {
    /// Keys implying an area, each with the values that still mean a line
    AreaKeys,

    /// Primary tags of presets usable as standalone points
    PointTags,

    /// Primary tags of presets usable as vertices
    VertexTags,

    /// Decide whether a closed way with these tags is an area
    IsArea {
        /// Tags as key=value pairs
        tags: Vec<String>,
    },

    /// Decide which standalone-node geometries these tags imply
    Node {
        /// Tags as key=value pairs
        tags: Vec<String>,
    },
}

pub fn run(
    args: ClassifyArgs,
    options: &IndexOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let index = options.build()?;

    match args.command {
        ClassifyCommands::AreaKeys => {
            let keys = index.area_keys();
            if verbose {
                eprintln!("{} area keys", keys.len());
            }
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&keys)?),
                OutputFormat::Text | OutputFormat::Tsv => {
                    for (key, discard) in keys.iter() {
                        let values: Vec<&str> = discard.iter().map(String::as_str).collect();
                        print_row(format, key, &values);
                    }
                }
            }
        }
        ClassifyCommands::PointTags => print_table(index.point_tags(), format)?,
        ClassifyCommands::VertexTags => print_table(index.vertex_tags(), format)?,
        ClassifyCommands::IsArea { tags } => {
            let tags = parse_tags(&tags)?;
            let is_area = index.area_keys().is_area(&tags);
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "area": is_area }));
                }
                OutputFormat::Text | OutputFormat::Tsv => println!("{is_area}"),
            }
        }
        ClassifyCommands::Node { tags } => {
            let tags = parse_tags(&tags)?;
            let geometries = index.catalog().node_geometries_for_tags(&tags);
            match format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "point": geometries.point,
                        "vertex": geometries.vertex,
                    });
                    println!("{output}");
                }
                OutputFormat::Text => {
                    println!("point:  {}", geometries.point);
                    println!("vertex: {}", geometries.vertex);
                }
                OutputFormat::Tsv => {
                    println!("point\tvertex");
                    println!("{}\t{}", geometries.point, geometries.vertex);
                }
            }
        }
    }

    Ok(())
}

fn print_row(format: OutputFormat, key: &str, values: &[&str]) {
    match format {
        OutputFormat::Tsv => println!("{}\t{}", key, values.join(",")),
        _ => {
            if values.is_empty() {
                println!("{key}");
            } else {
                println!("{:<20} {}", key, values.join(", "));
            }
        }
    }
}

fn print_table(table: &TagTable, format: OutputFormat) -> anyhow::Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(table)?);
        return Ok(());
    }
    for (key, values) in table {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        print_row(format, key, &values);
    }
    Ok(())
}
