//! osm-melt: Melt an OSM XML export into relational CSV files
//!
//! Usage:
//!   # Write nodes.csv, nodes_tags.csv, ways.csv, ways_nodes.csv and
//!   # ways_tags.csv to the current directory
//!   osm-melt kuala-lumpur_malaysia.osm
//!
//!   # Write to a directory, skipping schema validation
//!   osm-melt kuala-lumpur_malaysia.osm --output-dir ./csv --no-validate
//!
//!   # Override correction tables from a JSON file
//!   osm-melt kuala-lumpur_malaysia.osm --rules rules.json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use clap::Parser;
use log::info;
use osm_melt::{CleaningRules, MeltConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "osm-melt")]
#[command(about = "Melt an OSM XML export into relational CSV files", long_about = None)]
struct Args {
    /// OSM XML file to melt
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Directory for the five CSV files (default: current directory)
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Write bundles without checking them against the schema
    #[arg(long)]
    no_validate: bool,

    /// JSON file overriding the street, postcode and phone correction tables
    #[arg(long, value_name = "JSON")]
    rules: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => CleaningRules::from_json_file(path)?,
        None => CleaningRules::default(),
    };
    let config = MeltConfig {
        validate: !args.no_validate,
        rules,
        ..MeltConfig::default()
    };

    if osm_melt::process_map_file(&args.input, &args.output_dir, &config)?.is_none() {
        info!("Nothing to do; remove the existing CSV files to melt again");
    }

    Ok(())
}
