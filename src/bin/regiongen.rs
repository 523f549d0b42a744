use clap::Parser;
use regiongen::config::{GeneratorSettings, load_config, save_config};
use regiongen::errors::RegionResult;
use regiongen::region::preview::save_previews;
use regiongen::region::{RegionGenerator, TargetExport};
use regiongen::rules::RegionRules;
use regiongen::spawning::AssetCatalog;
use regiongen::terrain::control_raster::LayerSlotMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod regiongen_cli {
    pub mod cli_utils;
}

use regiongen_cli::cli_utils::*;

#[derive(Parser, Clone)]
#[command(name = "regiongen")]
#[command(about = "Generate a region: heightfield, texture control map, biomes and object placements")]
struct Args {
    /// Region rules document (TOML)
    #[arg(long)]
    rules: PathBuf,

    /// Region identifier, also used for output file names
    #[arg(long, default_value = "region")]
    region_id: String,

    /// Random seed for reproducible generation (0 picks a fresh one)
    #[arg(long, default_value = "0")]
    seed: u32,

    /// Layer-to-slot table (TOML, `layer = slot`); slots follow rule order when absent
    #[arg(long)]
    slots: Option<PathBuf>,

    /// Extra LAYER=SLOT assignments applied on top of the slot table
    #[arg(long = "slot")]
    slot_overrides: Vec<String>,

    /// Asset catalog (TOML); every asset resolves to its own id when absent
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Output directory (defaults to the configured output directory)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write PNG previews of the generated grids
    #[arg(long)]
    previews: bool,

    /// Remember --output and --previews as the defaults for later runs
    #[arg(long)]
    save_defaults: bool,
}

fn load_slots(args: &Args, rules: &RegionRules) -> RegionResult<LayerSlotMap> {
    let mut slots = match &args.slots {
        Some(path) => LayerSlotMap::load_from_file(path)?,
        None => LayerSlotMap::from_rules(&rules.terrain),
    };
    for assignment in &args.slot_overrides {
        let (layer, slot) = parse_slot_assignment(assignment)?;
        slots.assign(layer, slot)?;
    }
    Ok(slots)
}

fn main() -> RegionResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    validate_region_id(&args.region_id)?;

    let mut settings = load_config();
    let output_dir = args.output.clone().unwrap_or_else(|| settings.output_dir.clone());
    let write_previews = args.previews || settings.write_previews;

    let mut rules = RegionRules::load_from_file(&args.rules)?;
    if rules.biomes.edge_search_radius_cells.is_none() {
        rules.biomes.edge_search_radius_cells = Some(settings.edge_search_radius);
    }
    let slots = load_slots(&args, &rules)?;
    let catalog = match &args.assets {
        Some(path) => AssetCatalog::load_from_file(path)?,
        None => AssetCatalog::identity(),
    };

    let region = RegionGenerator::new(&rules, &slots).generate(&args.region_id, &catalog, args.seed)?;

    let paths = OutputPaths::new(&output_dir, &args.region_id);
    region.save_to_file(&paths.region)?;
    TargetExport::from_region(&region, &rules.weather).write_to_file(&paths.targets)?;
    if write_previews {
        for path in save_previews(&region, &paths.previews)? {
            info!(path = %path.display(), "wrote preview");
        }
    }

    if args.save_defaults {
        settings = GeneratorSettings {
            output_dir,
            write_previews,
            ..settings
        };
        save_config(&settings)?;
    }

    print_region_summary(&region, &paths);
    Ok(())
}
