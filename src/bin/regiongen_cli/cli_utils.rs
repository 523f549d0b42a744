use regiongen::errors::{RegionError, RegionResult};
use regiongen::region::GeneratedRegion;
use regiongen::terrain::biomes::{biome_histogram, biome_name};
use std::path::{Path, PathBuf};

/// Files written for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub region: PathBuf,
    pub targets: PathBuf,
    pub previews: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, region_id: &str) -> Self {
        Self {
            region: output_dir.join(format!("{region_id}.bin")),
            targets: output_dir.join(format!("{region_id}_targets.json")),
            previews: output_dir.join("previews"),
        }
    }
}

/// Region ids become file names, so keep them to a safe character set
pub fn validate_region_id(region_id: &str) -> RegionResult<()> {
    if region_id.is_empty() {
        return Err(RegionError::InvalidArgument {
            reason: "Region id must not be empty".to_string(),
        });
    }
    if let Some(bad) = region_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(RegionError::InvalidArgument {
            reason: format!("Region id '{region_id}' contains '{bad}'; use letters, digits, '_' or '-'"),
        });
    }
    Ok(())
}

/// Parse a `LAYER=SLOT` override
pub fn parse_slot_assignment(input: &str) -> RegionResult<(String, u32)> {
    let Some((layer, slot)) = input.split_once('=') else {
        return Err(RegionError::InvalidArgument {
            reason: format!("Invalid slot assignment '{input}'. Expected LAYER=SLOT"),
        });
    };
    let layer = layer.trim();
    if layer.is_empty() {
        return Err(RegionError::InvalidArgument {
            reason: format!("Slot assignment '{input}' has no layer name"),
        });
    }
    let slot = slot.trim().parse::<u32>().map_err(|_| RegionError::InvalidArgument {
        reason: format!("Invalid slot value: '{}'", slot.trim()),
    })?;
    Ok((layer.to_string(), slot))
}

pub fn print_region_summary(region: &GeneratedRegion, paths: &OutputPaths) {
    println!("Region saved successfully to: {}", paths.region.display());
    println!("Targets exported to: {}", paths.targets.display());
    println!("\nRegion summary:");
    println!("  Id: {}", region.region_id);
    println!("  Seed: {}", region.seed);
    println!(
        "  Grid: {}x{} at {} m/cell",
        region.heights.width(),
        region.heights.depth(),
        region.metrics.meters_per_cell
    );

    let total = region.biomes.len().max(1) as f32;
    for (id, count) in biome_histogram(&region.biomes) {
        println!(
            "    Biome {id} ({}): {:.1}%",
            biome_name(id),
            count as f32 / total * 100.0
        );
    }

    println!("  Objects: {}", region.objects.len());
    for (i, target) in region.targets().enumerate() {
        println!(
            "    Target {}: asset={}, position=({:.2}, {:.2}, {:.2})",
            i + 1,
            target.asset_id,
            target.position.x,
            target.position.y,
            target.position.z
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new(Path::new("out"), "r7");
        assert_eq!(paths.region, PathBuf::from("out/r7.bin"));
        assert_eq!(paths.targets, PathBuf::from("out/r7_targets.json"));
        assert_eq!(paths.previews, PathBuf::from("out/previews"));
    }

    #[test]
    fn test_validate_region_id() {
        assert!(validate_region_id("north-field_01").is_ok());
        assert!(validate_region_id("").is_err());
        assert!(validate_region_id("../etc").is_err());
        assert!(validate_region_id("a b").is_err());
    }

    #[test]
    fn test_parse_slot_assignment() {
        assert_eq!(parse_slot_assignment("rock=3").unwrap(), ("rock".to_string(), 3));
        assert_eq!(parse_slot_assignment(" sand = 12 ").unwrap(), ("sand".to_string(), 12));

        assert!(parse_slot_assignment("rock").is_err());
        assert!(parse_slot_assignment("=3").is_err());
        assert!(parse_slot_assignment("rock=-1").is_err());
    }
}
