use super::GeneratedRegion;
use crate::errors::RegionResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Target placements in the form downstream labeling tools read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetExport {
    pub region_id: String,
    pub seed: u32,
    pub meters_per_cell: f32,
    /// Weather section of the rules, passed through untouched
    pub weather: toml::Table,
    pub targets: Vec<TargetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Position within the export's target list
    pub index: usize,
    pub entry_index: usize,
    pub asset_id: String,
    pub prefab: String,
    /// x, y, z in meters
    pub position: [f32; 3],
    /// x, y, z, w
    pub rotation: [f32; 4],
    pub yaw_deg: f32,
}

impl TargetExport {
    pub fn from_region(region: &GeneratedRegion, weather: &toml::Table) -> Self {
        let targets = region
            .targets()
            .enumerate()
            .map(|(index, object)| TargetRecord {
                index,
                entry_index: object.entry_index,
                asset_id: object.asset_id.clone(),
                prefab: object.prefab.clone(),
                position: object.position.to_array(),
                rotation: object.rotation.to_array(),
                yaw_deg: object.yaw_deg,
            })
            .collect();

        Self {
            region_id: region.region_id.clone(),
            seed: region.seed,
            meters_per_cell: region.metrics.meters_per_cell,
            weather: weather.clone(),
            targets,
        }
    }

    pub fn to_json(&self) -> RegionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(contents: &str) -> RegionResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> RegionResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawning::PlacedObject;
    use crate::terrain::coordinates::{Grid, TerrainMetrics};
    use bevy::math::{Quat, Vec3};

    fn region_with_objects() -> GeneratedRegion {
        let object = |asset: &str, is_target: bool, x: f32| PlacedObject {
            entry_index: usize::from(!is_target),
            asset_id: asset.to_string(),
            prefab: format!("props/{asset}"),
            position: Vec3::new(x, 2.0, 10.0),
            rotation: Quat::from_rotation_y(0.5),
            yaw_deg: 28.6,
            is_target,
        };
        GeneratedRegion {
            region_id: "r1".to_string(),
            seed: 17,
            metrics: TerrainMetrics::default(),
            heights: Grid::filled(4, 4, 0.0),
            control: Grid::filled(4, 4, Default::default()),
            biomes: Grid::filled(4, 4, 0),
            edge_distance: Grid::filled(4, 4, 0.0),
            objects: vec![object("target", true, 12.0), object("tree", false, 3.0), object("target", true, 20.0)],
        }
    }

    #[test]
    fn test_only_targets_exported() {
        let export = TargetExport::from_region(&region_with_objects(), &toml::Table::new());
        assert_eq!(export.targets.len(), 2);
        assert_eq!(export.targets[1].index, 1);
        assert_eq!(export.targets[1].position, [20.0, 2.0, 10.0]);
        assert!(export.targets.iter().all(|t| t.asset_id == "target"));
    }

    #[test]
    fn test_weather_passthrough() {
        let weather: toml::Table = toml::from_str("preset = \"overcast\"\nfog_density = 0.25\n").unwrap();
        let export = TargetExport::from_region(&region_with_objects(), &weather);
        let json = export.to_json().expect("export should serialize");
        assert!(json.contains("\"preset\": \"overcast\""));

        let parsed = TargetExport::from_json(&json).expect("export should parse");
        assert_eq!(parsed, export);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/r1_targets.json");
        let export = TargetExport::from_region(&region_with_objects(), &toml::Table::new());
        export.write_to_file(&path).expect("write should succeed");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(TargetExport::from_json(&contents).unwrap(), export);
    }
}
