use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::error::{DatasetError, Result};
use super::model::{
    CalibratedSensor, Category, EgoPose, Instance, Record, Sample, SampleAnnotation, SampleData,
    Scene, Sensor,
};

// ---------------------------------------------------------------------------
// Token-indexed table
// ---------------------------------------------------------------------------

/// All rows of one JSON table, in file order, plus a token → row index.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Record> Table<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.token().to_string(), i))
            .collect();
        Table { rows, index }
    }

    /// Look up a row by token.
    pub fn get(&self, token: &str) -> Result<&T> {
        self.index
            .get(token)
            .map(|&i| &self.rows[i])
            .ok_or_else(|| DatasetError::unknown(T::TABLE, token))
    }

    fn get_mut(&mut self, token: &str) -> Result<&mut T> {
        match self.index.get(token) {
            Some(&i) => Ok(&mut self.rows[i]),
            None => Err(DatasetError::unknown(T::TABLE, token)),
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl<T: Record + DeserializeOwned> Table<T> {
    /// Read `<table_root>/<TABLE>.json`, a top-level JSON array of records.
    fn load(table_root: &Path) -> Result<Self> {
        let path = table_root.join(format!("{}.json", T::TABLE));
        let file = File::open(&path).map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        })?;
        let rows: Vec<T> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| DatasetError::Json { path, source })?;
        Ok(Self::from_rows(rows))
    }
}

// ---------------------------------------------------------------------------
// Dataset snapshot
// ---------------------------------------------------------------------------

/// An opened, read-only dataset snapshot.
///
/// Tables live under `<dataroot>/<version>/`, sensor files are addressed
/// relative to `<dataroot>`.
#[derive(Debug, Clone)]
pub struct NuScenes {
    dataroot: PathBuf,
    version: String,
    pub scene: Table<Scene>,
    pub sample: Table<Sample>,
    pub sample_data: Table<SampleData>,
    pub calibrated_sensor: Table<CalibratedSensor>,
    pub sensor: Table<Sensor>,
    pub ego_pose: Table<EgoPose>,
    pub sample_annotation: Table<SampleAnnotation>,
    pub instance: Table<Instance>,
    pub category: Table<Category>,
}

impl NuScenes {
    /// Load every table and build the sample → data / annotation indexes.
    pub fn open(dataroot: impl Into<PathBuf>, version: &str) -> Result<Self> {
        let dataroot = dataroot.into();
        let table_root = dataroot.join(version);

        let mut nusc = NuScenes {
            scene: Table::load(&table_root)?,
            sample: Table::load(&table_root)?,
            sample_data: Table::load(&table_root)?,
            calibrated_sensor: Table::load(&table_root)?,
            sensor: Table::load(&table_root)?,
            ego_pose: Table::load(&table_root)?,
            sample_annotation: Table::load(&table_root)?,
            instance: Table::load(&table_root)?,
            category: Table::load(&table_root)?,
            dataroot,
            version: version.to_string(),
        };
        nusc.build_reverse_index()?;

        log::info!(
            "Loaded {} from {}: {} scenes, {} samples, {} sample_data, {} annotations",
            nusc.version,
            nusc.dataroot.display(),
            nusc.scene.len(),
            nusc.sample.len(),
            nusc.sample_data.len(),
            nusc.sample_annotation.len(),
        );
        Ok(nusc)
    }

    /// Fill `Sample::data`, `Sample::anns` and `SampleAnnotation::category_name`.
    fn build_reverse_index(&mut self) -> Result<()> {
        for sd in self.sample_data.rows.iter().filter(|sd| sd.is_key_frame) {
            let cs = self.calibrated_sensor.get(&sd.calibrated_sensor_token)?;
            let sensor = self.sensor.get(&cs.sensor_token)?;
            self.sample
                .get_mut(&sd.sample_token)?
                .data
                .insert(sensor.channel.clone(), sd.token.clone());
        }

        for ann in self.sample_annotation.rows.iter_mut() {
            let instance = self.instance.get(&ann.instance_token)?;
            ann.category_name = self.category.get(&instance.category_token)?.name.clone();
            self.sample
                .get_mut(&ann.sample_token)?
                .anns
                .push(ann.token.clone());
        }
        Ok(())
    }

    pub fn dataroot(&self) -> &Path {
        &self.dataroot
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Absolute path of a sensor file.
    pub fn file_path(&self, sd: &SampleData) -> PathBuf {
        self.dataroot.join(&sd.filename)
    }

    /// Scene by position in the scene table.
    pub fn scene_at(&self, index: usize) -> Result<&Scene> {
        self.scene
            .rows()
            .get(index)
            .ok_or(DatasetError::SceneOutOfRange {
                index,
                count: self.scene.len(),
            })
    }

    /// Ordered sample tokens of a scene, following `next` from `first_token`
    /// until a sample without successor.
    pub fn scene_samples(&self, first_token: &str) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        let mut seen = HashSet::new();
        let mut token = first_token.to_string();

        loop {
            if !seen.insert(token.clone()) {
                return Err(DatasetError::CyclicChain(token));
            }
            let sample = self.sample.get(&token)?;
            tokens.push(token);
            match sample.next_token() {
                Some(next) => token = next.to_string(),
                None => break,
            }
        }
        Ok(tokens)
    }

    /// The key-frame record a sample holds for `channel`.
    pub fn sample_data_for(&self, sample_token: &str, channel: &str) -> Result<&SampleData> {
        let sample = self.sample.get(sample_token)?;
        let sd_token = sample
            .data
            .get(channel)
            .ok_or_else(|| DatasetError::MissingChannel {
                sample: sample_token.to_string(),
                channel: channel.to_string(),
            })?;
        self.sample_data.get(sd_token)
    }

    /// Every category name, sorted.
    pub fn category_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.category.rows().iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::SyntheticScene;

    #[test]
    fn test_open_builds_reverse_index() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = SyntheticScene::new(3).write(dir.path());
        let nusc = NuScenes::open(dir.path(), &fixture.version).unwrap();

        assert_eq!(nusc.scene.len(), 1);
        assert_eq!(nusc.sample.len(), 3);

        let first = nusc.sample.get(&fixture.sample_tokens[0]).unwrap();
        assert!(first.data.contains_key("LIDAR_TOP"));
        assert!(first.data.contains_key("CAM_FRONT"));
        assert_eq!(first.data["LIDAR_TOP"], "sd-lidar-0");
        assert_eq!(first.anns.len(), 2);

        let ann = nusc.sample_annotation.get(&first.anns[0]).unwrap();
        assert_eq!(ann.category_name, "vehicle.car");
        assert_eq!(
            nusc.category_names(),
            vec!["human.pedestrian.adult", "vehicle.car"]
        );
    }

    #[test]
    fn test_scene_samples_follows_next() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = SyntheticScene::new(3).write(dir.path());
        let nusc = NuScenes::open(dir.path(), &fixture.version).unwrap();

        let scene = nusc.scene_at(0).unwrap();
        let tokens = nusc.scene_samples(&scene.first_sample_token).unwrap();
        assert_eq!(tokens, fixture.sample_tokens);

        let unique: HashSet<&String> = tokens.iter().collect();
        assert_eq!(unique.len(), tokens.len());

        let last = nusc.sample.get(tokens.last().unwrap()).unwrap();
        assert_eq!(last.next_token(), None);
    }

    #[test]
    fn test_scene_samples_single_sample() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = SyntheticScene::new(1).write(dir.path());
        let nusc = NuScenes::open(dir.path(), &fixture.version).unwrap();

        let tokens = nusc.scene_samples(&fixture.sample_tokens[0]).unwrap();
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_scene_samples_unknown_token() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = SyntheticScene::new(2).write(dir.path());
        let nusc = NuScenes::open(dir.path(), &fixture.version).unwrap();

        let err = nusc.scene_samples("does-not-exist").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::UnknownToken { table: "sample", .. }
        ));
    }

    #[test]
    fn test_scene_samples_detects_cycle() {
        let mk = |token: &str, next: &str| Sample {
            token: token.to_string(),
            next: next.to_string(),
            data: Default::default(),
            anns: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let fixture = SyntheticScene::new(1).write(dir.path());
        let mut nusc = NuScenes::open(dir.path(), &fixture.version).unwrap();
        nusc.sample = Table::from_rows(vec![mk("a", "b"), mk("b", "a")]);

        let err = nusc.scene_samples("a").unwrap_err();
        assert!(matches!(err, DatasetError::CyclicChain(ref t) if t == "a"));
    }

    #[test]
    fn test_scene_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = SyntheticScene::new(1).write(dir.path());
        let nusc = NuScenes::open(dir.path(), &fixture.version).unwrap();

        let err = nusc.scene_at(5).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::SceneOutOfRange { index: 5, count: 1 }
        ));
    }

    #[test]
    fn test_missing_channel() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = SyntheticScene::new(1).write(dir.path());
        let nusc = NuScenes::open(dir.path(), &fixture.version).unwrap();

        let err = nusc
            .sample_data_for(&fixture.sample_tokens[0], "RADAR_FRONT")
            .unwrap_err();
        assert!(matches!(err, DatasetError::MissingChannel { .. }));
    }

    #[test]
    fn test_open_missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let err = NuScenes::open(dir.path(), "v1.0-mini").unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
