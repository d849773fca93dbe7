use std::path::Path;

use nalgebra::{Isometry3, Vector3};

use super::error::{DatasetError, Result};
use super::loader::NuScenes;

/// Values stored per point on disk: x, y, z, intensity, ring index.
pub const FIELDS_PER_POINT: usize = 5;
pub const POINT_STRIDE: usize = FIELDS_PER_POINT * std::mem::size_of::<f32>();

// ---------------------------------------------------------------------------
// PointCloud – one LiDAR sweep, columnar
// ---------------------------------------------------------------------------

/// A LiDAR sweep as parallel coordinate columns. All columns have equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub intensity: Vec<f32>,
}

impl PointCloud {
    /// Decode a `.pcd.bin` sweep. The ring index column is dropped.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self> {
        if bytes.len() % POINT_STRIDE != 0 {
            return Err(DatasetError::MalformedPointCloud {
                path: path.to_path_buf(),
                len: bytes.len(),
                stride: POINT_STRIDE,
            });
        }

        let n = bytes.len() / POINT_STRIDE;
        let mut cloud = PointCloud {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            intensity: Vec::with_capacity(n),
        };
        for point in bytes.chunks_exact(POINT_STRIDE) {
            let field = |i: usize| {
                let mut le = [0u8; 4];
                le.copy_from_slice(&point[i * 4..i * 4 + 4]);
                f32::from_le_bytes(le)
            };
            cloud.x.push(field(0));
            cloud.y.push(field(1));
            cloud.z.push(field(2));
            cloud.intensity.push(field(3));
        }
        Ok(cloud)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, path)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Rotate every point by the pose's rotation matrix, then translate.
    pub fn transform(&mut self, pose: &Isometry3<f64>) {
        let rotation = pose.rotation.to_rotation_matrix();
        let translation = pose.translation.vector;

        for i in 0..self.len() {
            let p = Vector3::new(self.x[i] as f64, self.y[i] as f64, self.z[i] as f64);
            let q = rotation * p + translation;
            self.x[i] = q.x as f32;
            self.y[i] = q.y as f32;
            self.z[i] = q.z as f32;
        }
    }
}

// ---------------------------------------------------------------------------
// Frame fetch
// ---------------------------------------------------------------------------

/// LiDAR points of one sample, in the ego frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EgoPoints {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl EgoPoints {
    pub fn len(&self) -> usize {
        self.x.len()
    }
}

/// Read the sample's sweep on `channel` from disk and move it into the ego frame.
///
/// Nothing is cached; every call re-reads the file.
pub fn fetch_ego_points(nusc: &NuScenes, sample_token: &str, channel: &str) -> Result<EgoPoints> {
    let sd = nusc.sample_data_for(sample_token, channel)?;
    let path = nusc.file_path(sd);
    let mut cloud = PointCloud::from_file(&path)?;
    log::debug!(
        "{} points from {}, peak intensity {:.1}",
        cloud.len(),
        path.display(),
        cloud.intensity.iter().copied().fold(0.0f32, f32::max)
    );

    let cs = nusc.calibrated_sensor.get(&sd.calibrated_sensor_token)?;
    cloud.transform(&cs.pose());

    Ok(EgoPoints {
        x: cloud.x,
        y: cloud.y,
        z: cloud.z,
    })
}
