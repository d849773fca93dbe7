use std::collections::BTreeMap;

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Record trait – every table row is addressed by its token
// ---------------------------------------------------------------------------

/// A row of one of the snapshot's JSON tables.
pub trait Record {
    /// Table name, also the JSON file stem (`sample` → `sample.json`).
    const TABLE: &'static str;

    fn token(&self) -> &str;
}

macro_rules! record {
    ($ty:ty, $table:literal) => {
        impl Record for $ty {
            const TABLE: &'static str = $table;

            fn token(&self) -> &str {
                &self.token
            }
        }
    };
}

/// Build an ego/sensor pose from a table's `translation` + `rotation` (w, x, y, z).
pub fn pose_from_record(translation: &[f64; 3], rotation: &[f64; 4]) -> Isometry3<f64> {
    let [w, x, y, z] = *rotation;
    Isometry3::from_parts(
        Translation3::new(translation[0], translation[1], translation[2]),
        UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
    )
}

// ---------------------------------------------------------------------------
// Scene / sample chain
// ---------------------------------------------------------------------------

/// One continuous drive segment.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub token: String,
    #[serde(default)]
    pub name: String,
    /// Sample count as recorded in the table.
    #[serde(default)]
    pub nbr_samples: usize,
    pub first_sample_token: String,
}
record!(Scene, "scene");

/// One annotated multi-sensor snapshot. `next` is empty on the last sample of a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub token: String,
    #[serde(default)]
    pub next: String,

    /// Sensor channel → key-frame `sample_data` token. Filled in at load.
    #[serde(skip)]
    pub data: BTreeMap<String, String>,
    /// `sample_annotation` tokens of this sample. Filled in at load.
    #[serde(skip)]
    pub anns: Vec<String>,
}
record!(Sample, "sample");

impl Sample {
    /// Successor token, `None` at the end of the scene.
    pub fn next_token(&self) -> Option<&str> {
        if self.next.is_empty() {
            None
        } else {
            Some(self.next.as_str())
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor data and calibration
// ---------------------------------------------------------------------------

/// A single sensor reading (a sweep file or an image).
#[derive(Debug, Clone, Deserialize)]
pub struct SampleData {
    pub token: String,
    pub sample_token: String,
    pub ego_pose_token: String,
    pub calibrated_sensor_token: String,
    /// Path relative to the dataroot.
    pub filename: String,
    #[serde(default)]
    pub is_key_frame: bool,
}
record!(SampleData, "sample_data");

/// Fixed sensor-to-ego transform, plus the intrinsic matrix for cameras.
#[derive(Debug, Clone, Deserialize)]
pub struct CalibratedSensor {
    pub token: String,
    pub sensor_token: String,
    pub translation: [f64; 3],
    pub rotation: [f64; 4],
    /// Empty for non-camera sensors.
    #[serde(default)]
    pub camera_intrinsic: Vec<Vec<f64>>,
}
record!(CalibratedSensor, "calibrated_sensor");

impl CalibratedSensor {
    pub fn pose(&self) -> Isometry3<f64> {
        pose_from_record(&self.translation, &self.rotation)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sensor {
    pub token: String,
    pub channel: String,
}
record!(Sensor, "sensor");

/// Ego vehicle pose in the global frame at a sensor timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct EgoPose {
    pub token: String,
    pub translation: [f64; 3],
    pub rotation: [f64; 4],
}
record!(EgoPose, "ego_pose");

impl EgoPose {
    pub fn pose(&self) -> Isometry3<f64> {
        pose_from_record(&self.translation, &self.rotation)
    }
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// A 3D bounding box in the global frame. `size` is (width, length, height).
#[derive(Debug, Clone, Deserialize)]
pub struct SampleAnnotation {
    pub token: String,
    pub sample_token: String,
    pub instance_token: String,
    pub translation: [f64; 3],
    pub size: [f64; 3],
    pub rotation: [f64; 4],

    /// Resolved through instance → category at load.
    #[serde(skip)]
    pub category_name: String,
}
record!(SampleAnnotation, "sample_annotation");

impl SampleAnnotation {
    pub fn pose(&self) -> Isometry3<f64> {
        pose_from_record(&self.translation, &self.rotation)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    pub token: String,
    pub category_token: String,
}
record!(Instance, "instance");

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub token: String,
    pub name: String,
}
record!(Category, "category");
