//! Writes a tiny snapshot in the on-disk dataset layout for unit tests.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

pub const VERSION: &str = "v1.0-test";
pub const CAMERA_WIDTH: u32 = 160;
pub const CAMERA_HEIGHT: u32 = 90;

/// Scene description: `samples` key frames, each with the same LiDAR sweep,
/// a front camera frame, a car 10 m ahead and a pedestrian 10 m behind.
pub struct SyntheticScene {
    pub samples: usize,
    pub points: Vec<[f32; 4]>,
    pub lidar_translation: [f64; 3],
    pub lidar_rotation: [f64; 4],
}

pub struct Fixture {
    pub version: String,
    pub sample_tokens: Vec<String>,
}

impl SyntheticScene {
    pub fn new(samples: usize) -> Self {
        SyntheticScene {
            samples,
            points: vec![
                [1.0, 2.0, 0.5, 10.0],
                [-3.0, 4.0, -1.0, 20.0],
                [10.0, -5.0, 2.5, 30.0],
                [0.0, 0.0, 0.0, 0.0],
            ],
            lidar_translation: [1.0, 0.0, 0.0],
            lidar_rotation: [1.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn write(&self, dataroot: &Path) -> Fixture {
        let table_root = dataroot.join(VERSION);
        let lidar_dir = dataroot.join("samples").join("LIDAR_TOP");
        let cam_dir = dataroot.join("samples").join("CAM_FRONT");
        fs::create_dir_all(&table_root).unwrap();
        fs::create_dir_all(&lidar_dir).unwrap();
        fs::create_dir_all(&cam_dir).unwrap();

        let sample_tokens: Vec<String> = (0..self.samples).map(|i| format!("sample-{i}")).collect();
        let link = |i: isize| -> String {
            usize::try_from(i)
                .ok()
                .and_then(|i| sample_tokens.get(i).cloned())
                .unwrap_or_default()
        };

        let mut samples = Vec::new();
        let mut sample_data = Vec::new();
        let mut ego_poses = Vec::new();
        let mut annotations = Vec::new();

        for (i, token) in sample_tokens.iter().enumerate() {
            samples.push(json!({
                "token": token,
                "timestamp": 1_000_000 * i as i64,
                "scene_token": "scene-0",
                "prev": link(i as isize - 1),
                "next": link(i as isize + 1),
            }));

            let ego_token = format!("ego-{i}");
            ego_poses.push(json!({
                "token": ego_token,
                "timestamp": 1_000_000 * i as i64,
                "translation": [i as f64, 0.0, 0.0],
                "rotation": [1.0, 0.0, 0.0, 0.0],
            }));

            let lidar_file = format!("samples/LIDAR_TOP/{i}.pcd.bin");
            fs::write(dataroot.join(&lidar_file), self.point_bytes()).unwrap();
            sample_data.push(sd_record(
                &format!("sd-lidar-{i}"),
                token,
                &ego_token,
                "cs-lidar",
                &lidar_file,
                true,
            ));

            let cam_file = format!("samples/CAM_FRONT/{i}.jpg");
            image::RgbImage::from_pixel(CAMERA_WIDTH, CAMERA_HEIGHT, image::Rgb([40, 40, 40]))
                .save(dataroot.join(&cam_file))
                .unwrap();
            sample_data.push(sd_record(
                &format!("sd-cam-{i}"),
                token,
                &ego_token,
                "cs-cam",
                &cam_file,
                true,
            ));

            annotations.push(json!({
                "token": format!("ann-car-{i}"),
                "sample_token": token,
                "instance_token": "inst-car",
                "translation": [i as f64 + 10.0, 0.0, 1.0],
                "size": [2.0, 4.0, 1.5],
                "rotation": [1.0, 0.0, 0.0, 0.0],
            }));
            annotations.push(json!({
                "token": format!("ann-ped-{i}"),
                "sample_token": token,
                "instance_token": "inst-ped",
                "translation": [i as f64 - 10.0, 0.0, 1.0],
                "size": [0.6, 0.6, 1.8],
                "rotation": [1.0, 0.0, 0.0, 0.0],
            }));
        }

        // An intermediate sweep must not shadow the key frame.
        if !sample_tokens.is_empty() {
            sample_data.push(sd_record(
                "sd-lidar-0-sweep",
                &sample_tokens[0],
                "ego-0",
                "cs-lidar",
                "sweeps/LIDAR_TOP/missing.pcd.bin",
                false,
            ));
        }

        let scene = json!([{
            "token": "scene-0",
            "name": "scene-synthetic",
            "description": "synthetic test scene",
            "nbr_samples": self.samples,
            "first_sample_token": sample_tokens.first().cloned().unwrap_or_default(),
            "last_sample_token": sample_tokens.last().cloned().unwrap_or_default(),
        }]);
        let calibrated_sensor = json!([
            {
                "token": "cs-lidar",
                "sensor_token": "sensor-lidar",
                "translation": self.lidar_translation,
                "rotation": self.lidar_rotation,
                "camera_intrinsic": [],
            },
            {
                "token": "cs-cam",
                "sensor_token": "sensor-cam",
                "translation": [1.7, 0.0, 1.5],
                // z forward, x right, y down
                "rotation": [0.5, -0.5, 0.5, -0.5],
                "camera_intrinsic": [[100.0, 0.0, 80.0], [0.0, 100.0, 45.0], [0.0, 0.0, 1.0]],
            },
        ]);
        let sensor = json!([
            { "token": "sensor-lidar", "channel": "LIDAR_TOP", "modality": "lidar" },
            { "token": "sensor-cam", "channel": "CAM_FRONT", "modality": "camera" },
        ]);
        let instance = json!([
            { "token": "inst-car", "category_token": "cat-car" },
            { "token": "inst-ped", "category_token": "cat-ped" },
        ]);
        let category = json!([
            { "token": "cat-car", "name": "vehicle.car" },
            { "token": "cat-ped", "name": "human.pedestrian.adult" },
        ]);

        write_table(&table_root, "scene", scene);
        write_table(&table_root, "sample", Value::Array(samples));
        write_table(&table_root, "sample_data", Value::Array(sample_data));
        write_table(&table_root, "calibrated_sensor", calibrated_sensor);
        write_table(&table_root, "sensor", sensor);
        write_table(&table_root, "ego_pose", Value::Array(ego_poses));
        write_table(&table_root, "sample_annotation", Value::Array(annotations));
        write_table(&table_root, "instance", instance);
        write_table(&table_root, "category", category);

        Fixture {
            version: VERSION.to_string(),
            sample_tokens,
        }
    }

    /// Five little-endian f32 per point; the ring index is always 0.
    fn point_bytes(&self) -> Vec<u8> {
        self.points
            .iter()
            .flat_map(|&[x, y, z, i]| [x, y, z, i, 0.0])
            .flat_map(f32::to_le_bytes)
            .collect()
    }
}

fn sd_record(
    token: &str,
    sample: &str,
    ego: &str,
    cs: &str,
    filename: &str,
    key_frame: bool,
) -> Value {
    json!({
        "token": token,
        "sample_token": sample,
        "ego_pose_token": ego,
        "calibrated_sensor_token": cs,
        "filename": filename,
        "fileformat": if filename.ends_with(".jpg") { "jpg" } else { "pcd" },
        "is_key_frame": key_frame,
        "width": if filename.ends_with(".jpg") { CAMERA_WIDTH } else { 0 },
        "height": if filename.ends_with(".jpg") { CAMERA_HEIGHT } else { 0 },
    })
}

fn write_table(table_root: &Path, name: &str, value: Value) {
    let path = table_root.join(format!("{name}.json"));
    fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}
