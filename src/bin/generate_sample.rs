//! Writes a small synthetic snapshot in the dataset layout so the viewer can
//! run without the real download:
//!
//! ```text
//! cargo run --bin generate_sample [DATAROOT]   # default: v1.0-mini
//! cargo run
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion};
use serde_json::{json, Value};

const VERSION: &str = "v1.0-mini";
const FRAMES: usize = 12;
const EGO_SPEED: f64 = 2.5; // metres per frame
const CAMERA_SIZE: (u32, u32) = (1600, 900);

const LIDAR_TRANSLATION: [f64; 3] = [0.985, 0.0, 1.84];
const LIDAR_ROTATION: [f64; 4] = [0.706_749, -0.015_300, 0.017_144, -0.707_084];
const CAMERA_TRANSLATION: [f64; 3] = [1.704, 0.016, 1.511];
const CAMERA_ROTATION: [f64; 4] = [0.5, -0.5, 0.5, -0.5];
const CAMERA_INTRINSIC: [[f64; 3]; 3] = [
    [1266.4, 0.0, 816.3],
    [0.0, 1266.4, 491.5],
    [0.0, 0.0, 1.0],
];

/// Parked or moving objects in the global frame: (category, x, y, yaw, size w/l/h, speed).
const OBJECTS: [(&str, f64, f64, f64, [f64; 3], f64); 5] = [
    ("vehicle.car", 18.0, -3.5, 0.0, [1.9, 4.6, 1.6], 1.5),
    ("vehicle.car", 35.0, 3.5, std::f64::consts::PI, [1.9, 4.4, 1.5], 2.0),
    ("vehicle.truck", 28.0, -7.0, 0.0, [2.6, 9.0, 3.4], 0.0),
    ("human.pedestrian.adult", 12.0, 6.0, 1.2, [0.7, 0.7, 1.8], 0.4),
    ("movable_object.trafficcone", 8.0, -2.0, 0.0, [0.4, 0.4, 0.8], 0.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

fn pose(translation: [f64; 3], rotation: [f64; 4]) -> Isometry3<f64> {
    let [w, x, y, z] = rotation;
    Isometry3::from_parts(
        Translation3::new(translation[0], translation[1], translation[2]),
        UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
    )
}

fn yaw_quaternion(yaw: f64) -> [f64; 4] {
    [(yaw / 2.0).cos(), 0.0, 0.0, (yaw / 2.0).sin()]
}

/// Global position of object `k` at frame `i`.
fn object_at(k: usize, i: usize) -> ([f64; 3], f64) {
    let (_, x, y, yaw, size, speed) = OBJECTS[k];
    let t = i as f64 * speed;
    ([x + t * yaw.cos(), y + t * yaw.sin(), size[2] / 2.0], yaw)
}

/// One sweep in the LiDAR sensor frame: a ground disc plus box surfaces.
fn lidar_sweep(rng: &mut SimpleRng, frame: usize, ego: &Isometry3<f64>) -> Vec<u8> {
    let sensor_from_ego = pose(LIDAR_TRANSLATION, LIDAR_ROTATION).inverse();
    let sensor_from_global = sensor_from_ego * ego.inverse();
    let mut bytes = Vec::new();
    let mut push = |p: Point3<f64>, intensity: f32, ring: f32| {
        for v in [p.x as f32, p.y as f32, p.z as f32, intensity, ring] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    };

    for ring in 0..32 {
        let radius = 3.0 + ring as f64 * 1.4;
        for step in 0..360 {
            let angle = (step as f64).to_radians();
            let ground = Point3::new(
                radius * angle.cos(),
                radius * angle.sin(),
                rng.uniform(-0.05, 0.05),
            );
            push(sensor_from_ego * ground, rng.uniform(0.0, 30.0) as f32, ring as f32);
        }
    }

    for k in 0..OBJECTS.len() {
        let (_, _, _, _, [w, l, h], _) = OBJECTS[k];
        let ([x, y, z], yaw) = object_at(k, frame);
        let obj = pose([x, y, z], yaw_quaternion(yaw));
        for _ in 0..400 {
            let local = Point3::new(
                rng.uniform(-l / 2.0, l / 2.0),
                if rng.next_f64() < 0.5 { -w / 2.0 } else { w / 2.0 },
                rng.uniform(-h / 2.0, h / 2.0),
            );
            push(sensor_from_global * (obj * local), 60.0, 0.0);
        }
    }
    bytes
}

/// Sky over road, a plain backdrop for the box overlay.
fn camera_image(frame: usize) -> RgbImage {
    let (w, h) = CAMERA_SIZE;
    RgbImage::from_fn(w, h, |x, y| {
        if y < h / 2 {
            let t = y as f32 / (h / 2) as f32;
            Rgb([(120.0 + 60.0 * t) as u8, (170.0 + 40.0 * t) as u8, 230])
        } else {
            let stripe = (x / 40 + frame as u32) % 2 == 0 && (x as i64 - w as i64 / 2).abs() < 12;
            if stripe {
                Rgb([230, 230, 210])
            } else {
                Rgb([70, 70, 75])
            }
        }
    })
}

fn write_table(table_root: &Path, name: &str, rows: Vec<Value>) -> Result<()> {
    let path = table_root.join(format!("{name}.json"));
    let text = serde_json::to_string_pretty(&Value::Array(rows))?;
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let dataroot = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(VERSION));
    let table_root = dataroot.join(VERSION);
    for dir in [
        table_root.clone(),
        dataroot.join("samples/LIDAR_TOP"),
        dataroot.join("samples/CAM_FRONT"),
    ] {
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let token = |kind: &str, i: usize| format!("{kind}-{i:04}");

    let mut samples = Vec::new();
    let mut sample_data = Vec::new();
    let mut ego_poses = Vec::new();
    let mut annotations = Vec::new();

    for i in 0..FRAMES {
        let timestamp = 1_532_402_927_647_951i64 + i as i64 * 500_000;
        let ego_translation = [i as f64 * EGO_SPEED, 0.0, 0.0];
        let ego = pose(ego_translation, [1.0, 0.0, 0.0, 0.0]);

        samples.push(json!({
            "token": token("sample", i),
            "timestamp": timestamp,
            "prev": if i == 0 { String::new() } else { token("sample", i - 1) },
            "next": if i + 1 == FRAMES { String::new() } else { token("sample", i + 1) },
            "scene_token": "scene-0001",
        }));
        ego_poses.push(json!({
            "token": token("ego", i),
            "timestamp": timestamp,
            "translation": ego_translation,
            "rotation": [1.0, 0.0, 0.0, 0.0],
        }));

        let lidar_file = format!("samples/LIDAR_TOP/synthetic__LIDAR_TOP__{timestamp}.pcd.bin");
        fs::write(dataroot.join(&lidar_file), lidar_sweep(&mut rng, i, &ego))
            .with_context(|| format!("writing {lidar_file}"))?;
        let cam_file = format!("samples/CAM_FRONT/synthetic__CAM_FRONT__{timestamp}.jpg");
        camera_image(i)
            .save(dataroot.join(&cam_file))
            .with_context(|| format!("writing {cam_file}"))?;

        for (kind, cs, file, (w, h)) in [
            ("sd-lidar", "cs-lidar-top", lidar_file, (0, 0)),
            ("sd-cam", "cs-cam-front", cam_file, CAMERA_SIZE),
        ] {
            sample_data.push(json!({
                "token": token(kind, i),
                "sample_token": token("sample", i),
                "ego_pose_token": token("ego", i),
                "calibrated_sensor_token": cs,
                "timestamp": timestamp,
                "fileformat": if h == 0 { "pcd" } else { "jpg" },
                "is_key_frame": true,
                "width": w,
                "height": h,
                "filename": file,
            }));
        }

        for (k, object) in OBJECTS.iter().enumerate() {
            let (translation, yaw) = object_at(k, i);
            annotations.push(json!({
                "token": format!("ann-{k}-{i:04}"),
                "sample_token": token("sample", i),
                "instance_token": format!("instance-{k}"),
                "translation": translation,
                "size": object.4,
                "rotation": yaw_quaternion(yaw),
            }));
        }
    }

    let mut categories: Vec<&str> = OBJECTS.iter().map(|o| o.0).collect();
    categories.sort();
    categories.dedup();
    let category_token = |name: &str| format!("category-{}", name.replace('.', "-"));

    write_table(
        &table_root,
        "scene",
        vec![json!({
            "token": "scene-0001",
            "name": "scene-synthetic",
            "description": "Synthetic straight drive past parked and moving traffic",
            "nbr_samples": FRAMES,
            "first_sample_token": token("sample", 0),
            "last_sample_token": token("sample", FRAMES - 1),
        })],
    )?;
    write_table(&table_root, "sample", samples)?;
    write_table(&table_root, "sample_data", sample_data)?;
    write_table(&table_root, "ego_pose", ego_poses)?;
    write_table(&table_root, "sample_annotation", annotations)?;
    write_table(
        &table_root,
        "calibrated_sensor",
        vec![
            json!({
                "token": "cs-lidar-top",
                "sensor_token": "sensor-lidar-top",
                "translation": LIDAR_TRANSLATION,
                "rotation": LIDAR_ROTATION,
                "camera_intrinsic": [],
            }),
            json!({
                "token": "cs-cam-front",
                "sensor_token": "sensor-cam-front",
                "translation": CAMERA_TRANSLATION,
                "rotation": CAMERA_ROTATION,
                "camera_intrinsic": CAMERA_INTRINSIC,
            }),
        ],
    )?;
    write_table(
        &table_root,
        "sensor",
        vec![
            json!({ "token": "sensor-lidar-top", "channel": "LIDAR_TOP", "modality": "lidar" }),
            json!({ "token": "sensor-cam-front", "channel": "CAM_FRONT", "modality": "camera" }),
        ],
    )?;
    write_table(
        &table_root,
        "instance",
        (0..OBJECTS.len())
            .map(|k| {
                json!({
                    "token": format!("instance-{k}"),
                    "category_token": category_token(OBJECTS[k].0),
                })
            })
            .collect(),
    )?;
    write_table(
        &table_root,
        "category",
        categories
            .iter()
            .map(|name| json!({ "token": category_token(name), "name": name }))
            .collect(),
    )?;

    println!(
        "Wrote {FRAMES} frames ({} objects each) to {}",
        OBJECTS.len(),
        dataroot.display()
    );
    Ok(())
}
