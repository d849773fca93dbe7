use nalgebra::Isometry3;

use super::error::{DatasetError, Result};
use super::loader::NuScenes;
use crate::geometry::{any_corner_visible, box_corners, matrix3_from_rows, project};

/// A 3D annotation box projected into the image, corners in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedBox {
    pub category: String,
    pub corners: [[f32; 2]; 8],
}

impl ProjectedBox {
    /// Heading marker: bottom-face center to bottom-front-edge center.
    pub fn heading_segment(&self) -> [[f32; 2]; 2] {
        let mean = |idx: &[usize]| {
            let n = idx.len() as f32;
            let sx: f32 = idx.iter().map(|&i| self.corners[i][0]).sum();
            let sy: f32 = idx.iter().map(|&i| self.corners[i][1]).sum();
            [sx / n, sy / n]
        };
        [mean(&[2, 3, 7, 6]), mean(&[2, 3])]
    }
}

/// A decoded camera image plus its visible annotations.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub channel: String,
    /// `[width, height]` in pixels.
    pub size: [usize; 2],
    /// Unmultiplied RGBA8, row-major.
    pub rgba: Vec<u8>,
    pub boxes: Vec<ProjectedBox>,
}

/// Load the sample's image on `channel` and project every annotation with at
/// least one corner in view.
pub fn fetch_camera_frame(
    nusc: &NuScenes,
    sample_token: &str,
    channel: &str,
) -> Result<CameraFrame> {
    let sd = nusc.sample_data_for(sample_token, channel)?;
    let path = nusc.file_path(sd);
    let image = image::open(&path)
        .map_err(|source| DatasetError::Image {
            path: path.clone(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let cs = nusc.calibrated_sensor.get(&sd.calibrated_sensor_token)?;
    let intrinsic = matrix3_from_rows(&cs.camera_intrinsic)
        .ok_or_else(|| DatasetError::MissingIntrinsic(cs.token.clone()))?;
    let ego = nusc.ego_pose.get(&sd.ego_pose_token)?;

    // global → ego → sensor
    let sensor_from_global: Isometry3<f64> = cs.pose().inverse() * ego.pose().inverse();

    let sample = nusc.sample.get(sample_token)?;
    let mut boxes = Vec::new();
    for ann_token in &sample.anns {
        let ann = nusc.sample_annotation.get(ann_token)?;
        let corners = box_corners(&(sensor_from_global * ann.pose()), &ann.size);
        if !any_corner_visible(&intrinsic, &corners, width as f64, height as f64) {
            continue;
        }
        boxes.push(ProjectedBox {
            category: ann.category_name.clone(),
            corners: corners.map(|c| {
                let [u, v] = project(&intrinsic, &c);
                [u as f32, v as f32]
            }),
        });
    }

    log::debug!(
        "{channel} frame for {sample_token}: {width}x{height}, {} of {} boxes visible",
        boxes.len(),
        sample.anns.len()
    );

    Ok(CameraFrame {
        channel: channel.to_string(),
        size: [width as usize, height as usize],
        rgba: image.into_raw(),
        boxes,
    })
}
