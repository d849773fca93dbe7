use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use eframe::egui::{Color32, TextureHandle};

use crate::animation::Animator;
use crate::color::{CategoryColors, HeightColorMap};
use crate::config::ViewerConfig;
use crate::data::camera::{fetch_camera_frame, CameraFrame};
use crate::data::point_cloud::{fetch_ego_points, EgoPoints};
use crate::data::NuScenes;

pub const CAMERA_TITLE: &str = "Front Camera with Annotations";
pub const LIDAR_IDLE_TITLE: &str = "LiDAR Animation (Top-down, colored by height)";

/// Number of height slices the scatter plot is split into, one colour each.
pub const HEIGHT_BINS: usize = 32;

// ---------------------------------------------------------------------------
// Per-frame views
// ---------------------------------------------------------------------------

/// Bird's-eye scatter of one frame, bucketed by height colour.
#[derive(Debug, Clone)]
pub struct LidarView {
    /// `(colour, [x, y] points)` per non-empty height bin, lowest first.
    pub series: Vec<(Color32, Vec<[f64; 2]>)>,
    pub point_count: usize,
}

impl LidarView {
    pub fn from_points(points: &EgoPoints, colors: &HeightColorMap, bins: usize) -> Self {
        let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); bins];
        for ((&x, &y), &z) in points.x.iter().zip(&points.y).zip(&points.z) {
            buckets[colors.bin_for(z, bins)].push([x as f64, y as f64]);
        }

        LidarView {
            series: colors
                .bin_colors(bins)
                .into_iter()
                .zip(buckets)
                .filter(|(_, pts)| !pts.is_empty())
                .collect(),
            point_count: points.len(),
        }
    }
}

/// The current camera frame; the texture is uploaded lazily by the UI.
pub struct CameraView {
    pub frame: CameraFrame,
    pub texture: Option<TextureHandle>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Opened snapshot (None until a dataset loads).
    pub dataset: Option<NuScenes>,

    pub scene_name: String,

    /// Ordered sample tokens of the selected scene.
    pub scene_samples: Vec<String>,

    pub animator: Animator,

    pub height_colors: HeightColorMap,
    pub category_colors: CategoryColors,

    pub lidar: Option<LidarView>,
    pub lidar_title: String,
    pub camera: Option<CameraView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Empty state: blank plots, nothing to animate.
    pub fn new(config: ViewerConfig) -> Self {
        let (vmin, vmax) = config.height_range;
        Self {
            animator: Animator::new(0, config.frame_interval),
            height_colors: HeightColorMap::blues(vmin, vmax),
            config,
            dataset: None,
            scene_name: String::new(),
            scene_samples: Vec::new(),
            category_colors: CategoryColors::default(),
            lidar: None,
            lidar_title: LIDAR_IDLE_TITLE.to_string(),
            camera: None,
            status_message: None,
        }
    }

    /// Open the configured dataroot and select the configured scene.
    pub fn open(config: ViewerConfig) -> Result<Self> {
        let nusc = NuScenes::open(&config.dataroot, &config.version)
            .with_context(|| format!("opening dataset at {}", config.dataroot.display()))?;
        let mut state = Self::new(config);
        state.set_dataset(nusc)?;
        Ok(state)
    }

    /// Ingest a newly opened dataset: resolve the scene's samples and restart
    /// the animation. Leaves the state untouched on error.
    pub fn set_dataset(&mut self, nusc: NuScenes) -> Result<()> {
        let index = self.config.scene_index;
        let scene = nusc.scene_at(index)?;
        let samples = nusc
            .scene_samples(&scene.first_sample_token)
            .with_context(|| format!("enumerating samples of scene {}", scene.name))?;
        if scene.nbr_samples != samples.len() {
            log::warn!(
                "Scene {} lists {} samples but its chain has {}",
                scene.name,
                scene.nbr_samples,
                samples.len()
            );
        }

        log::info!(
            "Scene {index} ({}): {} frames at {:?} intervals",
            scene.name,
            samples.len(),
            self.config.frame_interval
        );

        self.scene_name = scene.name.clone();
        self.category_colors = CategoryColors::new(&nusc.category_names());
        self.animator = Animator::new(samples.len(), self.config.frame_interval);
        self.scene_samples = samples;
        self.dataset = Some(nusc);
        self.status_message = None;
        self.reset_views();
        Ok(())
    }

    /// Blank both panels.
    pub fn reset_views(&mut self) {
        self.lidar = None;
        self.lidar_title = LIDAR_IDLE_TITLE.to_string();
        self.camera = None;
    }

    /// Show the next frame if one is due. Returns the frame index shown.
    pub fn advance(&mut self, now: Instant) -> Result<Option<usize>> {
        let Some(index) = self.animator.poll(now) else {
            return Ok(None);
        };
        self.show_frame(index)?;
        Ok(Some(index))
    }

    /// Fetch and install frame `index` of the scene.
    pub fn show_frame(&mut self, index: usize) -> Result<()> {
        let nusc = self.dataset.as_ref().context("no dataset loaded")?;
        let token = self
            .scene_samples
            .get(index)
            .with_context(|| format!("frame {index} is outside the scene"))?;

        let points = fetch_ego_points(nusc, token, &self.config.lidar_channel)
            .with_context(|| format!("fetching LiDAR points for sample {token}"))?;
        log::debug!("Frame {index}: sample {token}, {} points", points.len());

        let frame = fetch_camera_frame(nusc, token, &self.config.camera_channel)
            .with_context(|| format!("fetching camera frame for sample {token}"))?;

        self.lidar = Some(LidarView::from_points(
            &points,
            &self.height_colors,
            HEIGHT_BINS,
        ));
        self.lidar_title = format!(
            "LiDAR Frame {}/{} (colored by z)",
            index + 1,
            self.scene_samples.len()
        );
        self.camera = Some(CameraView {
            frame,
            texture: None,
        });
        Ok(())
    }

    /// Switch to another snapshot root picked by the user. Errors are shown
    /// in the status line instead of ending the process.
    pub fn load_dataroot(&mut self, dataroot: PathBuf) {
        let result = NuScenes::open(&dataroot, &self.config.version)
            .map_err(anyhow::Error::from)
            .and_then(|nusc| self.set_dataset(nusc));

        match result {
            Ok(()) => self.config.dataroot = dataroot,
            Err(e) => {
                log::error!("Failed to open {}: {e:#}", dataroot.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
