use std::path::PathBuf;
use std::time::Duration;

/// Viewer parameters. There are no command-line flags; everything is set here.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Snapshot root; tables live in `<dataroot>/<version>/`.
    pub dataroot: PathBuf,
    pub version: String,
    /// Position of the scene in the scene table.
    pub scene_index: usize,
    /// Time between frames (2 Hz).
    pub frame_interval: Duration,
    pub lidar_channel: String,
    pub camera_channel: String,
    /// Half-width of the bird's-eye view, in metres.
    pub lidar_extent: f64,
    /// Height range mapped onto the colormap; values outside are clamped.
    pub height_range: (f32, f32),
    pub window_size: [f32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dataroot: PathBuf::from("v1.0-mini"),
            version: "v1.0-mini".to_string(),
            scene_index: 0,
            frame_interval: Duration::from_millis(500),
            lidar_channel: "LIDAR_TOP".to_string(),
            camera_channel: "CAM_FRONT".to_string(),
            lidar_extent: 50.0,
            height_range: (-3.0, 3.0),
            window_size: [1600.0, 600.0],
        }
    }
}
