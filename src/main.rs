mod animation;
mod app;
mod color;
mod config;
mod data;
mod geometry;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use app::{FatalError, SceneViewerApp};
use config::ViewerConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::default();
    let window_size = config.window_size;
    let state = AppState::open(config)?;

    let fatal = FatalError::default();
    let app = SceneViewerApp::new(state, Arc::clone(&fatal));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(window_size)
            .with_min_inner_size([800.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "nuScenes Scene Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the viewer event loop")?;

    // A playback failure closes the window; report it as the exit status.
    let failure = fatal.lock().ok().and_then(|mut slot| slot.take());
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
