use std::sync::{Arc, Mutex};
use std::time::Instant;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{camera, panels, plot};

/// Where a failure during playback is parked so `main` can exit non-zero
/// after the window closes.
pub type FatalError = Arc<Mutex<Option<anyhow::Error>>>;

/// Width share of the LiDAR panel; the camera panel takes the remaining 1.5.
const LIDAR_WIDTH_RATIO: f32 = 1.0 / 2.5;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SceneViewerApp {
    pub state: AppState,
    fatal: FatalError,
    halted: bool,
}

impl SceneViewerApp {
    pub fn new(state: AppState, fatal: FatalError) -> Self {
        Self {
            state,
            fatal,
            halted: false,
        }
    }

    /// Record the error and close the window. Playback never resumes.
    fn halt(&mut self, ctx: &egui::Context, error: anyhow::Error) {
        log::error!("Playback failed: {error:#}");
        if let Ok(mut slot) = self.fatal.lock() {
            *slot = Some(error);
        }
        self.halted = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

impl eframe::App for SceneViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.halted {
            return;
        }

        // ---- Animation tick ----
        if let Err(e) = self.state.advance(Instant::now()) {
            self.halt(ctx, e);
            return;
        }
        if let Some(wait) = self.state.animator.time_until_next(Instant::now()) {
            ctx.request_repaint_after(wait);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: LiDAR ----
        egui::SidePanel::left("lidar_panel")
            .exact_width(ctx.screen_rect().width() * LIDAR_WIDTH_RATIO)
            .resizable(false)
            .show(ctx, |ui| {
                plot::lidar_plot(ui, &self.state);
            });

        // ---- Central panel: camera ----
        egui::CentralPanel::default().show(ctx, |ui| {
            camera::camera_view(ui, &mut self.state);
        });
    }
}
