use eframe::egui::{self, Color32, RichText, Ui};

use crate::animation::Phase;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_folder_dialog(state);
                ui.ctx().request_repaint();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(nusc) = &state.dataset {
            ui.label(format!("{} @ {}", nusc.version(), nusc.dataroot().display()));
            ui.separator();

            let progress = match state.animator.phase() {
                Phase::Initialized => "waiting".to_string(),
                Phase::Frame(n) if state.animator.is_finished() => {
                    format!("frame {}/{} (done)", n + 1, state.animator.frame_count())
                }
                Phase::Frame(n) => format!("frame {}/{}", n + 1, state.animator.frame_count()),
            };
            ui.label(format!("{}  ·  {progress}", state.scene_name));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title(format!(
            "Open dataset root (containing {}/)",
            state.config.version
        ))
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Opening dataset root {}", path.display());
        state.load_dataroot(path);
    }
}
