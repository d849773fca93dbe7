use eframe::egui::{pos2, vec2, Color32, ColorImage, Rect, Sense, Stroke, TextureOptions, Ui};

use crate::color::CategoryColors;
use crate::geometry::BOX_EDGES;
use crate::state::{AppState, CameraView, CAMERA_TITLE};

const BOX_LINE_WIDTH: f32 = 2.0;

// ---------------------------------------------------------------------------
// Camera image with projected annotation boxes (central panel)
// ---------------------------------------------------------------------------

/// Render the current camera frame, axis-less, scaled to fit the panel.
pub fn camera_view(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(CAMERA_TITLE);

        if let Some(view) = state.camera.as_mut() {
            draw_frame(ui, view, &state.category_colors);
        }
    });
}

fn draw_frame(ui: &mut Ui, view: &mut CameraView, colors: &CategoryColors) {
    let [width, height] = view.frame.size;
    if width == 0 || height == 0 {
        return;
    }

    let frame = &view.frame;
    let texture = view.texture.get_or_insert_with(|| {
        let image = ColorImage::from_rgba_unmultiplied([width, height], &frame.rgba);
        ui.ctx()
            .load_texture(format!("camera/{}", frame.channel), image, TextureOptions::LINEAR)
    });

    let available = ui.available_size();
    let scale = (available.x / width as f32).min(available.y / height as f32);
    if scale <= 0.0 {
        return;
    }

    let (rect, _) = ui.allocate_exact_size(
        vec2(width as f32 * scale, height as f32 * scale),
        Sense::hover(),
    );
    // Clipped to the image, like the axis limits of a plot.
    let painter = ui.painter_at(rect);
    painter.image(
        texture.id(),
        rect,
        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
        Color32::WHITE,
    );

    let to_screen = |[u, v]: [f32; 2]| rect.min + vec2(u * scale, v * scale);
    for b in &frame.boxes {
        let stroke = Stroke::new(BOX_LINE_WIDTH, colors.color_for(&b.category));
        for &(i, j) in &BOX_EDGES {
            painter.line_segment([to_screen(b.corners[i]), to_screen(b.corners[j])], stroke);
        }
        let [from, to] = b.heading_segment();
        painter.line_segment([to_screen(from), to_screen(to)], stroke);
    }
}
