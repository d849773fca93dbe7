use eframe::egui::{pos2, vec2, Align2, FontId, Rect, Sense, Ui};
use egui_plot::{Plot, PlotBounds, PlotPoints, Points};

use crate::color::HeightColorMap;
use crate::state::AppState;

const COLORBAR_WIDTH: f32 = 84.0;
const COLORBAR_STEPS: usize = 64;
const COLORBAR_TICKS: usize = 6;

// ---------------------------------------------------------------------------
// Bird's-eye LiDAR plot (left panel)
// ---------------------------------------------------------------------------

/// Render the top-down scatter with fixed axes and a height colour bar.
pub fn lidar_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&state.lidar_title);
        if let Some(lidar) = &state.lidar {
            ui.weak(format!("{} points", lidar.point_count));
        }
    });

    let extent = state.config.lidar_extent;
    let side = (ui.available_width() - COLORBAR_WIDTH)
        .min(ui.available_height())
        .max(100.0);

    ui.horizontal(|ui: &mut Ui| {
        Plot::new("lidar_plot")
            .width(side)
            .height(side)
            .x_axis_label("x (m)")
            .y_axis_label("y (m)")
            .allow_boxed_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_double_click_reset(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [-extent, -extent],
                    [extent, extent],
                ));

                let Some(lidar) = &state.lidar else {
                    return;
                };
                for (color, pts) in &lidar.series {
                    let points = Points::new(PlotPoints::from(pts.clone()))
                        .color(*color)
                        .radius(1.0);
                    plot_ui.points(points);
                }
            });

        colorbar(ui, &state.height_colors, side);
    });
}

// ---------------------------------------------------------------------------
// Colour bar
// ---------------------------------------------------------------------------

fn colorbar(ui: &mut Ui, colors: &HeightColorMap, height: f32) {
    let (rect, _) = ui.allocate_exact_size(vec2(COLORBAR_WIDTH, height), Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(11.0);

    painter.text(
        rect.left_top() + vec2(4.0, 0.0),
        Align2::LEFT_TOP,
        "Height (z, m)",
        font.clone(),
        text_color,
    );

    let bar = Rect::from_min_size(
        rect.left_top() + vec2(8.0, 22.0),
        vec2(14.0, (rect.height() - 32.0).max(10.0)),
    );
    let step = bar.height() / COLORBAR_STEPS as f32;
    for i in 0..COLORBAR_STEPS {
        // top of the bar is the high end
        let t = 1.0 - (i as f32 + 0.5) / COLORBAR_STEPS as f32;
        let segment = Rect::from_min_size(
            bar.left_top() + vec2(0.0, i as f32 * step),
            vec2(bar.width(), step + 0.5),
        );
        painter.rect_filled(segment, 0.0, colors.color_at(t));
    }

    let (vmin, vmax) = colors.range();
    for k in 0..COLORBAR_TICKS {
        let t = k as f32 / (COLORBAR_TICKS - 1) as f32;
        let value = vmin + t * (vmax - vmin);
        painter.text(
            pos2(bar.right() + 4.0, bar.bottom() - t * bar.height()),
            Align2::LEFT_CENTER,
            format!("{value:.1}"),
            font.clone(),
            text_color,
        );
    }
}
