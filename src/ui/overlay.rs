use egui::{Context, RichText, Sense, Stroke};

use crate::renderer::backend::BackendKind;
use crate::scene::ShadingMode;
use crate::ui::stats::{FrameStats, HISTORY_LEN, StatPanel};
use crate::ui::theme::{
    ACCENT_FALLBACK, GRAPH_HEIGHT, OVERLAY_FILL, PANEL_WIDTH, TEXT_MUTED, panel_colors,
};

pub const HELP_TEXT: &str = "LMB rotate | RMB pan | Wheel zoom | F1 overlay";

/// Scene facts shown under the stats panels.
pub struct SceneInfo<'a> {
    pub backend: BackendKind,
    pub adapter: &'a str,
    pub mode: ShadingMode,
    pub playhead: f64,
    pub frames: u64,
}

pub fn draw_overlay(ctx: &Context, stats: &FrameStats, info: &SceneInfo<'_>) {
    egui::Area::new(egui::Id::new("stats_overlay"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(0.0, 0.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for panel in stats.panels() {
                    draw_panel(ui, panel);
                }
            });

            egui::Frame::default()
                .fill(OVERLAY_FILL)
                .rounding(4.0)
                .inner_margin(6.0)
                .show(ui, |ui| {
                    let backend = RichText::new(format!(
                        "{} renderer: {}",
                        info.backend.label(),
                        info.adapter
                    ));
                    ui.label(match info.backend {
                        BackendKind::Preferred => backend,
                        BackendKind::Fallback => backend.color(ACCENT_FALLBACK),
                    });
                    ui.label(format!(
                        "{} | playhead {:+.4} | frame {}",
                        info.mode.label(),
                        info.playhead,
                        info.frames
                    ));
                    ui.label(RichText::new(HELP_TEXT).color(TEXT_MUTED));
                });
        });
}

fn draw_panel(ui: &mut egui::Ui, panel: &StatPanel) {
    let colors = panel_colors(panel.name);

    egui::Frame::default()
        .fill(colors.bg)
        .inner_margin(3.0)
        .show(ui, |ui| {
            ui.set_width(PANEL_WIDTH);
            ui.label(RichText::new(panel.label()).color(colors.fg).small());

            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(PANEL_WIDTH, GRAPH_HEIGHT), Sense::hover());
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, colors.fg.gamma_multiply(0.25));

            let peak = panel.max().max(f32::EPSILON);
            let bar_width = rect.width() / HISTORY_LEN as f32;
            let offset = HISTORY_LEN - panel.history().len();
            for (i, value) in panel.history().iter().enumerate() {
                let x = rect.left() + (offset + i) as f32 * bar_width;
                let height = (value / peak).clamp(0.0, 1.0) * rect.height();
                painter.line_segment(
                    [
                        egui::pos2(x, rect.bottom()),
                        egui::pos2(x, rect.bottom() - height),
                    ],
                    Stroke::new(bar_width, colors.fg),
                );
            }
        });
}

