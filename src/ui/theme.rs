use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

/// Foreground/background pair of one stats panel.
#[derive(Clone, Copy, Debug)]
pub struct PanelColors {
    pub fg: Color32,
    pub bg: Color32,
}

pub const FPS_COLORS: PanelColors = PanelColors {
    fg: Color32::from_rgb(0, 255, 255),
    bg: Color32::from_rgb(0, 0, 34),
};
pub const MS_COLORS: PanelColors = PanelColors {
    fg: Color32::from_rgb(0, 255, 0),
    bg: Color32::from_rgb(0, 34, 0),
};
pub const MB_COLORS: PanelColors = PanelColors {
    fg: Color32::from_rgb(255, 136, 255),
    bg: Color32::from_rgb(34, 17, 34),
};

pub const OVERLAY_FILL: Color32 = Color32::from_black_alpha(180);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(200, 200, 205);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 128);
pub const ACCENT_FALLBACK: Color32 = Color32::from_rgb(230, 160, 40);

pub const PANEL_WIDTH: f32 = 80.0;
pub const GRAPH_HEIGHT: f32 = 30.0;

pub fn panel_colors(name: &str) -> PanelColors {
    match name {
        "FPS" => FPS_COLORS,
        "MS" => MS_COLORS,
        _ => MB_COLORS,
    }
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals = Visuals::dark();
    style.visuals.override_text_color = Some(TEXT_PRIMARY);
    style.visuals.window_rounding = Rounding::same(4.0);
    style.visuals.window_stroke = Stroke::NONE;
    style.visuals.window_shadow = egui::epaint::Shadow::NONE;

    style.spacing.item_spacing = egui::vec2(4.0, 4.0);
    style.interaction.selectable_labels = false;

    style.text_styles = [
        (TextStyle::Small, FontId::new(9.0, FontFamily::Monospace)),
        (TextStyle::Body, FontId::new(11.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(11.0, FontFamily::Monospace)),
        (TextStyle::Heading, FontId::new(13.0, FontFamily::Monospace)),
        (TextStyle::Monospace, FontId::new(11.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panels_have_distinct_colors() {
        assert_eq!(panel_colors("FPS").fg, Color32::from_rgb(0, 255, 255));
        assert_eq!(panel_colors("MS").fg, Color32::from_rgb(0, 255, 0));
        assert_eq!(panel_colors("MB").bg, Color32::from_rgb(34, 17, 34));
    }
}
