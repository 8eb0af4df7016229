use egui::{FontFamily, FontId, TextStyle};

/// UI preferences, persisted through eframe storage.
#[derive(serde::Deserialize, serde::Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub scale: f32,
    pub font_size: f32,
    /// Plot memory next to cpu in the trends window.
    pub show_memory_trend: bool,
    /// Ask before sending terminate.
    pub confirm_terminate: bool,
    #[serde(skip)]
    show_window: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 1.2,
            font_size: 15.0,
            show_memory_trend: true,
            confirm_terminate: true,
            show_window: false,
        }
    }
}

impl Settings {
    pub fn show(&mut self) {
        self.show_window = true;
    }

    pub fn is_visible(&self) -> bool {
        self.show_window
    }

    pub fn hide(&mut self) {
        self.show_window = false;
    }

    /// Restores the persisted fields, leaving the window open.
    pub fn reset(&mut self) {
        *self = Self {
            show_window: self.show_window,
            ..Self::default()
        };
    }

    pub fn apply(&self, ctx: &egui::Context) {
        if ctx.pixels_per_point() != self.scale {
            ctx.set_pixels_per_point(self.scale);
        }

        let sizes = [
            (TextStyle::Heading, 4.0, FontFamily::Proportional),
            (TextStyle::Body, 0.0, FontFamily::Proportional),
            (TextStyle::Button, 0.0, FontFamily::Proportional),
            (TextStyle::Monospace, 0.0, FontFamily::Monospace),
            (TextStyle::Small, -2.0, FontFamily::Proportional),
        ];
        ctx.style_mut(|style| {
            for (text_style, offset, family) in sizes {
                style
                    .text_styles
                    .insert(text_style, FontId::new(self.font_size + offset, family));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_window_open() {
        let mut settings = Settings {
            scale: 2.0,
            confirm_terminate: false,
            ..Settings::default()
        };
        settings.show();
        settings.reset();
        assert!(settings.is_visible());
        assert_eq!(settings.scale, 1.2);
        assert!(settings.confirm_terminate);
    }
}
