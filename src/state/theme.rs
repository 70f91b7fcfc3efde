use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    pub fn surface_bg(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(20, 20, 20),
            Theme::Light => Color32::WHITE,
        }
    }

    /// Dashed zero-axis lines on the drawing surface.
    pub fn axis_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(110, 117, 128),
            Theme::Light => Color32::from_rgb(156, 163, 175),
        }
    }

    pub fn tick_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(71, 85, 105),
            Theme::Light => Color32::from_rgb(203, 213, 225),
        }
    }

    /// Axis captions and tick numbers.
    pub fn caption_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(148, 163, 184),
            Theme::Light => Color32::from_rgb(107, 114, 128),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}
