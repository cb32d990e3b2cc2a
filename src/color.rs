use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};

use crate::data::model::Label;

// ---------------------------------------------------------------------------
// Label colours
// ---------------------------------------------------------------------------

/// Solid fill used for `Correcto` cells in spreadsheet exports.
pub const CORRECT_RGB: u32 = 0x00FF00;
/// Solid fill used for `Incorrecto` cells in spreadsheet exports.
pub const INCORRECT_RGB: u32 = 0xFF0000;

/// Colours associated with each label, shared by the GUI and the
/// spreadsheet writer.
pub struct LabelColors;

impl LabelColors {
    /// `0xRRGGBB` fill for a label; reviewed labels only.
    pub fn for_label(label: Label) -> Option<u32> {
        match label {
            Label::Correct => Some(CORRECT_RGB),
            Label::Incorrect => Some(INCORRECT_RGB),
            Label::NotReviewed => None,
        }
    }

    /// Strong colour for text and chart bars.
    pub fn strong(label: Label) -> Color32 {
        match Self::for_label(label) {
            Some(rgb) => to_color32(srgb_from_u32(rgb)),
            None => Color32::GRAY,
        }
    }

    /// Pale background tint for info boxes and badges.
    pub fn tint(label: Label) -> Color32 {
        match Self::for_label(label) {
            Some(rgb) => lighten(srgb_from_u32(rgb), 0.75),
            None => Color32::from_gray(230),
        }
    }
}

/// Background of the boxes holding the primary fields.
pub fn info_fill() -> Color32 {
    lighten(Srgb::new(0x1c, 0x83, 0xe1), 0.8)
}

fn srgb_from_u32(rgb: u32) -> Srgb<u8> {
    Srgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

fn lighten(c: Srgb<u8>, factor: f32) -> Color32 {
    let hsl: Hsl = c.into_format::<f32>().into_color();
    let rgb: Srgb = hsl.lighten(factor).into_color();
    to_color32(rgb.into_format())
}
