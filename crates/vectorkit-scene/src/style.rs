//! Style capability: an ordered set of paint entries attached to a shape.

use serde::{Deserialize, Serialize};

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);
}

/// Blend mode used when compositing a sub-canvas back onto its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
}

/// One paint entry of a style set. Entries are painted in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleEntry {
    Fill { color: Color },
    Stroke { color: Color, width: f64 },
}

/// Ordered style set with element-level compositing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSet {
    pub entries: Vec<StyleEntry>,
    pub opacity: f64,
    pub blend: BlendMode,
}

impl Default for StyleSet {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            opacity: 1.0,
            blend: BlendMode::Normal,
        }
    }
}

impl StyleSet {
    /// Default style applied to newly inserted elements.
    pub fn initial() -> Self {
        Self {
            entries: vec![
                StyleEntry::Fill {
                    color: Color::WHITE,
                },
                StyleEntry::Stroke {
                    color: Color::BLACK,
                    width: 1.0,
                },
            ],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How far the painted result may extend past the geometry on each
    /// side: half the widest stroke.
    pub fn paint_margin(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| match e {
                StyleEntry::Stroke { width, .. } => width / 2.0,
                StyleEntry::Fill { .. } => 0.0,
            })
            .fold(0.0, f64::max)
    }

    /// Whether painting this style requires an intermediate canvas.
    pub fn needs_compositing(&self) -> bool {
        self.opacity < 1.0 || self.blend != BlendMode::Normal
    }
}
