//! Clinical condition palette.

use toothmark_canvas::Color;

/// A clinical condition an annotation color stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Condition {
    #[default]
    InflamedGums,
    Malaligned,
    RecededGums,
    Stains,
    Attrition,
    Crowns,
}

impl Condition {
    /// Get the display label for this condition.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::InflamedGums => "Inflamed / Red gums",
            Condition::Malaligned => "Malaligned",
            Condition::RecededGums => "Receded gums",
            Condition::Stains => "Stains",
            Condition::Attrition => "Attrition",
            Condition::Crowns => "Crowns",
        }
    }

    /// Get the stroke color bound to this condition.
    pub fn color(&self) -> Color {
        match self {
            Condition::InflamedGums => Color::rgb(0x53, 0x2E, 0x5E),
            Condition::Malaligned => Color::rgb(0xF5, 0xD9, 0x53),
            Condition::RecededGums => Color::rgb(0xB2, 0xA0, 0xC2),
            Condition::Stains => Color::rgb(0xD3, 0x3E, 0x3E),
            Condition::Attrition => Color::rgb(0x58, 0xC3, 0xD1),
            Condition::Crowns => Color::rgb(0xD9, 0x36, 0x85),
        }
    }

    /// Get all conditions in palette order.
    pub fn all() -> &'static [Condition] {
        &[
            Condition::InflamedGums,
            Condition::Malaligned,
            Condition::RecededGums,
            Condition::Stains,
            Condition::Attrition,
            Condition::Crowns,
        ]
    }

    /// Find the condition a color belongs to.
    pub fn from_color(color: Color) -> Option<Condition> {
        Self::all().iter().copied().find(|c| c.color() == color)
    }
}
