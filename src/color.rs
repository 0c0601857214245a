use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use trade_dashboard::data::model::{Direction, TradeDataset};

pub const IMPORT_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
pub const EXPORT_COLOR: Color32 = Color32::from_rgb(0xff, 0x7f, 0x0e);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart colours: direction / category → Color32
// ---------------------------------------------------------------------------

/// Stable colours for every direction and category of a dataset, so the same
/// value keeps its colour across charts and filter changes.
#[derive(Debug, Clone, Default)]
pub struct ChartColors {
    directions: BTreeMap<Direction, Color32>,
    categories: BTreeMap<String, Color32>,
}

impl ChartColors {
    pub fn new(dataset: &TradeDataset) -> Self {
        let others: Vec<&Direction> = dataset
            .directions()
            .iter()
            .filter(|d| matches!(d, Direction::Other(_)))
            .collect();
        let mut directions: BTreeMap<Direction, Color32> = others
            .iter()
            .zip(generate_palette(others.len()))
            .map(|(d, c)| ((*d).clone(), c))
            .collect();
        directions.insert(Direction::Import, IMPORT_COLOR);
        directions.insert(Direction::Export, EXPORT_COLOR);

        let categories = dataset
            .categories()
            .iter()
            .zip(generate_palette(dataset.categories().len()))
            .map(|(name, c)| (name.clone(), c))
            .collect();

        ChartColors {
            directions,
            categories,
        }
    }

    pub fn direction(&self, direction: &Direction) -> Color32 {
        self.directions
            .get(direction)
            .copied()
            .unwrap_or(Color32::GRAY)
    }

    pub fn category(&self, category: &str) -> Color32 {
        self.categories
            .get(category)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use trade_dashboard::data::model::Transaction;

    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn known_directions_keep_fixed_colours() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let ds = TradeDataset::from_transactions(
            vec![
                Transaction::new("Toys", Direction::Export, 1.0, d),
                Transaction::new("Clothing", Direction::Other("Re-export".into()), 2.0, d),
            ],
            2,
            0,
        );
        let colors = ChartColors::new(&ds);

        assert_eq!(colors.direction(&Direction::Import), IMPORT_COLOR);
        assert_eq!(colors.direction(&Direction::Export), EXPORT_COLOR);
        assert_ne!(colors.direction(&Direction::Other("Re-export".into())), Color32::GRAY);
        assert_ne!(colors.category("Toys"), colors.category("Clothing"));
        assert_eq!(colors.category("Unknown"), Color32::GRAY);
    }
}
