//! Shared types for the jinko population board.

use std::collections::BTreeMap;

use ratatui::style::Color;

/// Decades shown on the chart, in row order.
pub const DECADES: [u16; 5] = [1980, 1990, 2000, 2010, 2020];

/// Number of samples kept per prefecture (one per decade).
pub const SAMPLE_COUNT: usize = DECADES.len();

/// Line colors cycled through as prefectures are first selected.
pub const PALETTE: [Color; 8] = [
    Color::Rgb(0x55, 0xef, 0xc4),
    Color::Rgb(0x57, 0x60, 0x6f),
    Color::Rgb(0x74, 0xb9, 0xff),
    Color::Rgb(0xa2, 0x9b, 0xfe),
    Color::Rgb(0xff, 0xea, 0xa7),
    Color::Rgb(0xfa, 0xb1, 0xa0),
    Color::Rgb(0xd6, 0x30, 0x31),
    Color::Rgb(0xe8, 0x43, 0x93),
];

/// A selectable prefecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefecture {
    /// RESAS prefecture code (1..=47).
    pub code: u32,
    /// Display name, as returned by the API.
    pub name: String,
    /// Whether the prefecture's series is currently plotted.
    pub selected: bool,
}

/// One chart row: a year plus the value (in 万人) for every fetched
/// prefecture, keyed by prefecture code.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub year: u16,
    pub values: BTreeMap<u32, f64>,
}

impl SeriesPoint {
    /// Create an empty row for the given year.
    pub fn new(year: u16) -> Self {
        Self {
            year,
            values: BTreeMap::new(),
        }
    }
}

/// Session-stable color assignments for selected prefectures.
///
/// Colors are handed out first-selected-first-assigned, cycling through
/// [`PALETTE`] by insertion order. An assignment is never revoked, so a
/// deselected prefecture keeps its color for when it is selected again.
#[derive(Debug, Default)]
pub struct ColorTable {
    assigned: Vec<(u32, Color)>,
    cursor: usize,
}

impl ColorTable {
    /// Return the color assigned to `code`, assigning the next palette
    /// entry if this is the first time the code is seen.
    pub fn assign(&mut self, code: u32) -> Color {
        if let Some(color) = self.get(code) {
            return color;
        }
        let color = PALETTE[self.cursor % PALETTE.len()];
        self.cursor += 1;
        self.assigned.push((code, color));
        color
    }

    /// Look up an existing assignment without creating one.
    pub fn get(&self, code: u32) -> Option<Color> {
        self.assigned
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, color)| *color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_palette_in_insertion_order() {
        let mut table = ColorTable::default();
        assert_eq!(table.assign(13), PALETTE[0]);
        assert_eq!(table.assign(27), PALETTE[1]);
        assert_eq!(table.assign(1), PALETTE[2]);
    }

    #[test]
    fn assignment_is_idempotent() {
        let mut table = ColorTable::default();
        let first = table.assign(13);
        table.assign(27);
        // Re-assigning must not advance the cursor or change the color.
        assert_eq!(table.assign(13), first);
        assert_eq!(table.assign(40), PALETTE[2]);
    }

    #[test]
    fn palette_wraps_after_eight_assignments() {
        let mut table = ColorTable::default();
        for code in 1..=8 {
            table.assign(code);
        }
        assert_eq!(table.assign(9), PALETTE[0]);
    }

    #[test]
    fn get_does_not_assign() {
        let mut table = ColorTable::default();
        assert_eq!(table.get(13), None);
        table.assign(13);
        assert_eq!(table.get(13), Some(PALETTE[0]));
    }

    #[test]
    fn series_point_starts_empty() {
        let row = SeriesPoint::new(1980);
        assert_eq!(row.year, 1980);
        assert!(row.values.is_empty());
    }
}
