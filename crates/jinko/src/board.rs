//! Population board state: selectable prefectures, accumulated series
//! data, color assignments, and the shared loading indicator.
//!
//! The board is purely single-threaded state. Network work happens
//! elsewhere; the board only records that a fetch is outstanding and
//! merges its result when it lands.

use std::collections::HashSet;

use jinko_core::{ColorTable, DECADES, Prefecture, SAMPLE_COUNT, SeriesPoint};
use ratatui::style::Color;

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Series data never fetched; the caller must start a fetch.
    FetchNeeded,
    /// Selection flag flipped locally to the contained value.
    Flipped(bool),
    /// A fetch for this prefecture is already outstanding.
    InFlight,
}

/// One plottable line: label, color, decade points.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug)]
pub struct PopulationBoard {
    prefectures: Vec<Prefecture>,
    rows: Vec<SeriesPoint>,
    colors: ColorTable,
    /// Prefecture codes with a series fetch outstanding.
    in_flight: HashSet<u32>,
    /// Reference count of outstanding jobs; one completed fetch must not
    /// clear the indicator while another is still running.
    loading_jobs: usize,
}

impl Default for PopulationBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulationBoard {
    pub fn new() -> Self {
        Self {
            prefectures: Vec::new(),
            rows: DECADES.iter().map(|&year| SeriesPoint::new(year)).collect(),
            colors: ColorTable::default(),
            in_flight: HashSet::new(),
            loading_jobs: 0,
        }
    }

    /// Install the fetched prefecture list.
    pub fn set_prefectures(&mut self, prefectures: Vec<Prefecture>) {
        self.prefectures = prefectures;
    }

    /// Record the start of a background job (region-list or series fetch).
    pub fn job_started(&mut self) {
        self.loading_jobs += 1;
    }

    /// Record the completion of a background job, success or failure.
    pub fn job_finished(&mut self) {
        self.loading_jobs = self.loading_jobs.saturating_sub(1);
    }

    /// True while any background job is outstanding.
    pub fn loading(&self) -> bool {
        self.loading_jobs > 0
    }

    /// Handle a toggle request for `code`.
    ///
    /// Already-fetched prefectures just flip their `selected` flag — no
    /// network call, no loading state. Unfetched ones are marked in
    /// flight and reported as [`Toggle::FetchNeeded`]; a second toggle
    /// while the fetch is outstanding is ignored.
    pub fn toggle(&mut self, code: u32) -> Toggle {
        if self.has_series(code) {
            Toggle::Flipped(self.flip_selected(code))
        } else if self.in_flight.contains(&code) {
            Toggle::InFlight
        } else {
            self.in_flight.insert(code);
            self.job_started();
            Toggle::FetchNeeded
        }
    }

    /// Merge a fetched series into the shared rows, select the
    /// prefecture, and assign it a color if it never had one.
    pub fn apply_series(&mut self, code: u32, values: [f64; SAMPLE_COUNT]) {
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.values.insert(code, value);
        }
        self.set_selected(code, true);
        self.colors.assign(code);
        self.in_flight.remove(&code);
        self.job_finished();
    }

    /// A series fetch failed: clear the in-flight mark and the loading
    /// reference, leaving the prefecture unselected. No automatic retry.
    pub fn series_failed(&mut self, code: u32) {
        self.in_flight.remove(&code);
        self.job_finished();
    }

    pub fn prefectures(&self) -> &[Prefecture] {
        &self.prefectures
    }

    pub fn rows(&self) -> &[SeriesPoint] {
        &self.rows
    }

    /// Color assigned to `code`, if it was ever selected.
    pub fn color(&self, code: u32) -> Option<Color> {
        self.colors.get(code)
    }

    /// Plottable lines for the currently selected prefectures.
    pub fn chart_series(&self) -> Vec<ChartSeries> {
        self.prefectures
            .iter()
            .filter(|pref| pref.selected)
            .filter_map(|pref| {
                let color = self.colors.get(pref.code)?;
                let points: Vec<(f64, f64)> = self
                    .rows
                    .iter()
                    .filter_map(|row| {
                        row.values
                            .get(&pref.code)
                            .map(|value| (f64::from(row.year), *value))
                    })
                    .collect();
                Some(ChartSeries {
                    name: pref.name.clone(),
                    color,
                    points,
                })
            })
            .collect()
    }

    /// Largest plotted value, for the y-axis upper bound.
    pub fn max_value(&self) -> f64 {
        self.chart_series()
            .iter()
            .flat_map(|series| series.points.iter().map(|(_, v)| *v))
            .fold(0.0, f64::max)
    }

    fn has_series(&self, code: u32) -> bool {
        self.rows
            .first()
            .is_some_and(|row| row.values.contains_key(&code))
    }

    /// Replace the record sequence with one where `code`'s selected flag
    /// is `selected`; other records are untouched.
    fn set_selected(&mut self, code: u32, selected: bool) {
        self.prefectures = self
            .prefectures
            .iter()
            .map(|pref| {
                let mut pref = pref.clone();
                if pref.code == code {
                    pref.selected = selected;
                }
                pref
            })
            .collect();
    }

    fn flip_selected(&mut self, code: u32) -> bool {
        let selected = !self
            .prefectures
            .iter()
            .find(|pref| pref.code == code)
            .is_some_and(|pref| pref.selected);
        self.set_selected(code, selected);
        selected
    }
}
