//! RESAS API client for prefecture and population data.
//!
//! Issues key-authenticated GET requests against the RESAS open-data API
//! and reduces the nested per-year population payload to the five decade
//! samples the board displays.

use std::time::Duration;

use jinko_core::{Prefecture, SAMPLE_COUNT};
use serde::Deserialize;
use thiserror::Error;

/// Timeout for HTTP requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Offset of the 1980 entry in the per-year series (one entry every 5
/// years, starting at 1960).
const SAMPLE_OFFSET: usize = 4;

/// Stride between decade samples.
const SAMPLE_STRIDE: usize = 2;

/// Population values arrive in persons; the chart displays 万人.
const UNIT_DIVISOR: f64 = 10_000.0;

/// A failed fetch. Both variants are non-fatal: the caller logs them,
/// clears the loading indicator, and lets the user retry by toggling.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("unexpected payload: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct PrefecturesResponse {
    result: Vec<PrefectureEntry>,
}

#[derive(Debug, Deserialize)]
struct PrefectureEntry {
    #[serde(rename = "prefCode")]
    pref_code: u32,
    #[serde(rename = "prefName")]
    pref_name: String,
}

#[derive(Debug, Deserialize)]
struct PopulationResponse {
    result: PopulationResult,
}

#[derive(Debug, Deserialize)]
struct PopulationResult {
    data: Vec<CompositionSeries>,
}

#[derive(Debug, Deserialize)]
struct CompositionSeries {
    data: Vec<YearValue>,
}

#[derive(Debug, Deserialize)]
struct YearValue {
    value: f64,
}

/// Read-only RESAS API client.
#[derive(Debug)]
pub struct ResasClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl ResasClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .new_agent();
        Self {
            agent,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch the selectable prefecture list.
    pub fn prefectures(&self) -> Result<Vec<Prefecture>, FetchError> {
        let url = format!("{}/api/v1/prefectures", self.endpoint);
        let response: PrefecturesResponse = self.get_json(&url)?;
        Ok(response
            .result
            .into_iter()
            .map(|entry| Prefecture {
                code: entry.pref_code,
                name: entry.pref_name,
                selected: false,
            })
            .collect())
    }

    /// Fetch the total-population series for one prefecture, reduced to
    /// the five decade samples in 万人.
    pub fn population(&self, code: u32) -> Result<[f64; SAMPLE_COUNT], FetchError> {
        let url = format!(
            "{}/api/v1/population/composition/perYear?cityCode=-&prefCode={code}",
            self.endpoint
        );
        let response: PopulationResponse = self.get_json(&url)?;
        // The first composition series is the total population.
        let series = response
            .result
            .data
            .first()
            .ok_or_else(|| FetchError::Parse("empty composition data".into()))?;
        sample_decades(&series.data)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.agent
            .get(url)
            .header("X-API-KEY", self.api_key.as_str())
            .call()
            .map_err(|e| FetchError::Network(e.to_string()))?
            .body_mut()
            .read_json()
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

/// Sample every 2nd entry starting at the 1980 offset, scaled to 万人.
fn sample_decades(points: &[YearValue]) -> Result<[f64; SAMPLE_COUNT], FetchError> {
    let mut out = [0.0; SAMPLE_COUNT];
    for (i, slot) in out.iter_mut().enumerate() {
        let idx = SAMPLE_OFFSET + SAMPLE_STRIDE * i;
        let point = points.get(idx).ok_or_else(|| {
            FetchError::Parse(format!("series too short: no entry at index {idx}"))
        })?;
        *slot = point.value / UNIT_DIVISOR;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A per-year series shaped like the RESAS payload: one entry every
    /// five years from 1960, value = year * 1000 persons.
    fn per_year_series(len: usize) -> Vec<YearValue> {
        (0..len)
            .map(|i| YearValue {
                value: (1960 + 5 * i) as f64 * 1000.0,
            })
            .collect()
    }

    #[test]
    fn samples_the_five_decades() {
        let samples = sample_decades(&per_year_series(19)).unwrap();
        assert_eq!(samples, [198.0, 199.0, 200.0, 201.0, 202.0]);
    }

    #[test]
    fn short_series_is_a_parse_failure() {
        // Index 12 (the 2020 sample) is missing.
        let err = sample_decades(&per_year_series(12)).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn deserializes_the_prefecture_payload() {
        let json = r#"{
            "message": null,
            "result": [
                { "prefCode": 1, "prefName": "北海道" },
                { "prefCode": 13, "prefName": "東京都" }
            ]
        }"#;
        let response: PrefecturesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.result.len(), 2);
        assert_eq!(response.result[1].pref_code, 13);
        assert_eq!(response.result[1].pref_name, "東京都");
    }

    #[test]
    fn deserializes_the_population_payload() {
        let json = r#"{
            "message": null,
            "result": {
                "boundaryYear": 2020,
                "data": [
                    {
                        "label": "総人口",
                        "data": [
                            { "year": 1960, "value": 5039206 },
                            { "year": 1965, "value": 5171800 },
                            { "year": 1970, "value": 5184287 },
                            { "year": 1975, "value": 5338206 },
                            { "year": 1980, "value": 5575989 },
                            { "year": 1985, "value": 5679439 },
                            { "year": 1990, "value": 5643647 },
                            { "year": 1995, "value": 5692321 },
                            { "year": 2000, "value": 5683062 },
                            { "year": 2005, "value": 5627737 },
                            { "year": 2010, "value": 5506419 },
                            { "year": 2015, "value": 5381733 },
                            { "year": 2020, "value": 5224614 }
                        ]
                    }
                ]
            }
        }"#;
        let response: PopulationResponse = serde_json::from_str(json).unwrap();
        let samples = sample_decades(&response.result.data[0].data).unwrap();
        assert_eq!(samples[0], 557.5989);
        assert_eq!(samples[4], 522.4614);
    }

    #[test]
    fn client_strips_trailing_slash_from_endpoint() {
        let client = ResasClient::new("https://example.test/", "key");
        assert_eq!(client.endpoint, "https://example.test");
    }
}
