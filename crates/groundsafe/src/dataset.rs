//! Loading the static catalog document.
//!
//! A catalog document is one JSON object holding the safety-performance
//! goals, the yearly series, the airport distribution, the dashboard's key
//! findings and the case records.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::record::IncidentRecord;
use crate::stats::{AirportStat, YearStat};

/// One safety-performance target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyGoal {
    /// Top-level occurrence category.
    pub category: String,
    /// Occurrence kind within the category.
    pub sub_category: String,
    /// Target rate, already formatted (`0.291건`).
    pub target: String,
}

/// A headline accident type shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentType {
    /// Short name.
    pub title: String,
    /// One-line description.
    pub detail: String,
}

/// Curated findings shown above the charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFindings {
    /// Main accident types.
    pub types: Vec<AccidentType>,
    /// Main causes.
    pub causes: Vec<String>,
}

impl KeyFindings {
    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.causes.is_empty()
    }
}

/// The complete static dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Safety-performance goals, in table order.
    pub goals: Vec<SafetyGoal>,
    /// Yearly accident series, oldest first.
    pub yearly: Vec<YearStat>,
    /// Accident distribution by airport.
    pub airports: Vec<AirportStat>,
    /// Curated dashboard findings.
    pub findings: KeyFindings,
    /// Case records.
    pub cases: Vec<IncidentRecord>,
}

impl Dataset {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or does not match
    /// the catalog format.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::DatasetRead {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset: Self = serde_json::from_str(&json).map_err(|source| Error::DatasetParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            cases = dataset.cases.len(),
            goals = dataset.goals.len(),
            years = dataset.yearly.len(),
            airports = dataset.airports.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }
}
