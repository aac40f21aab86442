use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::error::{DashError, Result};
use crate::record::{LaunchRecord, Outcome, PayloadRange, SiteSelection, PAYLOAD_SLIDER_MAX};

pub const LAUNCH_SITE_COLUMN: &str = "Launch Site";
pub const PAYLOAD_MASS_COLUMN: &str = "Payload Mass (kg)";
pub const CLASS_COLUMN: &str = "class";
pub const BOOSTER_VERSION_COLUMN: &str = "Booster Version Category";

const REQUIRED_COLUMNS: [&str; 4] = [
    LAUNCH_SITE_COLUMN,
    PAYLOAD_MASS_COLUMN,
    CLASS_COLUMN,
    BOOSTER_VERSION_COLUMN,
];

/// Row shape as it appears on disk. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvLaunchRow {
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "Payload Mass (kg)")]
    payload_mass_kg: f64,
    #[serde(rename = "class")]
    class: f64,
    #[serde(rename = "Booster Version Category")]
    booster_version_category: String,
}

impl CsvLaunchRow {
    fn into_record(self, line: usize) -> Result<LaunchRecord> {
        let outcome = if self.class == 1.0 {
            Outcome::Success
        } else if self.class == 0.0 {
            Outcome::Failure
        } else {
            return Err(DashError::DataLoad(format!(
                "line {}: column '{}' must be 0 or 1, found {}",
                line, CLASS_COLUMN, self.class
            )));
        };

        let record = LaunchRecord::new(
            self.launch_site,
            self.payload_mass_kg,
            outcome,
            self.booster_version_category,
        );
        validate_record(&record).map_err(|reason| {
            DashError::DataLoad(format!("line {}: {}", line, reason))
        })?;
        Ok(record)
    }
}

fn validate_record(record: &LaunchRecord) -> std::result::Result<(), String> {
    if record.launch_site.is_empty() {
        return Err(format!("column '{}' is empty", LAUNCH_SITE_COLUMN));
    }
    if !record.payload_mass_kg.is_finite() || record.payload_mass_kg < 0.0 {
        return Err(format!(
            "column '{}' must be a non-negative number, found {}",
            PAYLOAD_MASS_COLUMN, record.payload_mass_kg
        ));
    }
    Ok(())
}

/// Immutable, fully loaded launch table.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<LaunchRecord>,
    sites: Vec<String>,
    min_payload: f64,
    max_payload: f64,
}

impl Dataset {
    pub fn from_path(path: &Path) -> Result<Self> {
        let start_time = Instant::now();
        info!(action = "start", component = "dataset_load", file_path = ?path, "Loading launch data");

        if !path.exists() {
            return Err(DashError::DataLoad(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| {
            DashError::DataLoad(format!("failed to open {}: {}", path.display(), e))
        })?;
        let dataset = Self::from_reader(file)?;

        info!(
            action = "complete",
            component = "dataset_load",
            record_count = dataset.len(),
            site_count = dataset.sites().len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Launch data loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| DashError::DataLoad(format!("failed to read header row: {}", e)))?
            .clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(DashError::DataLoad(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<CsvLaunchRow>().enumerate() {
            // Header occupies line 1
            let line = idx + 2;
            let row = row.map_err(|e| DashError::DataLoad(format!("line {}: {}", line, e)))?;
            records.push(row.into_record(line)?);
        }

        Self::from_records(records)
    }

    pub fn from_records(records: Vec<LaunchRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(DashError::DataLoad(
                "dataset contains no launch records".to_string(),
            ));
        }
        for (idx, record) in records.iter().enumerate() {
            validate_record(record)
                .map_err(|reason| DashError::DataLoad(format!("record {}: {}", idx, reason)))?;
        }

        let sites: Vec<String> = records
            .iter()
            .map(|r| r.launch_site.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let (min_payload, max_payload) = records.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), r| (min.min(r.payload_mass_kg), max.max(r.payload_mass_kg)),
        );

        Ok(Self {
            records,
            sites,
            min_payload,
            max_payload,
        })
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct launch sites in ascending order.
    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    pub fn payload_bounds(&self) -> (f64, f64) {
        (self.min_payload, self.max_payload)
    }

    /// Initial slider position: observed payload bounds truncated to whole
    /// kilograms and clamped to the slider extent.
    pub fn default_payload_range(&self) -> PayloadRange {
        let max = f64::from(PAYLOAD_SLIDER_MAX);
        let low = self.min_payload.trunc().min(max) as u32;
        let high = self.max_payload.trunc().min(max) as u32;
        PayloadRange::new(low, high).unwrap_or_else(|_| PayloadRange::full())
    }

    pub fn has_site(&self, site: &str) -> bool {
        self.sites.binary_search_by(|s| s.as_str().cmp(site)).is_ok()
    }

    pub fn check_selection(&self, selection: &SiteSelection) -> Result<()> {
        match selection {
            SiteSelection::All => Ok(()),
            SiteSelection::Site(site) if self.has_site(site) => Ok(()),
            SiteSelection::Site(site) => Err(DashError::InvalidSelection(site.clone())),
        }
    }
}
