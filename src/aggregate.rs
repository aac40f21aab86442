//! Aggregation engine behind the two dashboard charts.
//!
//! Both functions are pure: they read the dataset, never mutate it, and
//! return a [`ChartSpec`] the presentation layer renders as-is. A site
//! selection that names no known site simply matches no rows.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::record::{Outcome, PayloadRange, SiteSelection};

pub const ALL_SITES_PIE_TITLE: &str = "Total Successful Launches by Site";
pub const ALL_SITES_SCATTER_TITLE: &str = "Payload vs. Outcome (ALL Sites)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub payload_mass_kg: f64,
    pub outcome_class: u8,
    pub booster_version_category: String,
    pub launch_site: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "lowercase")]
pub enum ChartData {
    Pie(Vec<PieSlice>),
    Scatter(Vec<ScatterPoint>),
}

/// Everything the presentation layer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn len(&self) -> usize {
        match &self.data {
            ChartData::Pie(slices) => slices.len(),
            ChartData::Scatter(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pie chart data: successes per site for `All`, or the success/failure
/// split of one site.
pub fn outcomes_by_site(selection: &SiteSelection, dataset: &Dataset) -> ChartSpec {
    match selection {
        SiteSelection::All => {
            let mut successes: BTreeMap<&str, u32> = BTreeMap::new();
            for record in dataset.records() {
                *successes.entry(record.launch_site.as_str()).or_insert(0) +=
                    u32::from(record.outcome.class());
            }

            ChartSpec {
                title: ALL_SITES_PIE_TITLE.to_string(),
                data: ChartData::Pie(
                    successes
                        .into_iter()
                        .map(|(site, value)| PieSlice {
                            category: site.to_string(),
                            value,
                        })
                        .collect(),
                ),
            }
        }
        SiteSelection::Site(site) => {
            let (mut success, mut failure) = (0u32, 0u32);
            for record in dataset.records().iter().filter(|r| &r.launch_site == site) {
                match record.outcome {
                    Outcome::Success => success += 1,
                    Outcome::Failure => failure += 1,
                }
            }

            let slices = [(Outcome::Success, success), (Outcome::Failure, failure)]
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(outcome, value)| PieSlice {
                    category: outcome.label().to_string(),
                    value,
                })
                .collect();

            ChartSpec {
                title: format!("Launch Outcomes for {}", site),
                data: ChartData::Pie(slices),
            }
        }
    }
}

/// Scatter chart data: launches inside the inclusive payload window,
/// optionally restricted to one site, in dataset order.
pub fn filter_by_payload_and_site(
    selection: &SiteSelection,
    range: PayloadRange,
    dataset: &Dataset,
) -> ChartSpec {
    let points = dataset
        .records()
        .iter()
        .filter(|r| range.contains(r.payload_mass_kg) && selection.matches(&r.launch_site))
        .map(|r| ScatterPoint {
            payload_mass_kg: r.payload_mass_kg,
            outcome_class: r.outcome.class(),
            booster_version_category: r.booster_version_category.clone(),
            launch_site: r.launch_site.clone(),
        })
        .collect();

    let title = match selection {
        SiteSelection::All => ALL_SITES_SCATTER_TITLE.to_string(),
        SiteSelection::Site(site) => format!("Payload vs. Outcome \u{2014} {}", site),
    };

    ChartSpec {
        title,
        data: ChartData::Scatter(points),
    }
}
