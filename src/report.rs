use crate::aggregate::{outcomes_by_site, ChartData};
use crate::dataset::Dataset;
use crate::record::{Outcome, SiteSelection};
use crate::utils::format_number;

#[derive(Debug, Clone, PartialEq)]
pub struct SiteSummary {
    pub site: String,
    pub launches: u32,
    pub successes: u32,
}

impl SiteSummary {
    pub fn success_rate(&self) -> f64 {
        if self.launches == 0 {
            0.0
        } else {
            f64::from(self.successes) / f64::from(self.launches) * 100.0
        }
    }
}

/// Per-site launch and success counts, built from the pie chart data.
pub fn site_summaries(dataset: &Dataset) -> Vec<SiteSummary> {
    dataset
        .sites()
        .iter()
        .map(|site| {
            let chart = outcomes_by_site(&SiteSelection::parse(site), dataset);
            let (mut launches, mut successes) = (0, 0);
            if let ChartData::Pie(slices) = chart.data {
                for slice in slices {
                    launches += slice.value;
                    if slice.category == Outcome::Success.label() {
                        successes += slice.value;
                    }
                }
            }
            SiteSummary {
                site: site.clone(),
                launches,
                successes,
            }
        })
        .collect()
}

pub fn print_summary(dataset: &Dataset) {
    let (min_payload, max_payload) = dataset.payload_bounds();
    let default_range = dataset.default_payload_range();
    let summaries = site_summaries(dataset);

    println!("\n--- Launch Records Summary ---");
    println!(
        "Launch records: {}",
        format_number(u32::try_from(dataset.len()).unwrap_or(u32::MAX))
    );
    println!("Launch sites: {}", dataset.sites().len());
    println!(
        "Payload mass: {:.1} kg to {:.1} kg (slider starts at {} - {})",
        min_payload,
        max_payload,
        format_number(default_range.low()),
        format_number(default_range.high())
    );

    let width = summaries
        .iter()
        .map(|s| s.site.len())
        .max()
        .unwrap_or(0)
        .max("Site".len());

    println!(
        "\n{:<width$}  {:>8}  {:>9}  {:>7}",
        "Site",
        "Launches",
        "Successes",
        "Rate",
        width = width
    );
    for summary in &summaries {
        println!(
            "{:<width$}  {:>8}  {:>9}  {:>6.1}%",
            summary.site,
            format_number(summary.launches),
            format_number(summary.successes),
            summary.success_rate(),
            width = width
        );
    }

    let total_successes: u32 = summaries.iter().map(|s| s.successes).sum();
    println!("\nTotal successful launches: {}", format_number(total_successes));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::small_dataset;

    #[test]
    fn test_site_summaries() {
        let summaries = site_summaries(&small_dataset());
        assert_eq!(
            summaries,
            vec![
                SiteSummary {
                    site: "A".to_string(),
                    launches: 2,
                    successes: 1
                },
                SiteSummary {
                    site: "B".to_string(),
                    launches: 1,
                    successes: 1
                },
            ]
        );
        assert_eq!(summaries[0].success_rate(), 50.0);
        assert_eq!(summaries[1].success_rate(), 100.0);
    }
}
