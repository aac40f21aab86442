//! Vega-Lite output for [`ChartSpec`]s.
//!
//! The browser page hands these documents straight to vega-embed. Field
//! names reuse the CSV column names so axis and legend titles read the same
//! as the source data.

use serde_json::{json, Value};

use crate::aggregate::{ChartData, ChartSpec};
use crate::dataset::{
    BOOSTER_VERSION_COLUMN, CLASS_COLUMN, LAUNCH_SITE_COLUMN, PAYLOAD_MASS_COLUMN,
};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v6.json";

const PIE_CATEGORY_FIELD: &str = "category";
const PIE_VALUE_FIELD: &str = "value";

pub fn to_vega_lite(spec: &ChartSpec) -> Value {
    let mut vl_spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": spec.title,
        "width": "container",
    });

    match &spec.data {
        ChartData::Pie(slices) => {
            let values: Vec<Value> = slices
                .iter()
                .map(|s| json!({ PIE_CATEGORY_FIELD: s.category, PIE_VALUE_FIELD: s.value }))
                .collect();

            vl_spec["data"] = json!({ "values": values });
            vl_spec["mark"] = json!({ "type": "arc", "tooltip": true });
            vl_spec["encoding"] = json!({
                "theta": { "field": PIE_VALUE_FIELD, "type": "quantitative", "stack": true },
                "color": { "field": PIE_CATEGORY_FIELD, "type": "nominal", "title": null },
            });
        }
        ChartData::Scatter(points) => {
            let values: Vec<Value> = points
                .iter()
                .map(|p| {
                    json!({
                        PAYLOAD_MASS_COLUMN: p.payload_mass_kg,
                        CLASS_COLUMN: p.outcome_class,
                        BOOSTER_VERSION_COLUMN: p.booster_version_category,
                        LAUNCH_SITE_COLUMN: p.launch_site,
                    })
                })
                .collect();

            vl_spec["data"] = json!({ "values": values });
            vl_spec["mark"] = json!({ "type": "point", "filled": true, "size": 80 });
            vl_spec["encoding"] = json!({
                "x": { "field": PAYLOAD_MASS_COLUMN, "type": "quantitative" },
                "y": {
                    "field": CLASS_COLUMN,
                    "type": "quantitative",
                    "scale": { "domain": [-0.1, 1.1] },
                    "axis": { "values": [0, 1] },
                },
                "color": { "field": BOOSTER_VERSION_COLUMN, "type": "nominal" },
                "tooltip": [
                    { "field": PAYLOAD_MASS_COLUMN, "type": "quantitative" },
                    { "field": CLASS_COLUMN, "type": "quantitative" },
                    { "field": BOOSTER_VERSION_COLUMN, "type": "nominal" },
                    { "field": LAUNCH_SITE_COLUMN, "type": "nominal" },
                ],
            });
        }
    }

    vl_spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{filter_by_payload_and_site, outcomes_by_site};
    use crate::dataset::fixtures::small_dataset;
    use crate::record::{PayloadRange, SiteSelection};

    #[test]
    fn test_pie_spec() {
        let chart = outcomes_by_site(&SiteSelection::All, &small_dataset());
        let vl = to_vega_lite(&chart);

        assert_eq!(vl["$schema"], VEGA_LITE_SCHEMA);
        assert_eq!(vl["title"], "Total Successful Launches by Site");
        assert_eq!(vl["mark"]["type"], "arc");
        assert_eq!(vl["encoding"]["theta"]["field"], "value");
        assert_eq!(vl["encoding"]["color"]["field"], "category");
        assert_eq!(
            vl["data"]["values"],
            json!([{"category": "A", "value": 1}, {"category": "B", "value": 1}])
        );
    }

    #[test]
    fn test_scatter_spec_uses_column_names() {
        let range = PayloadRange::new(0, 2_000).unwrap();
        let chart = filter_by_payload_and_site(&SiteSelection::All, range, &small_dataset());
        let vl = to_vega_lite(&chart);

        assert_eq!(vl["mark"]["type"], "point");
        assert_eq!(vl["encoding"]["x"]["field"], "Payload Mass (kg)");
        assert_eq!(vl["encoding"]["y"]["field"], "class");
        assert_eq!(vl["encoding"]["color"]["field"], "Booster Version Category");
        assert_eq!(vl["encoding"]["tooltip"][3]["field"], "Launch Site");

        let values = vl["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["Payload Mass (kg)"], 500.0);
        assert_eq!(values[0]["class"], 1);
        assert_eq!(values[0]["Launch Site"], "A");
    }

    #[test]
    fn test_empty_chart_is_still_valid() {
        let chart = outcomes_by_site(&SiteSelection::parse("Nowhere"), &small_dataset());
        let vl = to_vega_lite(&chart);
        assert_eq!(vl["data"]["values"], json!([]));
        assert_eq!(vl["title"], "Launch Outcomes for Nowhere");
    }
}
