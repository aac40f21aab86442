use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::{
    SiteSelection, ALL_SITES, PAYLOAD_SLIDER_MAX, PAYLOAD_SLIDER_MIN, PAYLOAD_SLIDER_STEP,
};
use crate::session::{InputId, OutputId};

pub const DASHBOARD_TITLE: &str = "SpaceX Launch Records Dashboard";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStyle {
    pub text_align: &'static str,
    pub color: &'static str,
    pub font_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dropdown {
    pub id: InputId,
    pub options: Vec<DropdownOption>,
    pub value: SiteSelection,
    pub placeholder: &'static str,
    pub searchable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub id: InputId,
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub value: [u32; 2],
}

/// Page components, top to bottom.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Component {
    Heading { text: &'static str, style: HeadingStyle },
    Dropdown(Dropdown),
    Graph { id: OutputId },
    Paragraph { text: &'static str },
    RangeSlider(RangeSlider),
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardLayout {
    pub title: &'static str,
    pub components: Vec<Component>,
}

impl DashboardLayout {
    pub fn new(dataset: &Dataset) -> Self {
        let mut options = vec![DropdownOption {
            label: "All Sites".to_string(),
            value: ALL_SITES.to_string(),
        }];
        options.extend(dataset.sites().iter().map(|site| DropdownOption {
            label: site.clone(),
            value: site.clone(),
        }));

        let default_range = dataset.default_payload_range();

        Self {
            title: DASHBOARD_TITLE,
            components: vec![
                Component::Heading {
                    text: DASHBOARD_TITLE,
                    style: HeadingStyle {
                        text_align: "center",
                        color: "#503D36",
                        font_size: 40,
                    },
                },
                Component::Dropdown(Dropdown {
                    id: InputId::SiteDropdown,
                    options,
                    value: SiteSelection::All,
                    placeholder: "Select a Launch Site here",
                    searchable: true,
                }),
                Component::Graph {
                    id: OutputId::SuccessPieChart,
                },
                Component::Paragraph {
                    text: "Payload range (Kg):",
                },
                Component::RangeSlider(RangeSlider {
                    id: InputId::PayloadSlider,
                    min: PAYLOAD_SLIDER_MIN,
                    max: PAYLOAD_SLIDER_MAX,
                    step: PAYLOAD_SLIDER_STEP,
                    value: [default_range.low(), default_range.high()],
                }),
                Component::Graph {
                    id: OutputId::SuccessPayloadScatterChart,
                },
            ],
        }
    }
}
