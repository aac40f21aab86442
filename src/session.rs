//! Reactive bindings between dashboard inputs and charts.
//!
//! Each browser session owns its own selection state. An input change is
//! looked up in [`DISPATCH_TABLE`] and only the charts that depend on that
//! input are recomputed.
//!
//! Sessions are keyed by a UUID and expire after a period of inactivity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate::{filter_by_payload_and_site, outcomes_by_site, ChartSpec};
use crate::dataset::Dataset;
use crate::error::{DashError, Result};
use crate::record::{PayloadRange, SiteSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputId {
    #[serde(rename = "site-dropdown")]
    SiteDropdown,
    #[serde(rename = "payload-slider")]
    PayloadSlider,
}

impl InputId {
    pub fn as_str(self) -> &'static str {
        match self {
            InputId::SiteDropdown => "site-dropdown",
            InputId::PayloadSlider => "payload-slider",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputId {
    #[serde(rename = "success-pie-chart")]
    SuccessPieChart,
    #[serde(rename = "success-payload-scatter-chart")]
    SuccessPayloadScatterChart,
}

impl OutputId {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputId::SuccessPieChart => "success-pie-chart",
            OutputId::SuccessPayloadScatterChart => "success-payload-scatter-chart",
        }
    }
}

/// Which charts each input refreshes.
pub const DISPATCH_TABLE: &[(InputId, &[OutputId])] = &[
    (
        InputId::SiteDropdown,
        &[OutputId::SuccessPieChart, OutputId::SuccessPayloadScatterChart],
    ),
    (InputId::PayloadSlider, &[OutputId::SuccessPayloadScatterChart]),
];

/// Every output, in page order.
pub const ALL_OUTPUTS: [OutputId; 2] = [
    OutputId::SuccessPieChart,
    OutputId::SuccessPayloadScatterChart,
];

pub fn outputs_for(input: InputId) -> &'static [OutputId] {
    DISPATCH_TABLE
        .iter()
        .find(|(id, _)| *id == input)
        .map(|(_, outputs)| *outputs)
        .unwrap_or(&[])
}

/// A change reported by one dashboard control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "id", content = "value")]
pub enum InputEvent {
    #[serde(rename = "site-dropdown")]
    SiteChanged(SiteSelection),
    #[serde(rename = "payload-slider")]
    PayloadChanged(PayloadRange),
}

/// Wire shape of an input change before the value is checked.
#[derive(Debug, Deserialize)]
struct RawInput {
    id: InputId,
    value: serde_json::Value,
}

impl InputEvent {
    /// Decodes a `{ "id": ..., "value": ... }` body, reporting an out-of-bounds
    /// slider as `InvalidRange` and any other malformed body as `InvalidInput`.
    pub fn from_json(body: serde_json::Value) -> Result<Self> {
        let raw: RawInput =
            serde_json::from_value(body).map_err(|e| DashError::InvalidInput(e.to_string()))?;

        match raw.id {
            InputId::SiteDropdown => {
                let site: String = serde_json::from_value(raw.value).map_err(|e| {
                    DashError::InvalidInput(format!("{}: {}", InputId::SiteDropdown.as_str(), e))
                })?;
                Ok(InputEvent::SiteChanged(SiteSelection::parse(&site)))
            }
            InputId::PayloadSlider => {
                let [low, high]: [u32; 2] = serde_json::from_value(raw.value).map_err(|e| {
                    DashError::InvalidInput(format!("{}: {}", InputId::PayloadSlider.as_str(), e))
                })?;
                Ok(InputEvent::PayloadChanged(PayloadRange::new(low, high)?))
            }
        }
    }

    pub fn input(&self) -> InputId {
        match self {
            InputEvent::SiteChanged(_) => InputId::SiteDropdown,
            InputEvent::PayloadChanged(_) => InputId::PayloadSlider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartUpdate {
    pub output: OutputId,
    pub chart: ChartSpec,
}

#[derive(Debug, Clone)]
pub struct Session {
    site: SiteSelection,
    payload: PayloadRange,
    last_seen: DateTime<Utc>,
}

impl Session {
    /// Starts on every site with the slider at the dataset's payload bounds.
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            site: SiteSelection::All,
            payload: dataset.default_payload_range(),
            last_seen: Utc::now(),
        }
    }

    pub fn site(&self) -> &SiteSelection {
        &self.site
    }

    pub fn payload(&self) -> PayloadRange {
        self.payload
    }

    pub fn render(&self, output: OutputId, dataset: &Dataset) -> ChartSpec {
        match output {
            OutputId::SuccessPieChart => outcomes_by_site(&self.site, dataset),
            OutputId::SuccessPayloadScatterChart => {
                filter_by_payload_and_site(&self.site, self.payload, dataset)
            }
        }
    }

    pub fn render_all(&self, dataset: &Dataset) -> Vec<ChartUpdate> {
        self.render_outputs(&ALL_OUTPUTS, dataset)
    }

    /// Stores the new input value and recomputes the dependent charts.
    pub fn apply(&mut self, event: InputEvent, dataset: &Dataset) -> Vec<ChartUpdate> {
        let input = event.input();
        match event {
            InputEvent::SiteChanged(site) => {
                if let Err(e) = dataset.check_selection(&site) {
                    warn!(action = "select", component = "site_dropdown", error = %e, "Unknown site selected, charts will be empty");
                }
                self.site = site;
            }
            InputEvent::PayloadChanged(range) => self.payload = range,
        }
        self.last_seen = Utc::now();

        self.render_outputs(outputs_for(input), dataset)
    }

    fn render_outputs(&self, outputs: &[OutputId], dataset: &Dataset) -> Vec<ChartUpdate> {
        outputs
            .iter()
            .map(|&output| ChartUpdate {
                output,
                chart: self.render(output, dataset),
            })
            .collect()
    }

    fn is_idle(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_seen > ttl
    }
}

/// Longest accepted idle timeout: one year.
pub const MAX_SESSION_TTL_MINS: u64 = 525_600;

/// All live sessions. Sessions never see each other's state.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    /// `ttl_minutes` is capped at [`MAX_SESSION_TTL_MINS`].
    pub fn new(ttl_minutes: u64) -> Self {
        let ttl_minutes = ttl_minutes.min(MAX_SESSION_TTL_MINS) as i64;
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::try_minutes(ttl_minutes).unwrap_or_else(|| Duration::days(365)),
        }
    }

    /// Opens a session and returns its id together with the first paint of every chart.
    pub fn create(&self, dataset: &Dataset) -> (String, Vec<ChartUpdate>) {
        let id = Uuid::new_v4().simple().to_string();
        let session = Session::new(dataset);
        let updates = session.render_all(dataset);

        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), session);

        info!(action = "create", component = "session", session_id = %id, "Session created");
        (id, updates)
    }

    pub fn dispatch(
        &self,
        id: &str,
        event: InputEvent,
        dataset: &Dataset,
    ) -> Result<Vec<ChartUpdate>> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| DashError::UnknownSession(id.to_string()))?;

        let input = event.input();
        let updates = session.apply(event, dataset);
        debug!(
            action = "dispatch",
            component = "session",
            session_id = id,
            input = input.as_str(),
            refreshed = updates.len(),
            "Input dispatched"
        );
        Ok(updates)
    }

    pub fn snapshot(&self, id: &str) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some();
        if removed {
            info!(action = "remove", component = "session", session_id = id, "Session closed");
        }
        removed
    }

    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Utc::now())
    }

    /// Drops sessions whose last input is older than the TTL at `now`.
    pub fn evict_idle_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_idle(now, self.ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(action = "evict", component = "session", evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
