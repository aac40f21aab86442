pub mod aggregate;
pub mod args;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod record;
pub mod report;
pub mod server;
pub mod session;
pub mod utils;
pub mod vegalite;

pub use aggregate::{filter_by_payload_and_site, outcomes_by_site, ChartData, ChartSpec};
pub use args::Args;
pub use dataset::Dataset;
pub use error::DashError;
pub use record::{LaunchRecord, Outcome, PayloadRange, SiteSelection};
pub use session::{InputEvent, SessionStore};
