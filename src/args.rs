use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "launchdash",
    about = "Interactive dashboard of launch outcomes by site and payload mass",
    version,
    long_about = None
)]
pub struct Args {
    /// Launch records CSV
    #[arg(short, long, default_value = "spacex_launch_dash.csv")]
    pub data: PathBuf,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port number to bind to
    #[arg(short, long, default_value_t = 8050)]
    pub port: u16,

    /// CORS allowed origins (comma-separated, or * for any)
    #[arg(long, default_value = "*")]
    pub cors_origin: String,

    /// Minutes of inactivity before a dashboard session is dropped
    #[arg(long, default_value_t = 30)]
    pub session_ttl_mins: u64,

    /// Print a per-site summary of the data and exit instead of serving
    #[arg(long)]
    pub summary: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
