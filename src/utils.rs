use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::session::MAX_SESSION_TTL_MINS;

pub fn setup_logging(verbose: bool) {
    let default_filter = if verbose {
        "launchdash=info,tower_http=info"
    } else {
        "launchdash=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_timer(timer))
        .init();
}

pub fn format_number(num: u32) -> String {
    num.to_string()
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if args.port == 0 {
        anyhow::bail!("--port must be greater than 0");
    }

    if args.session_ttl_mins == 0 {
        anyhow::bail!("--session-ttl-mins must be greater than 0");
    }

    if args.session_ttl_mins > MAX_SESSION_TTL_MINS {
        anyhow::bail!(
            "--session-ttl-mins must be at most {} (one year)",
            MAX_SESSION_TTL_MINS
        );
    }

    if args.host.trim().is_empty() {
        anyhow::bail!("--host must not be empty");
    }

    Ok(())
}
