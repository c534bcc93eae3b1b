use crate::time::TimeProvider;
use serde::Serializer;
use std::sync::Arc;
use tracing_subscriber::{
    fmt::{format::Writer, time::FormatTime},
    EnvFilter,
};

/// Log timestamps taken from a `TimeProvider`, printed as uptime seconds.
pub struct UptimeFormatter {
    pub time_provider: Arc<dyn TimeProvider>,
}

impl FormatTime for UptimeFormatter {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "+{}", display_secs(self.time_provider.now()))
    }
}

/// Installs the global subscriber. Later calls are ignored so tests can call it freely.
pub fn start_log(time_provider: Option<Arc<dyn TimeProvider>>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = match time_provider {
        Some(time_provider) => builder.with_timer(UptimeFormatter { time_provider }).try_init(),
        None => builder.try_init(),
    };
}

/// `3725` -> `1h02m05s`
pub fn display_secs(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{sign}{h}h{m:02}m{s:02}s")
    } else if m > 0 {
        format!("{sign}{m}m{s:02}s")
    } else {
        format!("{sign}{s}s")
    }
}

pub fn serialize_ts_or_never<S: Serializer>(ts: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_i64(*ts),
        None => serializer.serialize_str("never"),
    }
}

#[cfg(test)]
mod test {
    use super::display_secs;

    #[test]
    fn display_secs_units() {
        assert_eq!(display_secs(0), "0s");
        assert_eq!(display_secs(59), "59s");
        assert_eq!(display_secs(61), "1m01s");
        assert_eq!(display_secs(3725), "1h02m05s");
        assert_eq!(display_secs(90_000), "25h00m00s");
        assert_eq!(display_secs(-5), "-5s");
    }
}
