//! Human-readable event log lines derived from each cycle.

use chrono::{DateTime, Utc};
use shdwnet_types::{CycleSnapshot, LogEvent, RawMetrics, Severity, SourceId};

/// Solar signal at or above which a flare alert is raised.
pub const FLARE_ALERT_SIGNAL: f64 = 0.8;
/// K-index at or above which a storm alert is raised.
pub const STORM_ALERT_K: f64 = 5.0;
/// Magnitude at or above which a quake is reported.
pub const QUAKE_REPORT_MAGNITUDE: f64 = 5.0;
/// Crisis hits at or above which an alert is raised.
pub const CRISIS_ALERT_HITS: u32 = 3;

/// The event that opens every cycle.
pub fn cycle_start(at: DateTime<Utc>) -> LogEvent {
    LogEvent::new("Polling all data sources...", Severity::Info, at)
}

/// Events describing a finished cycle, in reading order, closed by the
/// master signal summary.
pub fn cycle_events(snapshot: &CycleSnapshot) -> Vec<LogEvent> {
    let at = snapshot.cycle_time;
    let mut events = Vec::new();

    for reading in &snapshot.readings {
        if !reading.is_available() {
            events.push(LogEvent::new(
                format!("{} feed error", reading.source.label()),
                Severity::Warn,
                at,
            ));
            continue;
        }
        events.extend(threshold_event(
            reading.source,
            reading.normalized_signal,
            reading.raw_metrics.as_ref(),
            at,
        ));
    }

    events.push(LogEvent::new(
        format!(
            "Master Signal: {:.0}% | Sigil: {}",
            snapshot.master_signal.percent(),
            snapshot.sigil
        ),
        Severity::Info,
        at,
    ));
    events
}

fn threshold_event(
    source: SourceId,
    signal: f64,
    metrics: Option<&RawMetrics>,
    at: DateTime<Utc>,
) -> Option<LogEvent> {
    match metrics? {
        RawMetrics::SolarXray { flare_class, .. }
            if source == SourceId::SolarXray && signal >= FLARE_ALERT_SIGNAL =>
        {
            Some(LogEvent::new(
                format!("SOLAR FLARE: {}", flare_class.label()),
                Severity::Alert,
                at,
            ))
        }
        RawMetrics::KIndex { k, .. } if *k >= STORM_ALERT_K => Some(LogEvent::new(
            format!("GEOMAGNETIC STORM: K={k}"),
            Severity::Alert,
            at,
        )),
        RawMetrics::Seismic { max_magnitude, .. } if *max_magnitude >= QUAKE_REPORT_MAGNITUDE => {
            Some(LogEvent::new(
                format!("Significant quake: M{max_magnitude:.1}"),
                Severity::Warn,
                at,
            ))
        }
        RawMetrics::Social { crisis_hits, .. } if *crisis_hits >= CRISIS_ALERT_HITS => {
            Some(LogEvent::new(
                format!("High crisis activity: {crisis_hits} flags"),
                Severity::Alert,
                at,
            ))
        }
        _ => None,
    }
}
