use fogsim_core::{EntityReport, SimulationReport};
use std::fmt::Write;

fn secs(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |s| format!("{s:.3}s"))
}

fn line(e: &EntityReport) -> String {
    let m = &e.metrics;
    match e.kind.as_str() {
        "Sensor" => format!(
            "{} - Data Generated: {} MB, Energy Used: {:.4} J, Latency: {}",
            e.name,
            m.data_generated,
            m.energy_consumed,
            secs(m.last_latency)
        ),
        "FogNode" => format!(
            "{} Energy Used: {:.4} J, Tasks: {}",
            e.name,
            m.energy_consumed,
            m.current_load.unwrap_or(0)
        ),
        "Dispatcher" => format!(
            "{} Energy Used: {:.4} J, Forwarded: {}, Mean latency: {}, p99: {}",
            e.name,
            m.energy_consumed,
            m.tasks_handled,
            secs(m.mean_latency),
            secs(m.p99_latency)
        ),
        "CloudStorage" => format!("{} Storage Used: {} MB", e.name, m.storage_used),
        _ => format!("{} ({})", e.name, e.kind),
    }
}

/// Plain-text rendering, grouped cloud -> fog -> dispatcher -> edge.
pub fn text_report(title: &str, report: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{title}: completed at t={}s after {} events",
        report.end_time, report.events_processed
    );
    for kind in ["CloudStorage", "FogNode", "Dispatcher", "Sensor"] {
        for e in report.of_kind(kind) {
            let _ = writeln!(out, "  {}", line(e));
        }
    }
    let _ = writeln!(out, "  Total energy: {:.4} J", report.total_energy());
    out
}
