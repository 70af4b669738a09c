//! Run statistics and end-of-run summary.

use std::time::Duration;

use dispatcher::MetricsSnapshot as SinkSnapshot;
use observability::NavigationMetricsAggregator;

use super::OrchestratorReport;

/// Statistics from a `run`
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Frames received from the orchestrator
    pub frames_received: u64,

    /// Frames handed to the dispatcher
    pub frames_forwarded: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// In-memory navigation summary
    pub navigation: NavigationMetricsAggregator,

    /// Orchestrator task counters
    pub report: OrchestratorReport,

    /// Final per-sink counters
    pub sinks: Vec<(String, SinkSnapshot)>,
}

impl RunStats {
    /// Frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames received: {}", self.frames_received);
        println!("   ├─ Frames forwarded: {}", self.frames_forwarded);
        println!("   └─ FPS: {:.2}", self.fps());

        let report = &self.report;
        println!("\n🧭 Tasks");
        println!(
            "   ├─ Location: {} accepted, {} filtered, {} invalid",
            report.location.accepted, report.location.filtered, report.location.invalid
        );
        if report.heading.sensor_available {
            println!(
                "   ├─ Heading: {} samples, {} rejected, {} calibrations",
                report.heading.accepted, report.heading.rejected, report.heading.calibrations
            );
        } else {
            println!("   ├─ Heading: magnetometer unavailable");
        }
        println!(
            "   └─ Schedule: {} ticks, {} fetches ({} failed), {} without data",
            report.schedule.ticks,
            report.schedule.fetches,
            report.schedule.fetch_failures,
            report.schedule.no_data_ticks
        );

        let mut navigation = self.navigation.clone();
        navigation.set_rejected_samples(report.heading.rejected);
        println!("\n{}", navigation.summary());

        if !self.sinks.is_empty() {
            println!("📤 Sinks");
            for (i, (name, snapshot)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} written, {} failed, {} dropped",
                    prefix, name, snapshot.write_count, snapshot.failure_count, snapshot.dropped_count
                );
            }
        }

        println!();
    }
}
