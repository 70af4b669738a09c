//! `run` command implementation.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::future::pending;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::{
    MagnetometerSource, NavigationFrame, NavigatorBlueprint, SinkConfig, SinkType, SystemClock,
};
use ingestion::{MockMagnetometer, ReplayConfig, ReplayMagnetometer, StaticLocationSource};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::error::CliError;
use qibla_compass::{
    Collaborators, ConfiguredTimetable, Orchestrator, OrchestratorConfig, RunStats,
};

/// Execute the `run` command
pub async fn run_navigator(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(lat) = args.lat {
        info!(latitude = lat, "Overriding observer latitude from CLI");
        blueprint.observer.latitude = lat;
    }
    if let Some(lon) = args.lon {
        info!(longitude = lon, "Overriding observer longitude from CLI");
        blueprint.observer.longitude = lon;
    }
    ConfigLoader::validate(&blueprint).map_err(CliError::ConfigValidation)?;

    let timetable = ConfiguredTimetable::from_blueprint(&blueprint);
    info!(
        observer = %blueprint.observer.point(),
        timetable = %timetable.describe(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint, &timetable);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    // Sinks
    let sink_configs = if blueprint.sinks.is_empty() {
        info!("No sinks configured, logging frames");
        vec![default_log_sink()]
    } else {
        blueprint.sinks.clone()
    };
    let (dispatch_tx, dispatch_rx) = mpsc::channel::<NavigationFrame>(args.buffer_size);
    let dispatcher =
        dispatcher::create_dispatcher(sink_configs, dispatch_rx).map_err(CliError::from)?;
    let dispatcher_task = dispatcher.spawn();

    // Engines
    let magnetometer = build_magnetometer(args, &blueprint)?;
    let mut config = OrchestratorConfig::from_blueprint(&blueprint);
    config.event_capacity = args.buffer_size;
    let orchestrator = Orchestrator::new(
        config,
        Collaborators {
            location: Arc::new(StaticLocationSource::new(blueprint.observer.point())),
            magnetometer,
            timetable: Arc::new(timetable),
            clock: Arc::new(SystemClock),
        },
    );

    let (frame_tx, mut frame_rx) = mpsc::channel::<NavigationFrame>(args.buffer_size);
    let handle = orchestrator.start(frame_tx).await;
    let started = Instant::now();
    let mut stats = RunStats::default();

    let max_frames = (args.max_frames != 0).then_some(args.max_frames);
    let deadline = async {
        match args.timeout {
            0 => pending::<()>().await,
            secs => tokio::time::sleep(Duration::from_secs(secs)).await,
        }
    };
    tokio::pin!(deadline);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut recalibrate = RecalibrateSignal::install();

    info!("Navigator running");

    loop {
        tokio::select! {
            frame = frame_rx.recv() => {
                let Some(frame) = frame else {
                    info!("Frame stream closed");
                    break;
                };
                stats.frames_received += 1;
                observability::record_update(&frame.update);
                stats.navigation.update(&frame.update);

                if dispatch_tx.send(frame).await.is_err() {
                    warn!("Dispatcher closed, stopping");
                    break;
                }
                stats.frames_forwarded += 1;

                if max_frames.is_some_and(|max| stats.frames_received >= max) {
                    info!(frames = stats.frames_received, "Reached max frames");
                    break;
                }
            }
            _ = recalibrate.recv() => {
                info!("Recalibration requested");
                handle.recalibrate();
            }
            _ = &mut deadline => {
                info!(timeout_secs = args.timeout, "Timeout reached");
                break;
            }
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping navigator...");
                break;
            }
        }
    }

    stats.report = handle.shutdown().await;
    drop(frame_rx);
    drop(dispatch_tx);
    stats.sinks = dispatcher_task
        .await
        .context("Dispatcher task failed")?;
    stats.duration = started.elapsed();

    info!(
        frames_received = stats.frames_received,
        frames_forwarded = stats.frames_forwarded,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Navigator finished"
    );
    stats.print_summary();

    Ok(())
}

fn default_log_sink() -> SinkConfig {
    SinkConfig {
        name: "log".to_string(),
        sink_type: SinkType::Log,
        queue_capacity: 100,
        params: HashMap::new(),
    }
}

fn build_magnetometer(
    args: &RunArgs,
    blueprint: &NavigatorBlueprint,
) -> Result<Arc<dyn MagnetometerSource>, CliError> {
    if args.no_magnetometer {
        return Ok(Arc::new(MockMagnetometer::unavailable()));
    }

    if let Some(ref path) = args.replay {
        let config = ReplayConfig {
            interval: blueprint.magnetometer.update_interval(),
            loop_playback: args.replay_loop,
        };
        let replay = ReplayMagnetometer::load(path, config)?;
        return Ok(Arc::new(replay));
    }

    Ok(match args.rotate {
        Some(step) => Arc::new(MockMagnetometer::rotating(args.heading, step)),
        None => Arc::new(MockMagnetometer::fixed(args.heading)),
    })
}

/// Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// SIGHUP restarts magnetometer calibration
struct RecalibrateSignal {
    #[cfg(unix)]
    inner: Option<tokio::signal::unix::Signal>,
}

#[cfg(unix)]
impl RecalibrateSignal {
    fn install() -> Self {
        let inner = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
            .map_err(|e| warn!(error = %e, "Failed to install SIGHUP handler"))
            .ok();
        Self { inner }
    }

    async fn recv(&mut self) {
        if let Some(signal) = self.inner.as_mut() {
            if signal.recv().await.is_some() {
                return;
            }
            self.inner = None;
        }
        pending::<()>().await
    }
}

#[cfg(not(unix))]
impl RecalibrateSignal {
    fn install() -> Self {
        Self {}
    }

    async fn recv(&mut self) {
        pending::<()>().await
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &NavigatorBlueprint, timetable: &ConfiguredTimetable) {
    println!("\n=== Configuration Summary ===\n");
    println!("Observer: {}", blueprint.observer.point());
    println!(
        "Location: every {} ms, min distance {} m",
        blueprint.location.poll_interval_ms, blueprint.location.min_distance_m
    );
    println!(
        "Magnetometer: every {} ms, thresholds {}/{}, calibration {} s{}",
        blueprint.magnetometer.update_interval_ms,
        blueprint.magnetometer.fine_threshold,
        blueprint.magnetometer.coarse_threshold,
        blueprint.magnetometer.calibration_window_s,
        if blueprint.magnetometer.calibrate_on_start {
            " (on start)"
        } else {
            ""
        }
    );
    println!(
        "Schedule: tick every {} ms",
        blueprint.schedule.tick_interval_ms
    );
    println!("Timetable: {}", timetable.describe());

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
