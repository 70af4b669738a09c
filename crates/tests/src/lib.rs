//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 跨 crate 场景 (prayer status, qibla)
//! - Orchestrator -> Dispatcher 端到端

#[cfg(test)]
mod contract_tests {
    use contracts::{NavigationUpdate, QiblaFix, KAABA};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_frame_wire_format() {
        let update = NavigationUpdate::Qibla {
            fix: QiblaFix {
                observer: KAABA,
                bearing_deg: 0.0,
                distance_km: 0.0,
            },
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["kind"], "qibla");
        assert_eq!(json["fix"]["observer"]["latitude"], KAABA.latitude);
    }
}

#[cfg(test)]
mod scenario_tests {
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use contracts::{GeoPoint, RawPrayerEntry, KAABA};
    use prayer_schedule::{compute_status, normalize_timetable, Timetable};
    use qibla_navigator::{compute_distance_km, compute_qibla_bearing, qibla_fix};

    fn timetable() -> Timetable {
        normalize_timetable(&[
            RawPrayerEntry::new("Fajr", "05:00"),
            RawPrayerEntry::new("Dhuhr", "12:15"),
            RawPrayerEntry::new("Asr", "15:45"),
            RawPrayerEntry::new("Maghrib", "18:30"),
            RawPrayerEntry::new("Isha", "20:00"),
        ])
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    /// Afternoon: next is Asr, progress through the Dhuhr -> Asr window
    #[test]
    fn test_scenario_a_afternoon() {
        let status = compute_status(&timetable(), at(14, 0)).unwrap();

        assert_eq!(status.next_name, "Asr");
        assert_eq!(status.current_or_next_name, "Dhuhr");
        assert_eq!(status.next_instant, at(15, 45));
        assert_eq!(status.previous_instant, Some(at(12, 15)));
        assert_eq!(status.remaining, Duration::from_secs(105 * 60));

        // 105 of 210 minutes elapsed
        assert!((status.progress_fraction - 0.5).abs() < 1e-9);
        assert_eq!(status.to_string(), "Next: Asr, in 1h 45m");
    }

    /// After Isha: next is tomorrow's Fajr, exactly one day later
    #[test]
    fn test_scenario_b_after_isha() {
        let status = compute_status(&timetable(), at(23, 0)).unwrap();

        assert_eq!(status.next_name, "Fajr");
        assert_eq!(status.current_or_next_name, "Isha");
        assert_eq!(status.next_instant, at(5, 0) + TimeDelta::days(1));
        assert_eq!(status.previous_instant, Some(at(20, 0)));
        assert_eq!(status.remaining, Duration::from_secs(6 * 3600));
        assert!((status.progress_fraction - 3.0 / 9.0).abs() < 1e-9);
    }

    /// Observer at the Kaaba: zero distance and zero bearing, not an error
    #[test]
    fn test_scenario_c_at_kaaba() {
        let observer = GeoPoint::new(21.4225, 39.8262);
        assert_eq!(observer, KAABA);
        assert_eq!(compute_distance_km(observer).unwrap(), 0.0);
        assert_eq!(compute_qibla_bearing(observer).unwrap(), 0.0);
        assert!(qibla_fix(observer).unwrap().is_at_kaaba());
    }

    #[test]
    fn test_before_fajr_wraps_to_yesterday_isha() {
        let status = compute_status(&timetable(), at(3, 0)).unwrap();
        assert_eq!(status.next_name, "Fajr");
        assert_eq!(status.next_instant, at(5, 0));
        assert_eq!(status.previous_instant, Some(at(20, 0) - TimeDelta::days(1)));
        assert!((status.progress_fraction - 7.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_timetable_is_no_data() {
        assert_eq!(compute_status(&normalize_timetable(&[]), at(12, 0)), None);
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use chrono::NaiveDate;
    use config_loader::ConfigLoader;
    use contracts::TimetableProvider;
    use prayer_schedule::compute_status;
    use qibla_compass::ConfiguredTimetable;

    /// TOML config -> relative timetable_file -> provider response -> status
    #[tokio::test]
    async fn test_config_to_prayer_status() {
        let dir = tempfile::tempdir().unwrap();

        let response = serde_json::json!({
            "code": 200,
            "data": {
                "timings": {
                    "Fajr": "05:12 (EET)",
                    "Sunrise": "06:40 (EET)",
                    "Dhuhr": "12:01 (EET)",
                    "Asr": "15:25 (EET)",
                    "Maghrib": "17:52 (EET)",
                    "Isha": "19:10 (EET)"
                }
            }
        });
        std::fs::write(dir.path().join("cairo.json"), response.to_string()).unwrap();

        let config_path = dir.path().join("navigator.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            "timetable_file = \"cairo.json\"\n\n[observer]\nlatitude = 30.0444\nlongitude = 31.2357"
        )
        .unwrap();

        let blueprint = ConfigLoader::load_from_path(&config_path).unwrap();
        let provider = ConfiguredTimetable::from_blueprint(&blueprint);
        assert!(matches!(provider, ConfiguredTimetable::File(_)));

        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let timetable = provider
            .fetch(date, blueprint.observer.point())
            .await
            .unwrap();
        // Sunrise is not a prayer
        assert_eq!(timetable.len(), 5);

        let status = compute_status(&timetable, date.and_hms_opt(18, 0, 0).unwrap()).unwrap();
        assert_eq!(status.next_name, "Isha");
        assert_eq!(status.current_or_next_name, "Maghrib");
    }

    #[tokio::test]
    async fn test_missing_timetable_file_is_provider_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("navigator.json");
        std::fs::write(&config_path, r#"{"timetable_file": "missing.json"}"#).unwrap();

        let blueprint = ConfigLoader::load_from_path(&config_path).unwrap();
        let provider = ConfiguredTimetable::from_blueprint(&blueprint);
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(provider.fetch(date, blueprint.observer.point()).await.is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use contracts::{
        AlignmentTier, FixedClock, GeoPoint, NavigationFrame, NavigationUpdate,
        RawMagnetometerSample, RawPrayerEntry, SinkConfig, SinkType,
    };
    use dispatcher::create_dispatcher;
    use ingestion::{
        HeadingPattern, MockMagnetometer, MockMagnetometerConfig, StaticLocationSource,
        StaticTimetableProvider,
    };
    use observability::NavigationMetricsAggregator;
    use qibla_compass::{Collaborators, Orchestrator, OrchestratorConfig};
    use tokio::sync::mpsc;

    /// End-to-end test: Orchestrator -> Dispatcher -> file sink
    ///
    /// 验证完整的数据流：
    /// 1. StaticLocationSource 提供 observer，生成 Qibla fix
    /// 2. MockMagnetometer 产生 heading 帧
    /// 3. schedule tick 产生 prayer 帧
    /// 4. Dispatcher 将帧写入 JSON-lines 文件
    #[tokio::test(start_paused = true)]
    async fn test_e2e_orchestrator_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let observer = GeoPoint::new(51.5074, -0.1278);

        let (frame_tx, frame_rx) = mpsc::channel::<NavigationFrame>(256);
        let sink_configs = vec![SinkConfig {
            name: "frames".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 256,
            params: HashMap::from([(
                "base_path".to_string(),
                dir.path().display().to_string(),
            )]),
        }];
        let dispatcher = create_dispatcher(sink_configs, frame_rx).unwrap();
        assert_eq!(dispatcher.sink_count(), 1);
        let dispatcher_handle = dispatcher.spawn();

        let timetable = Arc::new(StaticTimetableProvider::from_raw(&vec![
            RawPrayerEntry::new("Fajr", "05:00"),
            RawPrayerEntry::new("Dhuhr", "12:15"),
            RawPrayerEntry::new("Asr", "15:45"),
        ]));
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2026, 3, 1)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
        ));

        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                fallback_observer: observer,
                tick_interval: Duration::from_millis(500),
                ..Default::default()
            },
            Collaborators {
                location: Arc::new(StaticLocationSource::new(observer)),
                magnetometer: Arc::new(MockMagnetometer::fixed(110.0)),
                timetable,
                clock,
            },
        );

        let handle = orchestrator.start(frame_tx).await;
        tokio::time::sleep(Duration::from_millis(1200)).await;
        let report = handle.shutdown().await;

        // all senders gone -> dispatcher drains and stops
        let sink_metrics = dispatcher_handle.await.unwrap();
        let (name, snapshot) = &sink_metrics[0];
        assert_eq!(name, "frames");
        assert_eq!(snapshot.write_count, report.frames_emitted);
        assert_eq!(snapshot.failure_count, 0);

        let content = std::fs::read_to_string(dir.path().join("frames.jsonl")).unwrap();
        let frames: Vec<NavigationFrame> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(frames.len() as u64, report.frames_emitted);

        let mut aggregator = NavigationMetricsAggregator::new();
        for frame in &frames {
            aggregator.update(&frame.update);
        }
        let summary = aggregator.summary();
        assert_eq!(summary.total_frames, frames.len() as u64);

        let fix = frames
            .iter()
            .find_map(|f| match f.update {
                NavigationUpdate::Qibla { fix } => Some(fix),
                _ => None,
            })
            .unwrap();
        assert!((fix.bearing_deg - 118.99).abs() < 0.05);

        // 110 vs 118.99 -> Good
        let last_heading = frames
            .iter()
            .rev()
            .find_map(|f| match f.update {
                NavigationUpdate::Heading { reading } => Some(reading),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_heading.tier, AlignmentTier::Good);
        assert!(aggregator.tier_count(AlignmentTier::Good) > 0);

        let prayer_frames = frames
            .iter()
            .filter(|f| matches!(f.update, NavigationUpdate::Prayer { status: Some(_) }))
            .count();
        assert!(prayer_frames >= 2);
    }

    /// Malformed magnetometer samples are dropped without a frame
    #[tokio::test(start_paused = true)]
    async fn test_e2e_malformed_samples_counted() {
        let observer = GeoPoint::new(-6.2088, 106.8456);
        let good = MockMagnetometer::sample_for_heading(295.0, 40.0);
        let bad = RawMagnetometerSample::new(f64::NAN, 1.0, 0.0);
        let magnetometer = MockMagnetometer::new(MockMagnetometerConfig {
            pattern: HeadingPattern::Sequence(vec![good, bad]),
            ..Default::default()
        });

        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                fallback_observer: observer,
                ..Default::default()
            },
            Collaborators {
                location: Arc::new(StaticLocationSource::new(observer)),
                magnetometer: Arc::new(magnetometer),
                timetable: Arc::new(StaticTimetableProvider::from_raw(&Vec::new())),
                clock: Arc::new(FixedClock::new(
                    NaiveDate::from_ymd_opt(2026, 3, 1)
                        .unwrap()
                        .and_hms_opt(9, 0, 0)
                        .unwrap(),
                )),
            },
        );

        let (tx, mut rx) = mpsc::channel(256);
        let handle = orchestrator.start(tx).await;
        tokio::time::sleep(Duration::from_millis(1050)).await;
        let report = handle.shutdown().await;

        let mut headings = 0u64;
        let mut no_data = 0u64;
        while let Ok(frame) = rx.try_recv() {
            match frame.update {
                NavigationUpdate::Heading { reading } => {
                    headings += 1;
                    assert_eq!(reading.tier, AlignmentTier::Perfect);
                }
                NavigationUpdate::Prayer { status: None } => no_data += 1,
                _ => {}
            }
        }

        assert!(report.heading.rejected > 0);
        assert_eq!(headings, report.heading.accepted);
        assert!(no_data >= 1);
        assert_eq!(report.schedule.no_data_ticks, no_data);
    }
}
