//! Navigation 指标收集模块
//!
//! Prometheus recorders for heading, Qibla and prayer updates, plus an
//! in-memory aggregator for the end-of-run summary.

use std::collections::BTreeMap;

use contracts::{AlignmentTier, HeadingReading, NavigationUpdate, PrayerStatus, QiblaFix};
use metrics::{counter, gauge, histogram};
use qibla_navigator::circular_delta;

/// 记录一次 heading 输出
pub fn record_heading_reading(reading: &HeadingReading) {
    counter!("qibla_heading_samples_total").increment(1);

    if let Some(heading) = reading.heading_deg {
        gauge!("qibla_heading_degrees").set(heading);
    }
    if let Some(delta) = reading.delta_deg {
        histogram!("qibla_alignment_delta_degrees").record(delta);
    }
    counter!("qibla_alignment_tier_total", "tier" => reading.tier.as_str()).increment(1);
}

/// 记录被丢弃的畸形磁力计样本
pub fn record_heading_rejected(count: u64) {
    if count > 0 {
        counter!("qibla_heading_samples_rejected_total").increment(count);
    }
}

/// 记录新的 Qibla 方位
pub fn record_qibla_fix(fix: &QiblaFix) {
    gauge!("qibla_bearing_degrees").set(fix.bearing_deg);
    gauge!("qibla_distance_km").set(fix.distance_km);
}

/// 记录位置更新 (accepted = 超过移动阈值)
pub fn record_location_update(accepted: bool) {
    let status = if accepted { "accepted" } else { "filtered" };
    counter!("qibla_location_updates_total", "status" => status).increment(1);
}

/// 记录礼拜状态 (`None` = no data)
pub fn record_prayer_status(status: Option<&PrayerStatus>) {
    match status {
        Some(status) => {
            gauge!("prayer_progress_fraction").set(status.progress_fraction);
            gauge!("prayer_remaining_seconds").set(status.remaining.as_secs_f64());
        }
        None => counter!("prayer_status_no_data_total").increment(1),
    }
}

/// Record whichever metrics apply to one published update
pub fn record_update(update: &NavigationUpdate) {
    match update {
        NavigationUpdate::Prayer { status } => record_prayer_status(status.as_ref()),
        NavigationUpdate::Qibla { fix } => record_qibla_fix(fix),
        NavigationUpdate::Heading { reading } => record_heading_reading(reading),
        NavigationUpdate::QiblaUnavailable { .. } | NavigationUpdate::SensorUnavailable { .. } => {}
    }
}

/// 导航指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct NavigationMetricsAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 各类型帧数
    pub frames_by_kind: BTreeMap<&'static str, u64>,

    /// 各对准等级次数
    pub tier_counts: BTreeMap<&'static str, u64>,

    /// 无数据的礼拜状态次数
    pub prayer_no_data: u64,

    /// 被丢弃的磁力计样本
    pub rejected_samples: u64,

    /// 不可用的传感器
    pub unavailable_sensors: Vec<String>,

    /// 方位与朝向的差值
    pub delta_stats: RunningStats,

    /// 相邻 heading 的角度跳变
    pub jitter_stats: RunningStats,

    /// 最近的 Qibla 方位
    pub last_fix: Option<QiblaFix>,

    last_heading: Option<f64>,
}

impl NavigationMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, update: &NavigationUpdate) {
        self.total_frames += 1;
        *self.frames_by_kind.entry(update.kind()).or_insert(0) += 1;

        match update {
            NavigationUpdate::Prayer { status: None } => self.prayer_no_data += 1,
            NavigationUpdate::Prayer { status: Some(_) } => {}
            NavigationUpdate::Qibla { fix } => self.last_fix = Some(*fix),
            NavigationUpdate::QiblaUnavailable { .. } => {}
            NavigationUpdate::Heading { reading } => self.update_heading(reading),
            NavigationUpdate::SensorUnavailable { sensor } => {
                self.unavailable_sensors.push(sensor.clone())
            }
        }
    }

    fn update_heading(&mut self, reading: &HeadingReading) {
        *self.tier_counts.entry(reading.tier.as_str()).or_insert(0) += 1;

        if let Some(delta) = reading.delta_deg {
            self.delta_stats.push(delta);
        }
        match (self.last_heading, reading.heading_deg) {
            (Some(previous), Some(current)) => {
                self.jitter_stats.push(circular_delta(previous, current))
            }
            // calibration restart clears the heading; start a new run
            (_, None) => self.last_heading = None,
            _ => {}
        }
        if reading.heading_deg.is_some() {
            self.last_heading = reading.heading_deg;
        }
    }

    /// 设置丢弃样本数 (来自 HeadingTracker 计数)
    pub fn set_rejected_samples(&mut self, rejected: u64) {
        self.rejected_samples = rejected;
    }

    pub fn tier_count(&self, tier: AlignmentTier) -> u64 {
        self.tier_counts.get(tier.as_str()).copied().unwrap_or(0)
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let heading_frames = self.frames_by_kind.get("heading").copied().unwrap_or(0);
        let aligned = self.tier_count(AlignmentTier::Perfect);
        MetricsSummary {
            total_frames: self.total_frames,
            heading_frames,
            prayer_no_data: self.prayer_no_data,
            rejected_samples: self.rejected_samples,
            aligned_rate: if heading_frames > 0 {
                aligned as f64 / heading_frames as f64 * 100.0
            } else {
                0.0
            },
            alignment_delta_deg: StatsSummary::from(&self.delta_stats),
            heading_jitter_deg: StatsSummary::from(&self.jitter_stats),
            tier_counts: self.tier_counts.clone(),
            unavailable_sensors: self.unavailable_sensors.clone(),
            last_fix: self.last_fix,
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub heading_frames: u64,
    pub prayer_no_data: u64,
    pub rejected_samples: u64,
    /// Share of heading frames in the Perfect tier (%)
    pub aligned_rate: f64,
    pub alignment_delta_deg: StatsSummary,
    pub heading_jitter_deg: StatsSummary,
    pub tier_counts: BTreeMap<&'static str, u64>,
    pub unavailable_sensors: Vec<String>,
    pub last_fix: Option<QiblaFix>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Navigation Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        if let Some(fix) = &self.last_fix {
            writeln!(f, "Last fix: {fix}")?;
        }
        writeln!(
            f,
            "Heading frames: {} ({:.2}% perfectly aligned)",
            self.heading_frames, self.aligned_rate
        )?;
        writeln!(f, "Rejected samples: {}", self.rejected_samples)?;
        writeln!(f, "Prayer status without data: {}", self.prayer_no_data)?;
        writeln!(f, "Alignment delta (deg): {}", self.alignment_delta_deg)?;
        writeln!(f, "Heading jitter (deg): {}", self.heading_jitter_deg)?;

        if !self.tier_counts.is_empty() {
            writeln!(f, "Tier counts:")?;
            for (tier, count) in &self.tier_counts {
                writeln!(f, "  {}: {}", tier, count)?;
            }
        }
        for sensor in &self.unavailable_sensors {
            writeln!(f, "Sensor unavailable: {sensor}")?;
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.2}, max={:.2}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
