use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for drive-loop events.
///
/// Keeps the loop free of output concerns so a CLI, a test or an embedding
/// application can each observe a session its own way.
pub trait PipelineLogger: Send {
    /// A render tick finished for the frame at `frame_index`.
    fn tick(&mut self, frame_index: usize);

    /// Record how long a named stage took for one tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. live tracks, replies per second).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn tick(&mut self, _frame_index: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running statistics for one stage or metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate {
    pub sum: f64,
    pub count: usize,
    pub peak: f64,
    pub last: f64,
}

impl Aggregate {
    fn new(value: f64) -> Self {
        Self {
            sum: value,
            count: 1,
            peak: value,
            last: value,
        }
    }

    fn record(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.peak = self.peak.max(value);
        self.last = value;
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.count.max(1) as f64
    }
}

fn record(map: &mut HashMap<String, Aggregate>, key: &str, value: f64) {
    match map.get_mut(key) {
        Some(aggregate) => aggregate.record(value),
        None => {
            map.insert(key.to_string(), Aggregate::new(value));
        }
    }
}

/// CLI-oriented logger that aggregates stage timings and metrics and
/// reports a summary when the session ends.
///
/// Only running totals are kept per key, so memory stays flat however long
/// the session runs. A status line with the latest metrics is logged every
/// `report_every` ticks.
pub struct StdoutPipelineLogger {
    report_every: usize,
    timings: HashMap<String, Aggregate>,
    metrics: HashMap<String, Aggregate>,
    start_time: Instant,
    ticks: usize,
    last_message: Option<String>,
}

impl StdoutPipelineLogger {
    pub fn new(report_every: usize) -> Self {
        Self {
            report_every: report_every.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            ticks: 0,
            last_message: None,
        }
    }

    fn latest(&self, name: &str) -> f64 {
        self.metrics.get(name).map(|a| a.last).unwrap_or(0.0)
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let ticks = self.ticks;
        let mut lines = vec![format!(
            "Session summary ({ticks} ticks, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        for (stage, t) in stages {
            lines.push(format!(
                "  {stage:12}: avg {:6.1}ms  total {:7.0}ms  ({} samples)",
                t.mean(),
                t.sum,
                t.count
            ));
        }

        let mut metrics: Vec<_> = self.metrics.iter().collect();
        metrics.sort_by(|a, b| a.0.cmp(b.0));
        for (name, m) in metrics {
            lines.push(format!("  {name}: avg {:.1}  peak {:.1}", m.mean(), m.peak));
        }

        if ticks > 0 && elapsed_ms > 0.0 {
            let rate = ticks as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Render rate: {rate:.1} ticks/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_stats(&self, stage: &str) -> Option<&Aggregate> {
        self.timings.get(stage)
    }

    pub fn metric_stats(&self, name: &str) -> Option<&Aggregate> {
        self.metrics.get(name)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(60)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn tick(&mut self, frame_index: usize) {
        self.ticks += 1;
        if self.ticks % self.report_every == 0 {
            log::info!(
                "Frame {frame_index}: {} tracks, {} replies/s",
                self.latest("tracks"),
                self.latest("replies_per_sec")
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        record(&mut self.timings, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        record(&mut self.metrics, name, value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
        self.last_message = Some(message.to_string());
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
