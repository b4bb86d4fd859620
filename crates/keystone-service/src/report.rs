//! Failure reporting with per-kind throttling.
//!
//! The throttle decides how often a failure kind reaches the external
//! monitoring sink. It never affects the response sent to the client.
//! Forwarding is fire-and-forget: reports go through a bounded channel to a
//! background task that owns the sink.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::Failure;

/// Broadcast failures allowed through per minute.
pub const BROADCAST_REPORTS_PER_MINUTE: u32 = 300;

/// One in this many monitoring failures is reported.
pub const MONITORING_SAMPLE_ODDS: u32 = 1000;

/// Length of a `PerMinute` counting window.
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// How often a failure kind may be forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// At most this many reports per minute.
    PerMinute(u32),
    /// Report with probability `winners / outcomes`.
    Lottery { winners: u32, outcomes: u32 },
    /// Never report.
    Suppress,
}

/// Classifies a failure for external reporting.
pub fn throttle(failure: &Failure) -> ThrottleDecision {
    match failure {
        Failure::Broadcast(_) => ThrottleDecision::PerMinute(BROADCAST_REPORTS_PER_MINUTE),
        Failure::Monitoring(_) => ThrottleDecision::Lottery {
            winners: 1,
            outcomes: MONITORING_SAMPLE_ODDS,
        },
        _ => ThrottleDecision::Suppress,
    }
}

/// A failure forwarded to the monitoring sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub kind: &'static str,
    pub message: String,
    pub path: Option<String>,
}

/// Destination for forwarded failures.
pub trait ReportSink: Send + Sync + 'static {
    fn report(&self, report: FailureReport);
}

/// Writes reports as structured `tracing` events on `keystone::report`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, report: FailureReport) {
        tracing::error!(
            target: "keystone::report",
            kind = report.kind,
            path = report.path.as_deref().unwrap_or("-"),
            message = %report.message,
            "failure reported",
        );
    }
}

/// Draws a number in `0..outcomes`.
type Draw = Box<dyn FnMut(u32) -> u32 + Send>;

/// Applies [`throttle`] decisions and forwards admitted failures to a sink.
#[derive(Clone)]
pub struct Reporter {
    inner: Arc<ReporterInner>,
}

struct ReporterInner {
    window: Duration,
    counters: DashMap<&'static str, (u32, Instant)>,
    draw: Mutex<Draw>,
    tx: mpsc::Sender<FailureReport>,
}

impl Reporter {
    /// Starts the background forwarding task. Must be called inside a tokio runtime.
    pub fn spawn(sink: impl ReportSink, capacity: usize) -> Self {
        Self::spawn_with_draw(sink, capacity, |outcomes| {
            rand::rng().random_range(0..outcomes.max(1))
        })
    }

    /// Like [`Reporter::spawn`] with a custom lottery draw.
    pub fn spawn_with_draw(
        sink: impl ReportSink,
        capacity: usize,
        draw: impl FnMut(u32) -> u32 + Send + 'static,
    ) -> Self {
        Self::start(sink, capacity, RATE_WINDOW, draw)
    }

    fn start(
        sink: impl ReportSink,
        capacity: usize,
        window: Duration,
        draw: impl FnMut(u32) -> u32 + Send + 'static,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<FailureReport>(capacity.max(1));
        tokio::spawn(async move {
            while let Some(report) = rx.recv().await {
                sink.report(report);
            }
        });

        Self {
            inner: Arc::new(ReporterInner {
                window,
                counters: DashMap::new(),
                draw: Mutex::new(Box::new(draw)),
                tx,
            }),
        }
    }

    /// Forwards `failure` if its throttle admits it. Returns `true` when the
    /// report was queued. Never blocks.
    pub fn report(&self, failure: &Failure, path: Option<&str>) -> bool {
        let kind = failure.kind_name();
        let admitted = match throttle(failure) {
            ThrottleDecision::Suppress => false,
            ThrottleDecision::PerMinute(limit) => self.admit(kind, limit),
            ThrottleDecision::Lottery { winners, outcomes } => {
                let mut draw = self.inner.draw.lock();
                draw(outcomes) < winners
            }
        };
        if !admitted {
            tracing::trace!(kind, "failure report throttled");
            return false;
        }

        let report = FailureReport {
            kind,
            message: failure.to_string(),
            path: path.map(String::from),
        };
        match self.inner.tx.try_send(report) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(kind, "report queue full, dropping failure report");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Fixed-window counter per failure kind.
    fn admit(&self, kind: &'static str, limit: u32) -> bool {
        let mut entry = self
            .inner
            .counters
            .entry(kind)
            .or_insert((0, Instant::now()));
        let (count, window_start) = entry.value_mut();

        if window_start.elapsed() > self.inner.window {
            *count = 1;
            *window_start = Instant::now();
            true
        } else if *count < limit {
            *count += 1;
            true
        } else {
            false
        }
    }

    /// Removes counters whose window has expired (background cleanup).
    pub fn cleanup(&self) {
        let window = self.inner.window;
        self.inner
            .counters
            .retain(|_, (_, start)| start.elapsed() <= window);
    }
}
