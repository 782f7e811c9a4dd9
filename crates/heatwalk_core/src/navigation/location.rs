//! Position producers.
//!
//! The engine only sees a stream of [`PositionSample`]s, so a device feed,
//! a recorded trace or a simulated walk are interchangeable.

use chrono::{DateTime, TimeDelta, Utc};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::time::Duration;

use crate::geo::{PlanarFrame, Xy, haversine_m};
use crate::model::{Position, PositionSample};

/// Reported accuracy of simulated fixes, in meters.
pub const HIGH_ACCURACY_M: f64 = 5.0;
pub const COARSE_ACCURACY_M: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// A fix younger than this is reused, so no new sample is emitted.
    pub maximum_age: Duration,
    /// Longest wait for the next fix before the source gives up.
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(15),
        }
    }
}

pub trait LocationSource {
    fn watch(&self, opts: WatchOptions) -> BoxStream<'static, PositionSample>;
}

/// Plays back a fixed list of samples.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    samples: Vec<PositionSample>,
}

impl ReplaySource {
    pub fn new(samples: Vec<PositionSample>) -> Self {
        Self { samples }
    }
}

impl LocationSource for ReplaySource {
    /// Recorded fixes are already available, so only `maximum_age` applies.
    fn watch(&self, opts: WatchOptions) -> BoxStream<'static, PositionSample> {
        stream::iter(skip_cached(self.samples.clone(), opts.maximum_age)).boxed()
    }
}

/// Drop fixes taken within `maximum_age` of the last one emitted. The final
/// fix always goes through.
fn skip_cached(samples: Vec<PositionSample>, maximum_age: Duration) -> Vec<PositionSample> {
    let max_age = TimeDelta::from_std(maximum_age).unwrap_or(TimeDelta::MAX);
    if max_age.is_zero() {
        return samples;
    }

    let last = samples.len().saturating_sub(1);
    let mut emitted_at: Option<DateTime<Utc>> = None;
    samples
        .into_iter()
        .enumerate()
        .filter_map(|(i, s)| {
            let fresh = emitted_at.is_none_or(|at| s.at - at > max_age);
            if fresh || i == last {
                emitted_at = Some(s.at);
                Some(s)
            } else {
                None
            }
        })
        .collect()
}

/// Walks a polyline at a constant pace, one fix per interval.
#[derive(Debug, Clone)]
pub struct SimulatedWalk {
    path: Vec<Position>,
    pub pace_mps: f64,
    pub interval: Duration,
    pub start: DateTime<Utc>,
    /// Shift every fix sideways by this many meters (positive = left).
    pub lateral_offset_m: f64,
    /// Sleep `interval` between fixes instead of emitting them at once.
    pub real_time: bool,
}

impl SimulatedWalk {
    pub fn new(path: Vec<Position>, start: DateTime<Utc>) -> Self {
        Self {
            path,
            pace_mps: 1.4,
            interval: Duration::from_secs(1),
            start,
            lateral_offset_m: 0.0,
            real_time: false,
        }
    }

    pub fn with_pace(mut self, pace_mps: f64) -> Self {
        self.pace_mps = pace_mps;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_lateral_offset(mut self, meters: f64) -> Self {
        self.lateral_offset_m = meters;
        self
    }

    pub fn real_time(mut self, on: bool) -> Self {
        self.real_time = on;
        self
    }

    /// All fixes of the walk, ending exactly at the last vertex.
    pub fn samples(&self) -> Vec<PositionSample> {
        let total: f64 = self.path.windows(2).map(|w| haversine_m(w[0], w[1])).sum();
        let step_m = (self.pace_mps * self.interval.as_secs_f64()).max(0.1);
        let step_dt = TimeDelta::from_std(self.interval).unwrap_or(TimeDelta::seconds(1));

        let mut out = Vec::new();
        let mut along: f64 = 0.0;
        let mut k = 0i32;
        loop {
            let clamped = along.min(total);
            if let Some(p) = self.point_at(clamped) {
                out.push(PositionSample::new(p, self.start + step_dt * k));
            }
            if clamped >= total {
                break;
            }
            along += step_m;
            k += 1;
        }
        out
    }

    /// The fixes `watch` emits for `opts`: accuracy stamped and cached fixes
    /// skipped.
    pub fn fixes(&self, opts: WatchOptions) -> Vec<PositionSample> {
        let accuracy = if opts.high_accuracy {
            HIGH_ACCURACY_M
        } else {
            COARSE_ACCURACY_M
        };
        let samples = self
            .samples()
            .into_iter()
            .map(|s| PositionSample {
                accuracy_m: Some(accuracy),
                ..s
            })
            .collect();
        skip_cached(samples, opts.maximum_age)
    }

    fn point_at(&self, along_m: f64) -> Option<Position> {
        let first = *self.path.first()?;
        if self.path.len() < 2 {
            return Some(first);
        }

        let last_seg = self.path.len() - 2;
        let mut remaining = along_m;
        for (i, seg) in self.path.windows(2).enumerate() {
            let (a, b) = (seg[0], seg[1]);
            let len = haversine_m(a, b);
            if remaining <= len || i == last_seg {
                let t = if len > 0.0 { (remaining / len).clamp(0.0, 1.0) } else { 0.0 };
                return Some(offset_along(a, b, t, self.lateral_offset_m));
            }
            remaining -= len;
        }
        self.path.last().copied()
    }
}

/// Point at fraction `t` of `a`-`b`, shifted `offset_m` to the left.
fn offset_along(a: Position, b: Position, t: f64, offset_m: f64) -> Position {
    let frame = PlanarFrame::for_segment(a, b);
    let pa = frame.project(a);
    let pb = frame.project(b);
    let dx = pb.x - pa.x;
    let dy = pb.y - pa.y;
    let len = dx.hypot(dy);

    let mut q = Xy::new(pa.x + dx * t, pa.y + dy * t);
    if len > 0.0 && offset_m != 0.0 {
        q.x += -dy / len * offset_m;
        q.y += dx / len * offset_m;
    }
    frame.unproject(q)
}

impl LocationSource for SimulatedWalk {
    fn watch(&self, opts: WatchOptions) -> BoxStream<'static, PositionSample> {
        let fixes = self.fixes(opts);
        if !self.real_time {
            return stream::iter(fixes).boxed();
        }

        let interval = self.interval;
        // Each emitted fix waits one interval per tick it stands for.
        let mut prev_at = fixes.first().map(|s| s.at);
        let waits: Vec<Duration> = fixes
            .iter()
            .map(|s| {
                let gap = prev_at.map_or(TimeDelta::zero(), |p| s.at - p);
                prev_at = Some(s.at);
                gap.to_std().unwrap_or(interval)
            })
            .collect();

        stream::iter(fixes.into_iter().zip(waits))
            .then(move |(fix, wait)| async move {
                if wait.is_zero() {
                    return Some(fix);
                }
                match tokio::time::timeout(opts.timeout, tokio::time::sleep(wait)).await {
                    Ok(()) => Some(fix),
                    Err(_) => {
                        tracing::warn!(
                            timeout_ms = opts.timeout.as_millis() as u64,
                            "no position fix within timeout"
                        );
                        None
                    }
                }
            })
            .take_while(|fix| std::future::ready(fix.is_some()))
            .filter_map(std::future::ready)
            .boxed()
    }
}
