use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::models::TrafficEvent;
use crate::snapshot::FeatureSnapshot;

pub const DEFAULT_WINDOW_INTERVAL: Duration = Duration::from_secs(2);

/// What `FeatureSnapshot::elapsed_time` measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ElapsedMode {
    /// Cumulative run time since the aggregator was created.
    #[default]
    SinceStart,
    /// Time since the closing window opened.
    SinceWindowStart,
}

/// Which window receives the event that arrives once the interval has elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowBoundary {
    /// The running window closes first; the event opens the next window.
    #[default]
    NextWindow,
    /// The event is counted, then the window closes with it included.
    ClosingWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub interval: Duration,
    pub elapsed: ElapsedMode,
    pub boundary: WindowBoundary,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            interval: DEFAULT_WINDOW_INTERVAL,
            elapsed: ElapsedMode::default(),
            boundary: WindowBoundary::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowResult {
    Accumulating,
    Closed(FeatureSnapshot),
}

impl WindowResult {
    pub fn snapshot(self) -> Option<FeatureSnapshot> {
        match self {
            WindowResult::Accumulating => None,
            WindowResult::Closed(snapshot) => Some(snapshot),
        }
    }
}

/// Counters for the running window. Replaced wholesale on close.
#[derive(Debug, Default)]
struct WindowStats {
    packet_count: u64,
    src_ips: HashSet<String>,
    dst_ips: HashSet<String>,
    protocols: HashSet<u8>,
    tcp_count: u64,
    udp_count: u64,
}

impl WindowStats {
    fn record(&mut self, event: TrafficEvent) {
        self.packet_count += 1;
        if event.transport.tcp {
            self.tcp_count += 1;
        }
        if event.transport.udp {
            self.udp_count += 1;
        }
        self.protocols.insert(event.protocol);
        self.src_ips.insert(event.source);
        self.dst_ips.insert(event.destination);
    }
}

/// Accumulates traffic events into fixed-interval windows.
///
/// Mutation goes through `&mut self`, so a single owner feeds it; share it
/// across threads only behind a channel or lock.
#[derive(Debug)]
pub struct WindowAggregator<C: Clock = SystemClock> {
    config: WindowConfig,
    clock: C,
    started_at: Instant,
    window_started_at: Instant,
    current: WindowStats,
    windows_closed: u64,
}

impl WindowAggregator<SystemClock> {
    pub fn new(config: WindowConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> WindowAggregator<C> {
    pub fn with_clock(config: WindowConfig, clock: C) -> Self {
        let now = clock.now();
        WindowAggregator {
            config,
            clock,
            started_at: now,
            window_started_at: now,
            current: WindowStats::default(),
            windows_closed: 0,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Events counted in the running window.
    pub fn pending(&self) -> u64 {
        self.current.packet_count
    }

    pub fn windows_closed(&self) -> u64 {
        self.windows_closed
    }

    pub fn ingest(&mut self, event: TrafficEvent) -> WindowResult {
        let now = self.clock.now();
        self.ingest_at(event, now)
    }

    /// Like `ingest`, with the arrival instant supplied by the caller.
    pub fn ingest_at(&mut self, event: TrafficEvent, now: Instant) -> WindowResult {
        let due = now.saturating_duration_since(self.window_started_at) >= self.config.interval;

        match self.config.boundary {
            WindowBoundary::NextWindow => {
                let result = if due {
                    WindowResult::Closed(self.close(now))
                } else {
                    WindowResult::Accumulating
                };
                self.current.record(event);
                result
            }
            WindowBoundary::ClosingWindow => {
                self.current.record(event);
                if due {
                    WindowResult::Closed(self.close(now))
                } else {
                    WindowResult::Accumulating
                }
            }
        }
    }

    /// Closes the running window regardless of elapsed time.
    pub fn flush(&mut self) -> FeatureSnapshot {
        let now = self.clock.now();
        self.flush_at(now)
    }

    pub fn flush_at(&mut self, now: Instant) -> FeatureSnapshot {
        self.close(now)
    }

    fn close(&mut self, now: Instant) -> FeatureSnapshot {
        let stats = std::mem::take(&mut self.current);
        let window_duration = now.saturating_duration_since(self.window_started_at);
        let elapsed_time = match self.config.elapsed {
            ElapsedMode::SinceStart => now.saturating_duration_since(self.started_at),
            ElapsedMode::SinceWindowStart => window_duration,
        };

        self.windows_closed += 1;
        self.window_started_at = now;

        let snapshot = FeatureSnapshot {
            packet_count: stats.packet_count,
            src_ips: stats.src_ips.len() as u64,
            dst_ips: stats.dst_ips.len() as u64,
            protocols: stats.protocols.len() as u64,
            tcp_count: stats.tcp_count,
            udp_count: stats.udp_count,
            elapsed_time,
            window: self.windows_closed,
            window_duration,
        };

        debug!(
            window = snapshot.window,
            packets = snapshot.packet_count,
            duration_ms = window_duration.as_millis() as u64,
            "window closed"
        );
        snapshot
    }
}
