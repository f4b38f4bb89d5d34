use chrono::{DateTime, Utc};
use crossbeam_channel::{select, Receiver};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::{WindowAggregator, WindowResult};
use crate::clock::{Clock, SystemClock};
use crate::detection::{Alert, AnomalyEvaluator};
use crate::error::SinkError;
use crate::models::TrafficEvent;
use crate::snapshot::FeatureSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Elapsed,
    Flush,
}

/// One closed window and what it triggered, as handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowReport {
    pub snapshot: FeatureSnapshot,
    pub alerts: Vec<Alert>,
    pub reason: CloseReason,
    pub closed_at: DateTime<Utc>,
}

/// Alert delivery collaborator.
pub trait AlertSink {
    fn deliver(&mut self, report: &WindowReport) -> Result<(), SinkError>;
}

impl<S: AlertSink + ?Sized> AlertSink for &mut S {
    fn deliver(&mut self, report: &WindowReport) -> Result<(), SinkError> {
        (**self).deliver(report)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub events: u64,
    pub windows: u64,
    pub alerts: u64,
}

/// Feeds events into the aggregator and forwards every closed window,
/// evaluated, to the sink.
pub struct Pipeline<S: AlertSink, C: Clock = SystemClock> {
    aggregator: WindowAggregator<C>,
    evaluator: AnomalyEvaluator,
    sink: S,
    summary: PipelineSummary,
}

impl<S: AlertSink, C: Clock> Pipeline<S, C> {
    pub fn new(aggregator: WindowAggregator<C>, evaluator: AnomalyEvaluator, sink: S) -> Self {
        Pipeline {
            aggregator,
            evaluator,
            sink,
            summary: PipelineSummary::default(),
        }
    }

    pub fn summary(&self) -> PipelineSummary {
        self.summary
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Processes a finite stream, then flushes the partial window.
    pub fn run<I>(&mut self, events: I) -> PipelineSummary
    where
        I: IntoIterator<Item = TrafficEvent>,
    {
        for event in events {
            self.handle(event);
        }
        self.shutdown()
    }

    /// Consumes `events` until a shutdown signal arrives or every sender is
    /// gone, then flushes the partial window.
    pub fn run_until(
        &mut self,
        events: &Receiver<TrafficEvent>,
        shutdown: &Receiver<()>,
    ) -> PipelineSummary {
        info!("pipeline started");
        loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => self.handle(event),
                    Err(_) => {
                        info!("event stream closed");
                        break;
                    }
                },
                recv(shutdown) -> _ => {
                    info!("shutdown requested");
                    break;
                }
            }
        }
        self.shutdown()
    }

    pub fn handle(&mut self, event: TrafficEvent) {
        self.summary.events += 1;
        if let WindowResult::Closed(snapshot) = self.aggregator.ingest(event) {
            self.publish(snapshot, CloseReason::Elapsed);
        }
    }

    /// Flushes and delivers the running window.
    pub fn shutdown(&mut self) -> PipelineSummary {
        let snapshot = self.aggregator.flush();
        self.publish(snapshot, CloseReason::Flush);
        info!(
            events = self.summary.events,
            windows = self.summary.windows,
            alerts = self.summary.alerts,
            "pipeline stopped"
        );
        self.summary
    }

    fn publish(&mut self, snapshot: FeatureSnapshot, reason: CloseReason) {
        let alerts = self.evaluator.evaluate(&snapshot);
        self.summary.windows += 1;
        self.summary.alerts += alerts.len() as u64;

        let report = WindowReport {
            snapshot,
            alerts,
            reason,
            closed_at: Utc::now(),
        };
        if let Err(e) = self.sink.deliver(&report) {
            warn!(window = snapshot.window, error = %e, "failed to deliver window report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::WindowConfig;
    use crate::clock::ManualClock;
    use crate::rules::ThresholdRuleSet;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    #[derive(Default)]
    struct Collect(Vec<WindowReport>);

    impl AlertSink for Collect {
        fn deliver(&mut self, report: &WindowReport) -> Result<(), SinkError> {
            self.0.push(report.clone());
            Ok(())
        }
    }

    struct Broken;

    impl AlertSink for Broken {
        fn deliver(&mut self, _report: &WindowReport) -> Result<(), SinkError> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
        }
    }

    fn pipeline<S: AlertSink>(sink: S, rules: ThresholdRuleSet) -> Pipeline<S, ManualClock> {
        let aggregator = WindowAggregator::with_clock(WindowConfig::default(), ManualClock::new());
        Pipeline::new(aggregator, AnomalyEvaluator::new(rules), sink)
    }

    #[test]
    fn finite_stream_is_flushed() {
        let mut p = pipeline(Collect::default(), ThresholdRuleSet::default());
        let summary = p.run((0..3).map(|i| TrafficEvent::udp(format!("10.0.0.{i}"), "8.8.8.8")));

        assert_eq!(summary, PipelineSummary { events: 3, windows: 1, alerts: 0 });
        let reports = p.into_sink().0;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].reason, CloseReason::Flush);
        assert_eq!(reports[0].snapshot.udp_count, 3);
        assert!(reports[0].alerts.is_empty());
    }

    #[test]
    fn flushed_window_is_evaluated() {
        let rules = ThresholdRuleSet { src_ips: 1, ..ThresholdRuleSet::default() };
        let mut sink = Collect::default();
        let summary = pipeline(&mut sink, rules).run(vec![
            TrafficEvent::tcp("10.0.0.1", "10.0.0.9"),
            TrafficEvent::tcp("10.0.0.2", "10.0.0.9"),
        ]);

        assert_eq!(summary.alerts, 1);
        assert_eq!(sink.0[0].alerts[0].label(), "High number of source IPs");
    }

    #[test]
    fn shutdown_signal_stops_loop() {
        let (tx, rx) = unbounded();
        let (stop_tx, stop_rx) = unbounded();
        let mut p = pipeline(Collect::default(), ThresholdRuleSet::default());

        tx.send(TrafficEvent::tcp("a", "b")).unwrap();
        tx.send(TrafficEvent::tcp("a", "c")).unwrap();
        stop_tx.send(()).unwrap();

        let summary = p.run_until(&rx, &stop_rx);
        assert_eq!(summary.windows, 1);
        assert!(summary.events <= 2);
        drop(tx);
    }

    #[test]
    fn disconnected_stream_ends_run() {
        let (tx, rx) = unbounded();
        let (_stop_tx, stop_rx) = unbounded::<()>();
        for i in 0..5 {
            tx.send(TrafficEvent::tcp(format!("h{i}"), "srv")).unwrap();
        }
        drop(tx);

        let mut p = pipeline(Collect::default(), ThresholdRuleSet::default());
        let summary = p.run_until(&rx, &stop_rx);
        assert_eq!(summary.events, 5);
        assert_eq!(p.into_sink().0[0].snapshot.src_ips, 5);
    }

    #[test]
    fn sink_failures_do_not_stop_pipeline() {
        let mut p = pipeline(Broken, ThresholdRuleSet::default());
        let summary = p.run(vec![TrafficEvent::tcp("a", "b")]);
        assert_eq!(summary, PipelineSummary { events: 1, windows: 1, alerts: 0 });
    }

    #[test]
    fn elapsed_windows_are_published_before_flush() {
        let clock = ManualClock::new();
        let aggregator = WindowAggregator::with_clock(WindowConfig::default(), clock.clone());
        let mut p = Pipeline::new(
            aggregator,
            AnomalyEvaluator::new(ThresholdRuleSet::default()),
            Collect::default(),
        );

        p.handle(TrafficEvent::tcp("a", "b"));
        clock.advance(Duration::from_secs(3));
        p.handle(TrafficEvent::tcp("a", "b"));
        p.shutdown();

        let reasons: Vec<_> = p.into_sink().0.iter().map(|r| r.reason).collect();
        assert_eq!(reasons, [CloseReason::Elapsed, CloseReason::Flush]);
    }
}
