//! Windowed traffic feature aggregation and threshold-based anomaly alerts.
//!
//! Events flow from an acquisition source (see [`sniff`]) through a
//! [`WindowAggregator`], which emits a [`FeatureSnapshot`] whenever its
//! window interval elapses. An [`AnomalyEvaluator`] turns each snapshot into
//! alerts and a [`pipeline::AlertSink`] delivers both.

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod sniff;
pub mod snapshot;

pub use aggregator::{ElapsedMode, WindowAggregator, WindowBoundary, WindowConfig, WindowResult};
pub use detection::{evaluate, Alert, AnomalyEvaluator};
pub use models::{TrafficEvent, TransportFlags};
pub use pipeline::{AlertSink, Pipeline, PipelineSummary, WindowReport};
pub use rules::ThresholdRuleSet;
pub use snapshot::{Feature, FeatureSnapshot};
