use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::aggregator::{ElapsedMode, WindowBoundary, WindowConfig};
use crate::error::ConfigError;
use crate::report::OutputFormat;
use crate::rules::ThresholdRuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ElapsedArg {
    /// Cumulative time since the monitor started
    Run,
    /// Time since the reported window opened
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoundaryArg {
    /// The late event opens the next window
    Next,
    /// The late event is counted in the window it closes
    Closing,
}

/// Watch live traffic and alert when window features exceed their limits.
#[derive(Debug, Parser)]
#[command(name = "netsentry", version, about)]
pub struct Cli {
    /// Interface to capture on (default device when omitted)
    #[arg(short, long, env = "NETSENTRY_INTERFACE")]
    pub interface: Option<String>,

    /// List capture devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Window length in seconds
    #[arg(short, long, env = "NETSENTRY_WINDOW_SECS", default_value_t = 2.0)]
    pub window_secs: f64,

    #[arg(long, value_enum, env = "NETSENTRY_ELAPSED", default_value_t = ElapsedArg::Run)]
    pub elapsed: ElapsedArg,

    #[arg(long, value_enum, env = "NETSENTRY_BOUNDARY", default_value_t = BoundaryArg::Next)]
    pub boundary: BoundaryArg,

    #[arg(short, long, value_enum, env = "NETSENTRY_FORMAT", default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ThresholdArgs {
    #[arg(long, env = "NETSENTRY_MAX_PACKETS", default_value_t = 1000)]
    pub max_packets: u64,

    #[arg(long, env = "NETSENTRY_MAX_SRC_IPS", default_value_t = 10)]
    pub max_src_ips: u64,

    #[arg(long, env = "NETSENTRY_MAX_DST_IPS", default_value_t = 10)]
    pub max_dst_ips: u64,

    #[arg(long, env = "NETSENTRY_MAX_PROTOCOLS", default_value_t = 5)]
    pub max_protocols: u64,

    #[arg(long, env = "NETSENTRY_MAX_TCP", default_value_t = 500)]
    pub max_tcp: u64,

    #[arg(long, env = "NETSENTRY_MAX_UDP", default_value_t = 500)]
    pub max_udp: u64,
}

impl From<&ThresholdArgs> for ThresholdRuleSet {
    fn from(args: &ThresholdArgs) -> Self {
        ThresholdRuleSet {
            packet_count: args.max_packets,
            src_ips: args.max_src_ips,
            dst_ips: args.max_dst_ips,
            protocols: args.max_protocols,
            tcp_count: args.max_tcp,
            udp_count: args.max_udp,
        }
    }
}

impl Cli {
    pub fn rules(&self) -> ThresholdRuleSet {
        ThresholdRuleSet::from(&self.thresholds)
    }

    pub fn window_config(&self) -> Result<WindowConfig, ConfigError> {
        if !self.window_secs.is_finite() || self.window_secs <= 0.0 {
            return Err(ConfigError::InvalidInterval(self.window_secs));
        }

        Ok(WindowConfig {
            interval: Duration::from_secs_f64(self.window_secs),
            elapsed: match self.elapsed {
                ElapsedArg::Run => ElapsedMode::SinceStart,
                ElapsedArg::Window => ElapsedMode::SinceWindowStart,
            },
            boundary: match self.boundary {
                BoundaryArg::Next => WindowBoundary::NextWindow,
                BoundaryArg::Closing => WindowBoundary::ClosingWindow,
            },
        })
    }
}
