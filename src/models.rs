pub mod domain {
    /// Transport layers matched by one packet. Independent flags: a tunnelled
    /// or malformed packet may match both, a non TCP/UDP packet neither.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TransportFlags {
        pub tcp: bool,
        pub udp: bool,
    }

    impl TransportFlags {
        pub const NONE: TransportFlags = TransportFlags { tcp: false, udp: false };
        pub const TCP: TransportFlags = TransportFlags { tcp: true, udp: false };
        pub const UDP: TransportFlags = TransportFlags { tcp: false, udp: true };
    }

    /// One observed packet, already decoded by the acquisition side.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TrafficEvent {
        pub source: String,
        pub destination: String,
        /// IANA protocol number (6 = TCP, 17 = UDP, ...).
        pub protocol: u8,
        pub transport: TransportFlags,
    }

    impl TrafficEvent {
        pub fn new(
            source: impl Into<String>,
            destination: impl Into<String>,
            protocol: u8,
            transport: TransportFlags,
        ) -> Self {
            TrafficEvent {
                source: source.into(),
                destination: destination.into(),
                protocol,
                transport,
            }
        }

        pub fn tcp(source: impl Into<String>, destination: impl Into<String>) -> Self {
            Self::new(source, destination, 6, TransportFlags::TCP)
        }

        pub fn udp(source: impl Into<String>, destination: impl Into<String>) -> Self {
            Self::new(source, destination, 17, TransportFlags::UDP)
        }
    }
}

pub mod dto {
    use chrono::{DateTime, Utc};
    use serde::Serialize;

    use crate::pipeline::{CloseReason, WindowReport};

    #[derive(Debug, Serialize, Clone, PartialEq)]
    pub struct FeaturesDTO {
        pub packet_count: u64,
        pub src_ips: u64,
        pub dst_ips: u64,
        pub protocols: u64,
        pub tcp_count: u64,
        pub udp_count: u64,
        pub elapsed_time: f64,
    }

    #[derive(Debug, Serialize, Clone, PartialEq)]
    pub struct AlertDTO {
        pub feature: &'static str,
        pub label: &'static str,
        pub observed: u64,
        pub limit: u64,
    }

    #[derive(Debug, Serialize, Clone, PartialEq)]
    pub struct WindowReportDTO {
        pub window: u64,
        pub reason: CloseReason,
        pub closed_at: DateTime<Utc>,
        pub features: FeaturesDTO,
        pub alerts: Vec<AlertDTO>,
    }

    impl From<&WindowReport> for WindowReportDTO {
        fn from(report: &WindowReport) -> Self {
            let s = &report.snapshot;
            WindowReportDTO {
                window: s.window,
                reason: report.reason,
                closed_at: report.closed_at,
                features: FeaturesDTO {
                    packet_count: s.packet_count,
                    src_ips: s.src_ips,
                    dst_ips: s.dst_ips,
                    protocols: s.protocols,
                    tcp_count: s.tcp_count,
                    udp_count: s.udp_count,
                    elapsed_time: s.elapsed_time.as_secs_f64(),
                },
                alerts: report
                    .alerts
                    .iter()
                    .map(|alert| AlertDTO {
                        feature: alert.feature.name(),
                        label: alert.label(),
                        observed: alert.observed,
                        limit: alert.limit,
                    })
                    .collect(),
            }
        }
    }
}

pub use domain::{TrafficEvent, TransportFlags};
