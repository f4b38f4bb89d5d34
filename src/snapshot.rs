use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Monitored window features, in the order they are checked and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    PacketCount,
    SrcIps,
    DstIps,
    Protocols,
    TcpCount,
    UdpCount,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::PacketCount,
        Feature::SrcIps,
        Feature::DstIps,
        Feature::Protocols,
        Feature::TcpCount,
        Feature::UdpCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::PacketCount => "packet_count",
            Feature::SrcIps => "src_ips",
            Feature::DstIps => "dst_ips",
            Feature::Protocols => "protocols",
            Feature::TcpCount => "tcp_count",
            Feature::UdpCount => "udp_count",
        }
    }

    /// Category text used when the feature exceeds its limit.
    pub fn label(self) -> &'static str {
        match self {
            Feature::PacketCount => "High packet count",
            Feature::SrcIps => "High number of source IPs",
            Feature::DstIps => "High number of destination IPs",
            Feature::Protocols => "High number of protocols",
            Feature::TcpCount => "High TCP packet count",
            Feature::UdpCount => "High UDP packet count",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Summary of one closed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSnapshot {
    pub packet_count: u64,
    pub src_ips: u64,
    pub dst_ips: u64,
    pub protocols: u64,
    pub tcp_count: u64,
    pub udp_count: u64,
    /// Run time since aggregator start, or since window start, depending on
    /// the aggregator's `ElapsedMode`.
    pub elapsed_time: Duration,
    /// 1-based sequence number of the window.
    pub window: u64,
    pub window_duration: Duration,
}

impl FeatureSnapshot {
    pub fn value(&self, feature: Feature) -> u64 {
        match feature {
            Feature::PacketCount => self.packet_count,
            Feature::SrcIps => self.src_ips,
            Feature::DstIps => self.dst_ips,
            Feature::Protocols => self.protocols,
            Feature::TcpCount => self.tcp_count,
            Feature::UdpCount => self.udp_count,
        }
    }

    /// `(feature, value)` pairs in report order.
    pub fn features(&self) -> impl Iterator<Item = (Feature, u64)> + '_ {
        Feature::ALL.into_iter().map(move |f| (f, self.value(f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_follow_check_order() {
        let snapshot = FeatureSnapshot {
            packet_count: 6,
            src_ips: 5,
            dst_ips: 4,
            protocols: 3,
            tcp_count: 2,
            udp_count: 1,
            elapsed_time: Duration::ZERO,
            window: 1,
            window_duration: Duration::ZERO,
        };

        let names: Vec<_> = snapshot.features().map(|(f, _)| f.name()).collect();
        assert_eq!(
            names,
            ["packet_count", "src_ips", "dst_ips", "protocols", "tcp_count", "udp_count"]
        );
        let values: Vec<_> = snapshot.features().map(|(_, v)| v).collect();
        assert_eq!(values, [6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn feature_serializes_as_snake_case() {
        let json = serde_json::to_string(&Feature::TcpCount).unwrap();
        assert_eq!(json, "\"tcp_count\"");
    }
}
