use crate::snapshot::Feature;

/// Per-feature limits. A feature alerts only when strictly above its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdRuleSet {
    pub packet_count: u64,
    pub src_ips: u64,
    pub dst_ips: u64,
    pub protocols: u64,
    pub tcp_count: u64,
    pub udp_count: u64,
}

impl ThresholdRuleSet {
    pub fn limit(&self, feature: Feature) -> u64 {
        match feature {
            Feature::PacketCount => self.packet_count,
            Feature::SrcIps => self.src_ips,
            Feature::DstIps => self.dst_ips,
            Feature::Protocols => self.protocols,
            Feature::TcpCount => self.tcp_count,
            Feature::UdpCount => self.udp_count,
        }
    }
}

impl Default for ThresholdRuleSet {
    fn default() -> Self {
        ThresholdRuleSet {
            packet_count: 1000,
            src_ips: 10,
            dst_ips: 10,
            protocols: 5,
            tcp_count: 500,
            udp_count: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_feature() {
        let rules = ThresholdRuleSet::default();
        let limits: Vec<_> = Feature::ALL.iter().map(|f| rules.limit(*f)).collect();
        assert_eq!(limits, [1000, 10, 10, 5, 500, 500]);
    }
}
