use serde::Serialize;

use crate::rules::ThresholdRuleSet;
use crate::snapshot::{Feature, FeatureSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub feature: Feature,
    pub observed: u64,
    pub limit: u64,
}

impl Alert {
    pub fn label(&self) -> &'static str {
        self.feature.label()
    }
}

/// Checks every feature against its limit, in `Feature::ALL` order.
/// An empty vector means the window looked normal.
pub fn evaluate(snapshot: &FeatureSnapshot, rules: &ThresholdRuleSet) -> Vec<Alert> {
    Feature::ALL
        .into_iter()
        .filter_map(|feature| {
            let observed = snapshot.value(feature);
            let limit = rules.limit(feature);
            (observed > limit).then_some(Alert {
                feature,
                observed,
                limit,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct AnomalyEvaluator {
    rules: ThresholdRuleSet,
}

impl AnomalyEvaluator {
    pub fn new(rules: ThresholdRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ThresholdRuleSet {
        &self.rules
    }

    pub fn evaluate(&self, snapshot: &FeatureSnapshot) -> Vec<Alert> {
        evaluate(snapshot, &self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn snapshot(values: [u64; 6]) -> FeatureSnapshot {
        let [packet_count, src_ips, dst_ips, protocols, tcp_count, udp_count] = values;
        FeatureSnapshot {
            packet_count,
            src_ips,
            dst_ips,
            protocols,
            tcp_count,
            udp_count,
            elapsed_time: Duration::from_secs(2),
            window: 1,
            window_duration: Duration::from_secs(2),
        }
    }

    #[test]
    fn flags_packet_and_tcp_counts() {
        let alerts = evaluate(
            &snapshot([1500, 5, 5, 2, 800, 100]),
            &ThresholdRuleSet::default(),
        );

        assert_eq!(
            alerts,
            vec![
                Alert { feature: Feature::PacketCount, observed: 1500, limit: 1000 },
                Alert { feature: Feature::TcpCount, observed: 800, limit: 500 },
            ]
        );
        assert_eq!(alerts[0].label(), "High packet count");
        assert_eq!(alerts[1].label(), "High TCP packet count");
    }

    #[test]
    fn values_equal_to_limits_do_not_alert() {
        let alerts = evaluate(
            &snapshot([1000, 10, 10, 5, 500, 500]),
            &ThresholdRuleSet::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn every_feature_can_fire_in_order() {
        let alerts = evaluate(
            &snapshot([1001, 11, 11, 6, 501, 501]),
            &ThresholdRuleSet::default(),
        );
        let fired: Vec<_> = alerts.iter().map(|a| a.feature).collect();
        assert_eq!(fired, Feature::ALL);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let evaluator = AnomalyEvaluator::new(ThresholdRuleSet {
            packet_count: 0,
            src_ips: 0,
            dst_ips: 100,
            protocols: 0,
            tcp_count: 100,
            udp_count: 0,
        });
        let s = snapshot([3, 2, 2, 1, 1, 2]);

        let first = evaluator.evaluate(&s);
        let second = evaluator.evaluate(&s);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}
