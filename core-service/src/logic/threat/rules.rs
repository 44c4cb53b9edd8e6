//! Recommendation Rules
//!
//! Declarative advice tables: one base sentence per label plus an ordered
//! list of (feature, detail) rules. Rule order is the output order.
//! Data only, no logic.

use super::types::TrafficLabel;

// ============================================================================
// TABLE TYPES
// ============================================================================

/// A detail sentence gated by one attributing feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRule {
    pub feature: &'static str,
    pub sentence: &'static str,
}

const fn rule(feature: &'static str, sentence: &'static str) -> DetailRule {
    DetailRule { feature, sentence }
}

/// Advice for one label
#[derive(Debug, Clone, Copy)]
pub struct AdviceTable {
    pub label: TrafficLabel,
    pub base: &'static str,
    pub details: &'static [DetailRule],
    pub closing: &'static str,
}

// ============================================================================
// FIXED MESSAGES
// ============================================================================

/// Returned verbatim for labels without a table
pub const UNKNOWN_LABEL_MESSAGE: &str = "Unknown attack type. Further investigation required.";

/// Closing sentence for benign traffic with at least one detail
pub const BENIGN_CLOSING: &str = "These network characteristics strongly indicate legitimate traffic patterns. Continue monitoring but no immediate action required.";

/// Closing sentence for attacks with at least one detail
pub const ATTACK_CLOSING: &str = "These recommendations should be implemented to mitigate the attack.";

// ============================================================================
// BENIGN
// ============================================================================

const BENIGN_RULES: &[DetailRule] = &[
    rule(
        "Destination Port",
        "Standard destination port usage indicates normal application traffic patterns.",
    ),
    rule(
        "SYN Flag Count",
        "Normal SYN flag patterns suggest regular connection establishment behavior.",
    ),
    rule(
        "Total Length of Fwd Packets",
        "Forward packet lengths show typical data transfer patterns consistent with normal traffic.",
    ),
    rule(
        "Subflow Bwd Packets",
        "Backward packet flow indicates normal response patterns from server to client.",
    ),
    rule(
        "Bwd IAT Max",
        "Maximum inter arrival time for backward packets shows regular server response timing.",
    ),
    rule(
        "Active Std",
        "Standard deviation of active time indicates consistent connection behavior.",
    ),
    rule(
        "Flow Bytes/s",
        "Byte flow rate falls within normal ranges for legitimate traffic.",
    ),
    rule(
        "Fwd Packet Length Min",
        "Minimum forward packet length shows expected protocol behavior.",
    ),
    rule(
        "Bwd Packets/s",
        "Rate of backward packets indicates normal server response patterns.",
    ),
];

// ============================================================================
// DOS
// ============================================================================

const DOS_RULES: &[DetailRule] = &[
    rule(
        "Fwd Header Length",
        "High Forward Header Length detected → Implement packet header inspection and filtering",
    ),
    rule(
        "Idle Std",
        "Unusual idle time patterns detected → Consider implementing traffic rate analysis",
    ),
    rule(
        "Total Length of Fwd Packets",
        "Abnormal forward packet lengths → Set up packet size monitoring and filtering rules",
    ),
    rule(
        "URG Flag Count",
        "High URG flag usage detected → Configure firewall to handle URG flag abuse",
    ),
    rule(
        "act_data_pkt_fwd",
        "Unusual active data packet patterns → Implement active connection monitoring",
    ),
    rule(
        "Packet Length Std",
        "Unusual packet size variation → Monitor packet size distributions",
    ),
    rule(
        "Total Backward Packets",
        "High volume of backward packets → Set up volumetric analysis and filtering",
    ),
    rule(
        "Fwd Packets/s",
        "High packet rate → Implement rate limiting per source",
    ),
    rule(
        "Fwd Packet Length Max",
        "Large forward packets detected → Set maximum packet size limits",
    ),
    rule(
        "Flow IAT Max",
        "Unusual flow timing patterns → Set up flow timing analysis",
    ),
    rule(
        "Bwd IAT Total",
        "Abnormal backward timing total → Monitor cumulative timing patterns",
    ),
    rule(
        "Bwd Header Length",
        "Abnormal backward header size → Monitor and filter suspicious header patterns",
    ),
    rule(
        "CWE Flag Count",
        "Unusual CWE flag patterns → Monitor congestion window behavior",
    ),
    rule(
        "SYN Flag Count",
        "High SYN flag count → Enable SYN flood protection mechanisms",
    ),
    rule(
        "Destination Port",
        "Suspicious port targeting → Implement port-based traffic filtering",
    ),
];

// ============================================================================
// DDOS
// ============================================================================

const DDOS_RULES: &[DetailRule] = &[
    rule(
        "ACK Flag Count",
        "High ACK flag count → Implement SYN cookie protection and ACK flood protection.",
    ),
    rule(
        "Fwd URG Flags",
        "URG flag abuse detected → Configure firewall rules to handle URG flag misuse.",
    ),
    rule(
        "Init_Win_bytes_backward",
        "Unusual window size patterns → Adjust TCP window size parameters.",
    ),
    rule(
        "Total Backward Packets",
        "High volume of backward packets → Implement bandwidth throttling for suspected sources.",
    ),
    rule(
        "Fwd IAT Min",
        "Very small forward packet timing intervals → Set up minimum Inter-Arrival Time thresholds",
    ),
    rule(
        "Packet Length Mean",
        "Abnormal packet length patterns → Set up packet size filtering rules.",
    ),
];

// ============================================================================
// PORT SCAN
// ============================================================================

const PORT_SCAN_RULES: &[DetailRule] = &[
    rule(
        "Bwd Header Length",
        "Unusual backward header length → Implement port scan detection rules",
    ),
    rule(
        "CWE Flag Count",
        "CWE flag anomalies → Monitor and block suspicious flag patterns",
    ),
    rule(
        "Destination Port",
        "Multiple destination ports → Set up port scan rate limiting",
    ),
    rule(
        "min_seg_size_forward",
        "Small segment sizes detected → Configure minimum segment size requirements",
    ),
    rule(
        "Flow Duration",
        "Short flow durations → Implement connection attempt rate limiting",
    ),
    rule(
        "Bwd Packet Length Mean",
        "Unusual backward packet length mean → Monitor response packet sizes for scan patterns",
    ),
    rule(
        "Packet Length Variance",
        "Abnormal packet length variance → Set up packet size variation monitoring for scan detection",
    ),
    rule(
        "Total Fwd Packets",
        "High number of forward packets → Monitor and limit rapid connection attempts per source",
    ),
];

// ============================================================================
// BRUTE FORCE
// ============================================================================

const BRUTE_FORCE_RULES: &[DetailRule] = &[
    rule(
        "ACK Flag Count",
        "High ACK flag count → Implement progressive delays between login attempts",
    ),
    rule(
        "Down/Up Ratio",
        "Unusual Down/Up Ratio → Monitor and limit asymmetric traffic patterns",
    ),
    rule(
        "Init_Win_bytes_forward",
        "Abnormal window size → Implement connection throttling",
    ),
    rule(
        "PSH Flag Count",
        "High PSH flag usage → Set up request rate limiting per IP",
    ),
    rule(
        "min_seg_size_forward",
        "Unusual segment size → Monitor and filter suspicious packet sizes",
    ),
    rule(
        "Fwd IAT Max",
        "High forward inter-arrival time → Implement timing-based access controls",
    ),
    rule(
        "Fwd PSH Flags",
        "Suspicious PSH flag patterns → Monitor and limit rapid connection attempts",
    ),
    rule(
        "SYN Flag Count",
        "Unusual ACK flag patterns → Monitor ACK flag frequency",
    ),
    rule(
        "Bwd Header Length",
        "Abnormal backward header length → Inspect response header patterns",
    ),
    rule(
        "CWE Flag Count",
        "Unusual CWE flag usage → Monitor congestion window flags",
    ),
    rule(
        "Fwd Packet Length Std",
        "Irregular forward packet length variation → Analyze packet size patterns",
    ),
    rule(
        "min_seg_size_forward",
        "Unusual minimum segment size → Monitor TCP segment size patterns",
    ),
    rule(
        "Total Fwd Packets",
        "Unusual number of forward packets → Set up packet volume monitoring and thresholds",
    ),
];

// ============================================================================
// BOT
// ============================================================================

const BOT_RULES: &[DetailRule] = &[
    rule(
        "Bwd IAT Min",
        "Suspicious backward packet timing → Implement timing analysis for bot detection",
    ),
    rule(
        "Flow Duration",
        "Unusual flow duration patterns → Set up flow duration monitoring",
    ),
    rule(
        "RST Flag Count",
        "Abnormal RST flags → Monitor for connection reset patterns",
    ),
    rule(
        "Subflow Bwd Bytes",
        "Suspicious backward traffic volume → Analyze traffic symmetry",
    ),
    rule(
        "Fwd Packet Length Mean",
        "Uniform packet sizes → Implement packet size variance checks",
    ),
    rule(
        "Bwd Header Length",
        "Unusual header lengths → Monitor header patterns",
    ),
    rule(
        "Min Packet Length",
        "Consistent minimum packet sizes → Set up packet size profiling",
    ),
    rule(
        "Destination Port",
        "Port targeting patterns → Implement port hopping detection",
    ),
    rule(
        "Bwd IAT Max",
        "Maximum backward timing anomalies → Set up timing-based detection rules",
    ),
];

// ============================================================================
// WEB ATTACK
// ============================================================================

const WEB_ATTACK_RULES: &[DetailRule] = &[
    rule(
        "Active Mean",
        "Unusual activity patterns → Implement request rate monitoring",
    ),
    rule(
        "Bwd Header Length",
        "Suspicious header lengths → Set up header inspection and filtering",
    ),
    rule(
        "ECE Flag Count",
        "ECE flag anomalies → Monitor and analyze flag usage patterns",
    ),
    rule(
        "Fwd Packet Length Max",
        "Large packet sizes → Implement payload size restrictions",
    ),
    rule(
        "Fwd Packets/s",
        "High packet rate → Set up rate limiting per client",
    ),
    rule(
        "Fwd Packet Length Max",
        "Large packet sizes detected → Implement payload size restrictions and content length validation",
    ),
    rule(
        "Bwd IAT Std",
        "Irregular backward timing → Monitor response timing patterns for potential SQL injection",
    ),
    rule(
        "Destination Port",
        "Unusual port targeting → Restrict access to sensitive ports and implement port filtering",
    ),
    rule(
        "Idle Min",
        "Minimal idle time → Monitor for automated attack patterns and bot activity",
    ),
    rule(
        "SYN Flag Count",
        "High SYN count → Implement SYN flood protection and connection rate limiting",
    ),
    rule(
        "Total Length of Fwd Packets",
        "Abnormal packet lengths → Monitor for large payloads indicating potential XSS or injection attacks",
    ),
];

// ============================================================================
// LOOKUP
// ============================================================================

/// All advice tables, one per known label
pub static ADVICE_TABLES: &[AdviceTable] = &[
    AdviceTable {
        label: TrafficLabel::Benign,
        base: "Traffic appears to be normal.",
        details: BENIGN_RULES,
        closing: BENIGN_CLOSING,
    },
    AdviceTable {
        label: TrafficLabel::DoS,
        base: "DoS attack detected. Monitor traffic and identify attack sources.",
        details: DOS_RULES,
        closing: ATTACK_CLOSING,
    },
    AdviceTable {
        label: TrafficLabel::DDoS,
        base: "DDoS attack detected. Traffic overload, consider blocking source IPs.",
        details: DDOS_RULES,
        closing: ATTACK_CLOSING,
    },
    AdviceTable {
        label: TrafficLabel::PortScan,
        base: "Port scan detected. Investigate for potential reconnaissance activity.",
        details: PORT_SCAN_RULES,
        closing: ATTACK_CLOSING,
    },
    AdviceTable {
        label: TrafficLabel::BruteForce,
        base: "Brute force attack detected. Consider rate-limiting or blocking IPs.",
        details: BRUTE_FORCE_RULES,
        closing: ATTACK_CLOSING,
    },
    AdviceTable {
        label: TrafficLabel::Bot,
        base: "Bot/Automated Traffic Detected.",
        details: BOT_RULES,
        closing: ATTACK_CLOSING,
    },
    AdviceTable {
        label: TrafficLabel::WebAttack,
        base: "Web attack detected. Review web application security.",
        details: WEB_ATTACK_RULES,
        closing: ATTACK_CLOSING,
    },
];

/// Find the advice table for a label
pub fn table_for(label: TrafficLabel) -> Option<&'static AdviceTable> {
    ADVICE_TABLES.iter().find(|t| t.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::feature_index;

    #[test]
    fn test_every_label_has_a_table() {
        assert!(table_for(TrafficLabel::Benign).is_some());
        for label in TrafficLabel::ATTACKS {
            assert!(table_for(label).is_some(), "missing table for {}", label);
        }
        assert_eq!(ADVICE_TABLES.len(), 7);
    }

    #[test]
    fn test_rule_features_are_model_features() {
        for table in ADVICE_TABLES {
            for detail in table.details {
                assert!(
                    feature_index(detail.feature).is_some(),
                    "{} rule references unknown feature '{}'",
                    table.label,
                    detail.feature
                );
            }
        }
    }

    #[test]
    fn test_closings() {
        assert_eq!(table_for(TrafficLabel::Benign).map(|t| t.closing), Some(BENIGN_CLOSING));
        for label in TrafficLabel::ATTACKS {
            assert_eq!(table_for(label).map(|t| t.closing), Some(ATTACK_CLOSING));
        }
    }
}
