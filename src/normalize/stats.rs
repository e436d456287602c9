use super::{as_count, as_text, probe};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Number of entries kept in the top source IP distribution.
pub const TOP_IP_LIMIT: usize = 10;

/// Scalar counters of a stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    TotalRequests,
    BlockedRequests,
    BlockedIps,
    CcAttacks,
}

/// Named distributions of a stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    AttackTypes,
    Os,
    Hosts,
    StatusCodes,
    TopIps,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 5] = [
        DistributionKind::AttackTypes,
        DistributionKind::Os,
        DistributionKind::Hosts,
        DistributionKind::StatusCodes,
        DistributionKind::TopIps,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DistributionKind::AttackTypes => "Attack Types",
            DistributionKind::Os => "Client OS",
            DistributionKind::Hosts => "Hosts",
            DistributionKind::StatusCodes => "Status Codes",
            DistributionKind::TopIps => "Top Source IPs",
        }
    }
}

/// One canonical field and the payload keys it may arrive under, in probe order.
pub struct FieldAliases<F: 'static> {
    pub field: F,
    pub aliases: &'static [&'static str],
}

/// Counter aliases observed across backend versions.
pub const COUNTER_FIELDS: &[FieldAliases<Counter>] = &[
    FieldAliases {
        field: Counter::TotalRequests,
        aliases: &["total_requests", "totalRequests"],
    },
    FieldAliases {
        field: Counter::BlockedRequests,
        aliases: &["blocked_requests", "blockedRequests"],
    },
    FieldAliases {
        field: Counter::BlockedIps,
        aliases: &["blocked_ips", "blockedIps", "blockedIPs"],
    },
    FieldAliases {
        field: Counter::CcAttacks,
        aliases: &["cc_attacks", "ccAttacks"],
    },
];

/// Distribution aliases observed across backend versions.
pub const DISTRIBUTION_FIELDS: &[FieldAliases<DistributionKind>] = &[
    FieldAliases {
        field: DistributionKind::AttackTypes,
        aliases: &["attackTypes", "attack_types", "attack_distribution"],
    },
    FieldAliases {
        field: DistributionKind::Os,
        aliases: &["os_distribution", "osDistribution", "system_distribution"],
    },
    FieldAliases {
        field: DistributionKind::Hosts,
        aliases: &["host_distribution", "hostDistribution"],
    },
    FieldAliases {
        field: DistributionKind::StatusCodes,
        aliases: &["status_distribution", "statusDistribution"],
    },
    FieldAliases {
        field: DistributionKind::TopIps,
        aliases: &["top_ips", "topIps", "topIPs"],
    },
];

/// Keys naming the label of a `{key, count}` sequence element.
const LABEL_KEYS: &[&str] = &["ip", "key", "label", "name"];
const COUNT_KEYS: &[&str] = &["count", "value"];

/// Ordered label → count aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    entries: Vec<(String, u64)>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut dist = Self::new();
        for (label, count) in pairs {
            dist.insert(label, count);
        }
        dist
    }

    /// Set `label` to `count`. An existing label keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, count: u64) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((label, count)),
        }
    }

    /// Decode a mapping or a `{key, count}` sequence. Malformed elements are skipped.
    pub fn decode(value: &Value) -> Self {
        let mut dist = Self::new();
        match value {
            Value::Object(map) => {
                for (label, count) in map {
                    match as_count(count) {
                        Some(count) => dist.insert(label.clone(), count),
                        None => debug!(label = %label, "Skipping non-numeric distribution value"),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    let label = as_text(probe(item, LABEL_KEYS));
                    let count = probe(item, COUNT_KEYS).and_then(as_count);
                    match (label, count) {
                        (Some(label), Some(count)) => dist.insert(label, count),
                        _ => debug!(element = %item, "Skipping malformed distribution element"),
                    }
                }
            }
            Value::Null => {}
            other => debug!(value = %other, "Ignoring distribution of unexpected shape"),
        }
        dist
    }

    /// Keep the `n` highest counts, descending; equal counts keep their order.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(n);
        self
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| *count).sum()
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }
}

/// Point-in-time dashboard aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    /// Never exceeds `total_requests`.
    pub blocked_requests: u64,
    pub blocked_ips: u64,
    pub cc_attacks: u64,
    pub attack_types: Distribution,
    pub os: Distribution,
    pub hosts: Distribution,
    pub status_codes: Distribution,
    pub top_ips: Distribution,
}

impl StatsSnapshot {
    pub fn distribution(&self, kind: DistributionKind) -> &Distribution {
        match kind {
            DistributionKind::AttackTypes => &self.attack_types,
            DistributionKind::Os => &self.os,
            DistributionKind::Hosts => &self.hosts,
            DistributionKind::StatusCodes => &self.status_codes,
            DistributionKind::TopIps => &self.top_ips,
        }
    }

    fn distribution_mut(&mut self, kind: DistributionKind) -> &mut Distribution {
        match kind {
            DistributionKind::AttackTypes => &mut self.attack_types,
            DistributionKind::Os => &mut self.os,
            DistributionKind::Hosts => &mut self.hosts,
            DistributionKind::StatusCodes => &mut self.status_codes,
            DistributionKind::TopIps => &mut self.top_ips,
        }
    }

    /// True when every distribution is empty.
    pub fn has_no_distributions(&self) -> bool {
        DistributionKind::ALL
            .iter()
            .all(|kind| self.distribution(*kind).is_empty())
    }

    pub fn block_rate(&self) -> String {
        block_rate(self.total_requests, self.blocked_requests)
    }
}

/// Normalize a raw `/api/stats` payload. Never fails: missing or malformed fields
/// fall back to zero or an empty distribution.
pub fn normalize_stats(raw: &Value) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot::default();

    for entry in COUNTER_FIELDS {
        let value = probe(raw, entry.aliases).and_then(as_count).unwrap_or(0);
        match entry.field {
            Counter::TotalRequests => snapshot.total_requests = value,
            Counter::BlockedRequests => snapshot.blocked_requests = value,
            Counter::BlockedIps => snapshot.blocked_ips = value,
            Counter::CcAttacks => snapshot.cc_attacks = value,
        }
    }

    if snapshot.blocked_requests > snapshot.total_requests {
        debug!(
            total = snapshot.total_requests,
            blocked = snapshot.blocked_requests,
            "Blocked count exceeds total; clamping"
        );
        snapshot.blocked_requests = snapshot.total_requests;
    }

    for entry in DISTRIBUTION_FIELDS {
        let decoded = probe(raw, entry.aliases)
            .map(Distribution::decode)
            .unwrap_or_default();
        let decoded = if entry.field == DistributionKind::TopIps {
            decoded.top(TOP_IP_LIMIT)
        } else {
            decoded
        };
        *snapshot.distribution_mut(entry.field) = decoded;
    }

    snapshot
}

/// Compact display form: `1.5K`, `2.5M`, or the plain integer.
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Blocked share of all requests with two decimals, `0%` when nothing was seen.
pub fn block_rate(total: u64, blocked: u64) -> String {
    if total > 0 {
        format!("{:.2}%", blocked as f64 / total as f64 * 100.0)
    } else {
        "0%".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1500), "1.5K");
        assert_eq!(format_number(2_500_000), "2.5M");
        assert_eq!(format_number(1_000), "1.0K");
    }

    #[test]
    fn test_block_rate() {
        let snapshot = normalize_stats(&json!({"total_requests": 200, "blocked_requests": 50}));
        assert_eq!(snapshot.block_rate(), "25.00%");
        assert_eq!(block_rate(0, 0), "0%");
        assert_eq!(block_rate(3, 1), "33.33%");
    }

    #[test]
    fn test_aliases_are_probed_in_order() {
        let snapshot = normalize_stats(&json!({
            "totalRequests": 10,
            "blocked_requests": null,
            "blockedRequests": 4,
            "ccAttacks": "2"
        }));
        assert_eq!(snapshot.total_requests, 10);
        assert_eq!(snapshot.blocked_requests, 4);
        assert_eq!(snapshot.cc_attacks, 2);
        assert_eq!(snapshot.blocked_ips, 0);

        let both = normalize_stats(&json!({"total_requests": 1, "totalRequests": 99}));
        assert_eq!(both.total_requests, 1);
    }

    #[test]
    fn test_missing_fields_equal_defaults() {
        let full = json!({
            "total_requests": 100,
            "blocked_requests": 10,
            "os_distribution": {"Linux": 3},
            "top_ips": [{"ip": "1.1.1.1", "count": 5}]
        });
        let normalized = normalize_stats(&full);

        for key in ["total_requests", "blocked_requests", "os_distribution", "top_ips"] {
            let mut missing = full.clone();
            missing.as_object_mut().unwrap().remove(key);

            let mut expected = normalized.clone();
            match key {
                "total_requests" => {
                    expected.total_requests = 0;
                    expected.blocked_requests = 0;
                }
                "blocked_requests" => expected.blocked_requests = 0,
                "os_distribution" => expected.os = Distribution::new(),
                _ => expected.top_ips = Distribution::new(),
            }

            assert_eq!(normalize_stats(&missing), expected, "missing {}", key);
        }

        assert_eq!(normalize_stats(&json!({})), StatsSnapshot::default());
        assert_eq!(normalize_stats(&Value::Null), StatsSnapshot::default());
        assert_eq!(normalize_stats(&json!("garbage")), StatsSnapshot::default());
    }

    #[test]
    fn test_blocked_never_exceeds_total() {
        let snapshot = normalize_stats(&json!({"total_requests": 5, "blocked_requests": 9}));
        assert_eq!(snapshot.blocked_requests, 5);
    }

    #[test]
    fn test_sequence_and_mapping_decode_identically() {
        let as_map = normalize_stats(&json!({
            "host_distribution": {"a.com": 4, "b.com": 7, "c.com": 1}
        }));
        let as_seq = normalize_stats(&json!({
            "host_distribution": [
                {"key": "a.com", "count": 4},
                {"key": "b.com", "count": 7},
                {"key": "c.com", "count": 1}
            ]
        }));
        assert_eq!(as_map, as_seq);
        assert_eq!(
            as_map.hosts.entries(),
            &[
                ("a.com".to_string(), 4),
                ("b.com".to_string(), 7),
                ("c.com".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_malformed_sequence_elements_are_skipped() {
        let dist = Distribution::decode(&json!([
            {"ip": "10.0.0.1", "count": 3},
            {"ip": "10.0.0.2"},
            "10.0.0.3",
            {"count": 8},
            {"ip": "10.0.0.4", "count": "nope"},
            {"ip": "10.0.0.5", "count": 1}
        ]));
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.get("10.0.0.1"), Some(3));
        assert_eq!(dist.get("10.0.0.5"), Some(1));
    }

    #[test]
    fn test_top_ip_truncation() {
        let items: Vec<Value> = (0..15u64)
            .map(|i| json!({"ip": format!("10.0.0.{}", i), "count": 36 + i}))
            .collect();
        let snapshot = normalize_stats(&json!({ "top_ips": items }));

        let counts: Vec<u64> = snapshot.top_ips.entries().iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, (41..=50u64).rev().collect::<Vec<_>>());
        assert!(counts.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_top_ip_ties_keep_source_order() {
        let snapshot = normalize_stats(&json!({
            "top_ips": [
                {"ip": "a", "count": 1},
                {"ip": "b", "count": 5},
                {"ip": "c", "count": 1},
                {"ip": "d", "count": 5}
            ]
        }));
        let labels: Vec<&str> = snapshot
            .top_ips
            .entries()
            .iter()
            .map(|(l, _)| l.as_str())
            .collect();
        assert_eq!(labels, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_duplicate_labels_keep_first_position() {
        let dist = Distribution::decode(&json!([
            {"key": "x", "count": 1},
            {"key": "y", "count": 2},
            {"key": "x", "count": 9}
        ]));
        assert_eq!(
            dist.entries(),
            &[("x".to_string(), 9), ("y".to_string(), 2)]
        );
    }

    #[test]
    fn test_normalizer_never_fabricates() {
        let snapshot = normalize_stats(&json!({"total_requests": 0}));
        assert!(snapshot.has_no_distributions());
    }
}
