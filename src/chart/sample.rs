//! Fixed illustrative datasets for an entirely empty dashboard.
//!
//! These numbers are not measurements. Charts built from them carry
//! `DataOrigin::Sample` and a "sample data" title.

use crate::normalize::{Distribution, DistributionKind};

pub fn dataset(target: DistributionKind) -> Distribution {
    let pairs: &[(&str, u64)] = match target {
        DistributionKind::AttackTypes => &[
            ("SQL Injection", 45),
            ("XSS", 30),
            ("Path Traversal", 15),
            ("Command Injection", 10),
        ],
        DistributionKind::Os => &[
            ("Windows", 40),
            ("Linux", 30),
            ("macOS", 20),
            ("Android", 10),
        ],
        DistributionKind::Hosts => &[
            ("www.example.com", 60),
            ("api.example.com", 30),
            ("static.example.com", 10),
        ],
        DistributionKind::StatusCodes => &[("200", 80), ("403", 12), ("404", 6), ("500", 2)],
        DistributionKind::TopIps => &[
            ("192.0.2.10", 50),
            ("198.51.100.7", 35),
            ("203.0.113.42", 20),
        ],
    };

    Distribution::from_pairs(pairs.iter().map(|(label, count)| (label.to_string(), *count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_target_has_sample_data() {
        for target in DistributionKind::ALL {
            assert!(!dataset(target).is_empty(), "{:?}", target);
        }
    }

    #[test]
    fn test_top_ip_sample_is_sorted() {
        let counts: Vec<u64> = dataset(DistributionKind::TopIps)
            .entries()
            .iter()
            .map(|(_, c)| *c)
            .collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }
}
