use std::collections::HashMap;

use crate::process::listing::Listing;

/// Employer name → number of listings posted under it.
///
/// Listings without an employer are not counted, so they never qualify as
/// low-frequency.
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    counts: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn from_listings(listings: &[Listing]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for employer in listings.iter().filter_map(Listing::employer) {
            *counts.entry(employer.to_string()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, employer: Option<&str>) -> Option<usize> {
        employer.and_then(|e| self.counts.get(e).copied())
    }

    /// True when the employer is known and posted at most `threshold` times.
    pub fn is_low_frequency(&self, employer: Option<&str>, threshold: usize) -> bool {
        matches!(self.count(employer), Some(n) if n <= threshold)
    }

    /// Number of distinct employers.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent employers, highest count first, ties by name.
    pub fn most_frequent(&self, n: usize) -> Vec<(&str, usize)> {
        let mut all: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        all.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        all.truncate(n);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn listing(employer: Option<&str>) -> Listing {
        Listing {
            line: 1,
            employer: employer.map(str::to_string),
            posted_at: NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            fields: vec![employer.unwrap_or("").to_string()],
        }
    }

    #[test]
    fn counts_exact_names() {
        let rows = vec![
            listing(Some("Acme")),
            listing(Some("Acme")),
            listing(Some("acme")),
            listing(None),
        ];
        let freq = FrequencyTable::from_listings(&rows);
        assert_eq!(freq.len(), 2);
        assert_eq!(freq.count(Some("Acme")), Some(2));
        assert_eq!(freq.count(Some("acme")), Some(1));
        assert_eq!(freq.count(None), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let rows: Vec<Listing> = (0..5).map(|_| listing(Some("Five"))).collect();
        let freq = FrequencyTable::from_listings(&rows);
        assert!(freq.is_low_frequency(Some("Five"), 5));
        assert!(!freq.is_low_frequency(Some("Five"), 4));
        assert!(!freq.is_low_frequency(None, 5));
        assert!(!freq.is_low_frequency(Some("Unknown"), 5));
    }

    #[test]
    fn most_frequent_orders_by_count_then_name() {
        let mut rows = vec![listing(Some("B")), listing(Some("A"))];
        rows.extend((0..3).map(|_| listing(Some("C"))));
        let freq = FrequencyTable::from_listings(&rows);
        assert_eq!(freq.most_frequent(2), vec![("C", 3), ("A", 1)]);
    }
}
