use serde::Serialize;

use crate::config::SplitPolicy;

/// Two bottle IDs that share one physical sticker. `None` is a blank slot.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Default)]
pub struct LabelPair {
    pub left: Option<String>,
    pub right: Option<String>,
}

/// The stickers of one print job, in print order
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Default)]
pub struct LabelBatch {
    pub pairs: Vec<LabelPair>,
}

impl LabelPair {
    pub fn new(left: Option<&str>, right: Option<&str>) -> Self {
        LabelPair {
            left: left.map(|s| s.to_string()),
            right: right.map(|s| s.to_string()),
        }
    }
}

impl LabelBatch {
    /// Halve `ids` and zip both halves into label pairs.
    ///
    /// With `Ceil` the first half is the longer one, so on odd counts the last
    /// pair has a blank right slot. With `Floor` both halves have the same
    /// length and the odd leftover is printed alone on a trailing sticker, in
    /// the right slot. Either way there are `ceil(n/2)` pairs.
    pub fn split<T: AsRef<str>>(ids: &[T], policy: SplitPolicy) -> Self {
        let n = ids.len();
        let mut pairs = Vec::with_capacity((n + 1) / 2);

        match policy {
            SplitPolicy::Ceil => {
                let half = (n + 1) / 2;
                for i in 0..half {
                    pairs.push(LabelPair::new(
                        Some(ids[i].as_ref()),
                        ids.get(half + i).map(|s| s.as_ref()),
                    ));
                }
            }
            SplitPolicy::Floor => {
                let mid = n / 2;
                for i in 0..mid {
                    pairs.push(LabelPair::new(Some(ids[i].as_ref()), Some(ids[mid + i].as_ref())));
                }
                if n % 2 != 0 {
                    pairs.push(LabelPair::new(None, Some(ids[n - 1].as_ref())));
                }
            }
        }

        LabelBatch { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| (1000 + i).to_string()).collect()
    }

    #[test]
    fn ceil_pairs_first_and_second_half() {
        let batch = LabelBatch::split(&["1001", "1002", "1003", "1004"], SplitPolicy::Ceil);
        assert_eq!(batch.pairs, vec![
            LabelPair::new(Some("1001"), Some("1003")),
            LabelPair::new(Some("1002"), Some("1004")),
        ]);
    }

    #[test]
    fn ceil_odd_leaves_last_right_slot_blank() {
        let batch = LabelBatch::split(&["1001", "1002", "1003"], SplitPolicy::Ceil);
        assert_eq!(batch.pairs, vec![
            LabelPair::new(Some("1001"), Some("1003")),
            LabelPair::new(Some("1002"), None),
        ]);
        assert_eq!(batch.pairs.iter().filter(|p| p.right.is_none()).count(), 1);
    }

    #[test]
    fn floor_odd_adds_trailing_single() {
        let batch = LabelBatch::split(&["1001", "1002", "1003", "1004", "1005"], SplitPolicy::Floor);
        assert_eq!(batch.pairs, vec![
            LabelPair::new(Some("1001"), Some("1003")),
            LabelPair::new(Some("1002"), Some("1004")),
            LabelPair::new(None, Some("1005")),
        ]);
    }

    #[test]
    fn pair_count_is_half_rounded_up() {
        for n in 0..12 {
            for policy in [SplitPolicy::Ceil, SplitPolicy::Floor].iter() {
                let batch = LabelBatch::split(&ids(n), *policy);
                assert_eq!(batch.len(), (n + 1) / 2, "n={} policy={}", n, policy);
            }
            let ceil = LabelBatch::split(&ids(n), SplitPolicy::Ceil);
            if let Some(last) = ceil.pairs.last() {
                assert_eq!(last.right.is_none(), n % 2 == 1);
            }
        }
    }

    #[test]
    fn keeps_every_id_exactly_once() {
        let input = ids(7);
        for policy in [SplitPolicy::Ceil, SplitPolicy::Floor].iter() {
            let batch = LabelBatch::split(&input, *policy);
            let mut seen: Vec<String> = batch.pairs.iter()
                .flat_map(|p| p.left.iter().chain(p.right.iter()).cloned())
                .collect();
            seen.sort();
            assert_eq!(seen, input);
        }
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(LabelBatch::split::<String>(&[], SplitPolicy::Ceil).is_empty());
        assert!(LabelBatch::split::<String>(&[], SplitPolicy::Floor).is_empty());
    }
}
