// ── Scan accumulator ──
//
// Per-product counters for every bucket of a session, keyed by
// `(bucket, product_id)`. Lines of one bucket iterate in first-scan order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{Bucket, Catalog};

/// One product's count within a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketLine {
    pub product_id: String,
    pub display_name: String,
    pub count: u32,
}

/// Result of feeding one raw value to [`Accumulator::accept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The product was found and its counter incremented.
    Accepted {
        bucket: Bucket,
        product_id: String,
        display_name: String,
        /// Count after the increment.
        count: u32,
    },
    /// The code is not in the catalog. No counter changed.
    Rejected { code: String },
    /// Blank input. No counter changed.
    Ignored,
}

impl ScanOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    counts: IndexMap<(Bucket, String), u32>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `raw` against `catalog` and count it into `bucket`.
    ///
    /// The value is trimmed first. Each accepted call adds exactly one.
    pub fn accept(&mut self, bucket: Bucket, catalog: &Catalog, raw: &str) -> ScanOutcome {
        let code = raw.trim();
        if code.is_empty() {
            return ScanOutcome::Ignored;
        }

        let Ok(product) = catalog.require(code) else {
            return ScanOutcome::Rejected {
                code: code.to_owned(),
            };
        };

        let count = self
            .counts
            .entry((bucket, product.product_id.clone()))
            .or_insert(0);
        *count = count.saturating_add(1);

        ScanOutcome::Accepted {
            bucket,
            product_id: product.product_id.clone(),
            display_name: product.display_name.clone(),
            count: *count,
        }
    }

    pub fn count(&self, bucket: Bucket, product_id: &str) -> u32 {
        self.counts
            .get(&(bucket, product_id.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// `(product_id, count)` pairs of one bucket in first-scan order.
    pub fn counts(&self, bucket: Bucket) -> impl Iterator<Item = (&str, u32)> {
        self.counts
            .iter()
            .filter(move |((b, _), _)| *b == bucket)
            .map(|((_, id), count)| (id.as_str(), *count))
    }

    /// Lines of one bucket with display names resolved against `catalog`.
    pub fn lines(&self, bucket: Bucket, catalog: &Catalog) -> Vec<BucketLine> {
        self.counts(bucket)
            .map(|(id, count)| BucketLine {
                product_id: id.to_owned(),
                display_name: catalog.display_name(id),
                count,
            })
            .collect()
    }

    pub fn is_empty(&self, bucket: Bucket) -> bool {
        self.counts(bucket).next().is_none()
    }

    /// Sum of all counts in a bucket.
    pub fn total(&self, bucket: Bucket) -> u64 {
        self.counts(bucket).map(|(_, c)| u64::from(c)).sum()
    }

    /// Empty one bucket, leaving the others untouched.
    pub fn clear(&mut self, bucket: Bucket) {
        self.counts.retain(|(b, _), _| *b != bucket);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Product;

    fn catalog() -> Catalog {
        ["A1", "B2", "C3"]
            .into_iter()
            .map(|id| Product {
                product_id: id.into(),
                display_name: format!("Widget {id}"),
                stock: 10,
                daily_transactions: 0,
            })
            .collect()
    }

    #[test]
    fn accepted_code_increments_by_one() {
        let catalog = catalog();
        let mut acc = Accumulator::new();

        let outcome = acc.accept(Bucket::Entries, &catalog, "A1");
        assert_eq!(
            outcome,
            ScanOutcome::Accepted {
                bucket: Bucket::Entries,
                product_id: "A1".into(),
                display_name: "Widget A1".into(),
                count: 1,
            }
        );

        for expected in 2..=5 {
            acc.accept(Bucket::Entries, &catalog, "A1");
            assert_eq!(acc.count(Bucket::Entries, "A1"), expected);
        }
    }

    #[test]
    fn unknown_codes_change_nothing() {
        let catalog = catalog();
        let mut acc = Accumulator::new();
        acc.accept(Bucket::Entries, &catalog, "A1");
        acc.accept(Bucket::Exits, &catalog, "B2");

        for code in ["Z9", "a1", "A1B2", "ProductID"] {
            let outcome = acc.accept(Bucket::Entries, &catalog, code);
            assert_eq!(outcome, ScanOutcome::Rejected { code: code.into() });
        }

        assert_eq!(acc.counts(Bucket::Entries).collect::<Vec<_>>(), [("A1", 1)]);
        assert_eq!(acc.counts(Bucket::Exits).collect::<Vec<_>>(), [("B2", 1)]);
    }

    #[test]
    fn input_is_trimmed_and_blank_is_ignored() {
        let catalog = catalog();
        let mut acc = Accumulator::new();

        assert_eq!(acc.accept(Bucket::Exits, &catalog, "   "), ScanOutcome::Ignored);
        assert!(acc.accept(Bucket::Exits, &catalog, " C3\n").is_accepted());
        assert_eq!(acc.count(Bucket::Exits, "C3"), 1);
    }

    #[test]
    fn buckets_are_independent() {
        let catalog = catalog();
        let mut acc = Accumulator::new();
        acc.accept(Bucket::Entries, &catalog, "A1");
        acc.accept(Bucket::Entries, &catalog, "A1");
        acc.accept(Bucket::Exits, &catalog, "A1");

        assert_eq!(acc.count(Bucket::Entries, "A1"), 2);
        assert_eq!(acc.count(Bucket::Exits, "A1"), 1);

        acc.clear(Bucket::Entries);
        assert!(acc.is_empty(Bucket::Entries));
        assert_eq!(acc.count(Bucket::Exits, "A1"), 1);
    }

    #[test]
    fn lines_follow_first_scan_order() {
        let catalog = catalog();
        let mut acc = Accumulator::new();
        for code in ["C3", "A1", "C3", "B2", "A1", "C3"] {
            acc.accept(Bucket::Validated, &catalog, code);
        }

        let lines = acc.lines(Bucket::Validated, &catalog);
        let got: Vec<_> = lines
            .iter()
            .map(|l| (l.product_id.as_str(), l.count))
            .collect();
        assert_eq!(got, [("C3", 3), ("A1", 2), ("B2", 1)]);
        assert_eq!(acc.total(Bucket::Validated), 6);
    }
}
