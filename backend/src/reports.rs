//! Revenue aggregation over sale records.
//!
//! Plain synchronous arithmetic: fold sale rows into per-day or per-month
//! totals keyed by the sale date. Rows whose date or total cannot be parsed
//! are skipped and counted, not errors: exports routinely carry rows typed
//! as text.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{FieldValue, Record};

/// One aggregated revenue bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBucket {
    /// Period key: `YYYY-MM-DD` for days, `YYYY-MM` for months.
    pub period: String,
    /// Summed sale totals for the period.
    pub total: f64,
    /// Number of sales in the period.
    pub sales: usize,
}

/// Sum sale totals per calendar day, ordered by date.
///
/// Returns the buckets and the number of rows skipped as unparseable.
pub fn revenue_by_day(sales: &[Record]) -> (Vec<RevenueBucket>, usize) {
    aggregate(sales, |date| date.format("%Y-%m-%d").to_string())
}

/// Sum sale totals per calendar month, ordered by month.
pub fn revenue_by_month(sales: &[Record]) -> (Vec<RevenueBucket>, usize) {
    aggregate(sales, |date| date.format("%Y-%m").to_string())
}

fn aggregate<K>(sales: &[Record], key: K) -> (Vec<RevenueBucket>, usize)
where
    K: Fn(NaiveDate) -> String,
{
    let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut skipped = 0;

    for record in sales {
        match sale_parts(record) {
            Some((date, total)) => {
                let entry = buckets.entry(key(date)).or_default();
                entry.0 += total;
                entry.1 += 1;
            }
            None => skipped += 1,
        }
    }

    let buckets = buckets
        .into_iter()
        .map(|(period, (total, sales))| RevenueBucket {
            period,
            total,
            sales,
        })
        .collect();

    (buckets, skipped)
}

/// Extract (date, total) from a sale record, in either typed or text form.
fn sale_parts(record: &Record) -> Option<(NaiveDate, f64)> {
    let date = match record.get("date")? {
        FieldValue::Date(d) => *d,
        FieldValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?,
        _ => return None,
    };
    let total = match record.get("total")? {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some((date, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(date: &str, total: &str) -> Record {
        let mut record = Record::new();
        record.set("date", date.into());
        record.set("total", total.into());
        record
    }

    #[test]
    fn test_revenue_by_day() {
        let sales = vec![
            sale("2026-08-07", "45.50"),
            sale("2026-08-07", "30"),
            sale("2026-08-06", "12"),
        ];
        let (buckets, skipped) = revenue_by_day(&sales);

        assert_eq!(skipped, 0);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period, "2026-08-06");
        assert_eq!(buckets[0].total, 12.0);
        assert_eq!(buckets[1].period, "2026-08-07");
        assert_eq!(buckets[1].total, 75.5);
        assert_eq!(buckets[1].sales, 2);
    }

    #[test]
    fn test_revenue_by_month() {
        let sales = vec![
            sale("2026-07-30", "100"),
            sale("2026-08-01", "50"),
            sale("2026-08-15", "25"),
        ];
        let (buckets, _) = revenue_by_month(&sales);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period, "2026-07");
        assert_eq!(buckets[0].total, 100.0);
        assert_eq!(buckets[1].period, "2026-08");
        assert_eq!(buckets[1].total, 75.0);
    }

    #[test]
    fn test_unparseable_rows_are_skipped() {
        let sales = vec![
            sale("2026-08-07", "45"),
            sale("last tuesday", "45"),
            sale("2026-08-07", "a lot"),
            Record::new(),
        ];
        let (buckets, skipped) = revenue_by_day(&sales);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].sales, 1);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_typed_fields_also_aggregate() {
        let mut record = Record::new();
        record.set(
            "date",
            FieldValue::Date(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()),
        );
        record.set("total", FieldValue::Number(19.5));

        let (buckets, skipped) = revenue_by_day(&[record]);
        assert_eq!(skipped, 0);
        assert_eq!(buckets[0].total, 19.5);
    }
}
