use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use serde::Serialize;

pub const CURRENCY: &str = "BRL";
pub const PROJECTION_MONTHS: u32 = 12;

const BASE_MIN: f64 = 1_000.0;
const BASE_MAX: f64 = 3_000.0;
const WEEKEND_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueHistoryEntry {
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub sector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueProjectionEntry {
    pub month: u32,
    pub amount: f64,
    pub currency: String,
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Synthetic daily revenue for every day in `[start, end)`; weekends earn 30% less.
pub fn revenue_history<R: Rng>(start: NaiveDate, end: NaiveDate, sector: &str, rng: &mut R) -> Vec<RevenueHistoryEntry> {
    start
        .iter_days()
        .take_while(|date| *date < end)
        .map(|date| {
            let base = rng.random_range(BASE_MIN..BASE_MAX);
            let factor = if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) { WEEKEND_FACTOR } else { 1.0 };
            RevenueHistoryEntry { date, amount: round_cents(base * factor), currency: CURRENCY.to_string(), sector: sector.to_string() }
        })
        .collect()
}

/// Compounds `base_amount` monthly for a year.
pub fn revenue_projection(base_amount: f64, growth_rate: f64) -> Vec<RevenueProjectionEntry> {
    (1..=PROJECTION_MONTHS)
        .map(|month| RevenueProjectionEntry {
            month,
            amount: round_cents(base_amount * (1.0 + growth_rate).powi(month as i32)),
            currency: CURRENCY.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_one_entry_per_day() {
        let history = revenue_history(day(2025, 1, 1), day(2025, 1, 8), "B", &mut StdRng::seed_from_u64(3));

        assert_eq!(history.len(), 7);
        assert_eq!(history[0].date, day(2025, 1, 1));
        assert_eq!(history[6].date, day(2025, 1, 7));
        assert!(history.iter().all(|e| e.sector == "B" && e.currency == "BRL"));
    }

    #[test]
    fn test_weekend_discount_and_cents() {
        // 2025-01-04 and 2025-01-05 fall on a weekend.
        let history = revenue_history(day(2025, 1, 1), day(2025, 3, 1), "A", &mut StdRng::seed_from_u64(9));

        for entry in history {
            let weekend = matches!(entry.date.weekday(), Weekday::Sat | Weekday::Sun);
            let (lo, hi) = if weekend { (700.0, 2_100.0) } else { (1_000.0, 3_000.0) };
            assert!(entry.amount >= lo && entry.amount <= hi, "{} out of range on {}", entry.amount, entry.date);
            assert_eq!(round_cents(entry.amount), entry.amount);
        }
    }

    #[test]
    fn test_empty_range() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(revenue_history(day(2025, 1, 8), day(2025, 1, 8), "A", &mut rng).is_empty());
        assert!(revenue_history(day(2025, 1, 9), day(2025, 1, 8), "A", &mut rng).is_empty());
    }

    #[test]
    fn test_projection_compounds_monthly() {
        let projection = revenue_projection(1_000.0, 0.1);

        assert_eq!(projection.len(), 12);
        assert_eq!(projection[0].month, 1);
        assert_eq!(projection[0].amount, 1_100.0);
        assert_eq!(projection[1].amount, 1_210.0);
        assert_eq!(projection[11].amount, 3_138.43);
    }

    #[test]
    fn test_zero_growth_is_flat() {
        assert!(revenue_projection(250.5, 0.0).iter().all(|e| e.amount == 250.5));
    }
}
