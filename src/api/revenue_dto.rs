use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RevenueRequestDto {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub sector: String,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct RevenueDto {
    pub amount: f64,
    pub currency: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_plain_date() {
        let request = RevenueRequestDto { date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(), sector: "A".to_string() };

        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"date":"2025-03-07","sector":"A"}"#);
    }

    #[test]
    fn test_parses_revenue() {
        let dto: RevenueDto = serde_json::from_str(r#"{"amount": 1520.5, "currency": "BRL", "timestamp": "2025-03-07T12:00:00"}"#).unwrap();
        assert_eq!(dto.currency, "BRL");
        assert_eq!(dto.amount, 1520.5);
    }
}
