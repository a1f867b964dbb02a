use rust_decimal::Decimal;
use serde::Serialize;

use crate::server::billing::calculator::round_currency;

/// Simulated earnings credited per completed or scheduled waste pickup.
pub(crate) const EARNINGS_PER_PICKUP: i64 = 250;

/// Raw aggregates read from storage for the summary report.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SummaryCounts {
    pub total_revenue: Decimal,
    pub total_transactions: i64,
    pub verified_transactions: i64,
    pub total_bills: i64,
    pub total_pickups: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Summary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_transactions: i64,
    /// percent of verified payments, 2 dp
    #[serde(with = "rust_decimal::serde::float")]
    pub success_rate: Decimal,
    pub total_bills: i64,
    pub waste_earnings: i64,
}

impl From<SummaryCounts> for Summary {
    fn from(counts: SummaryCounts) -> Self {
        let success_rate = if counts.total_transactions > 0 {
            round_currency(
                Decimal::from(counts.verified_transactions) * Decimal::ONE_HUNDRED
                    / Decimal::from(counts.total_transactions),
            )
        } else {
            Decimal::ZERO
        };
        Self {
            total_revenue: counts.total_revenue,
            total_transactions: counts.total_transactions,
            success_rate,
            total_bills: counts.total_bills,
            waste_earnings: counts.total_pickups * EARNINGS_PER_PICKUP,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct DashboardStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub today_revenue: Decimal,
    pub today_transactions: i64,
    /// 0 < stock < 5
    pub low_stock_items: i64,
    pub out_of_stock_items: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn success_rate_is_rounded_percentage() {
        let summary = Summary::from(SummaryCounts {
            total_revenue: Decimal::from(1180),
            total_transactions: 6,
            verified_transactions: 4,
            total_bills: 3,
            total_pickups: 4,
        });
        assert_eq!(summary.success_rate, Decimal::from_str("66.67").unwrap());
        assert_eq!(summary.waste_earnings, 1000);
        assert_eq!(summary.total_revenue, Decimal::from(1180));
    }

    #[test]
    fn no_payments_means_zero_rate() {
        let summary = Summary::from(SummaryCounts::default());
        assert!(summary.success_rate.is_zero());
        assert_eq!(summary.waste_earnings, 0);
    }

    #[test]
    fn serializes_amounts_as_numbers() {
        let summary = Summary::from(SummaryCounts {
            total_revenue: Decimal::from_str("54988.00").unwrap(),
            total_transactions: 2,
            verified_transactions: 1,
            total_bills: 1,
            total_pickups: 0,
        });
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_revenue"], serde_json::json!(54988.0));
        assert_eq!(json["success_rate"], serde_json::json!(50.0));
    }
}
