//! Seat cost estimates

use serde::{Deserialize, Serialize};

use crate::model::{ConfidenceVerdict, SeatCostEstimate, User};

/// Seat pricing used to turn verdicts into money
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModel {
    /// Price of one seat per month, in whole currency units
    #[serde(default = "default_seat_price")]
    pub seat_price: u64,

    /// Symbol prefixed to amounts in reports
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Scores at or above this are costed as removable seats
    #[serde(default = "default_removal_score")]
    pub removal_score: u8,
}

fn default_seat_price() -> u64 {
    75
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_removal_score() -> u8 {
    70
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            seat_price: default_seat_price(),
            currency: default_currency(),
            removal_score: default_removal_score(),
        }
    }
}

impl CostModel {
    /// Monthly and annual cost of the seat behind a verdict
    pub fn cost(&self, verdict: &ConfidenceVerdict) -> (u64, u64) {
        let monthly = if verdict.score >= self.removal_score {
            self.seat_price
        } else {
            0
        };
        (monthly, monthly.saturating_mul(12))
    }

    pub fn estimate(&self, user: User, verdict: ConfidenceVerdict) -> SeatCostEstimate {
        let (monthly_cost, annual_cost) = self.cost(&verdict);
        SeatCostEstimate {
            user,
            verdict,
            monthly_cost,
            annual_cost,
        }
    }

    /// Amount with the currency symbol, thousands separated
    pub fn format(&self, amount: u64) -> String {
        let digits = amount.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{}{}", self.currency, grouped)
    }
}
