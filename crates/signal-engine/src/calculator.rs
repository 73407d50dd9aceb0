//! Compounding trade planner.
//!
//! Each trade earns `margin%` on the running amount and the profit is
//! rolled into the next trade. Arithmetic is exact decimal.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use signal_core::SignalError;

/// Upper bound on planned trades.
pub const MAX_TRADES: u32 = 1_000;

/// Calculator inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInput {
    /// Starting capital
    pub investment: Decimal,
    /// Profit per trade, percent
    pub margin_pct: Decimal,
    /// Number of trades
    pub trades: u32,
}

impl Default for PlanInput {
    fn default() -> Self {
        Self {
            investment: dec!(1000),
            margin_pct: dec!(2.5),
            trades: 10,
        }
    }
}

impl PlanInput {
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.investment <= Decimal::ZERO {
            return Err(SignalError::Validation(
                "Investment must be greater than 0".into(),
            ));
        }
        if self.margin_pct < Decimal::ZERO {
            return Err(SignalError::Validation(
                "Profit margin cannot be negative".into(),
            ));
        }
        if self.trades > MAX_TRADES {
            return Err(SignalError::Validation(format!(
                "At most {MAX_TRADES} trades can be planned"
            )));
        }
        Ok(())
    }
}

/// One planned trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStep {
    /// 1-based trade number
    pub id: u32,
    pub starting_amount: Decimal,
    pub profit: Decimal,
    pub total: Decimal,
    pub completed: bool,
}

/// Plan totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_profit: Decimal,
    pub final_amount: Decimal,
    /// Average profit per trade; zero for an empty plan
    pub profit_per_trade: Decimal,
    pub completed: usize,
}

/// A compounding trade plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundPlan {
    input: PlanInput,
    steps: Vec<TradeStep>,
}

impl CompoundPlan {
    pub fn build(input: PlanInput) -> Result<Self, SignalError> {
        input.validate()?;

        let mut amount = input.investment;
        let mut steps = Vec::with_capacity(input.trades as usize);

        for id in 1..=input.trades {
            let profit = amount
                .checked_mul(input.margin_pct)
                .map(|p| p / dec!(100))
                .ok_or_else(|| SignalError::Validation(format!("Amount overflow at trade {id}")))?;
            let total = amount
                .checked_add(profit)
                .ok_or_else(|| SignalError::Validation(format!("Amount overflow at trade {id}")))?;

            steps.push(TradeStep {
                id,
                starting_amount: amount,
                profit,
                total,
                completed: false,
            });
            amount = total;
        }

        Ok(Self { input, steps })
    }

    pub fn input(&self) -> &PlanInput {
        &self.input
    }

    pub fn steps(&self) -> &[TradeStep] {
        &self.steps
    }

    /// Flip a trade's completed flag. Returns false for an unknown id.
    pub fn toggle(&mut self, id: u32) -> bool {
        match self.steps.iter_mut().find(|s| s.id == id) {
            Some(step) => {
                step.completed = !step.completed;
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> PlanSummary {
        let final_amount = self
            .steps
            .last()
            .map(|s| s.total)
            .unwrap_or(self.input.investment);
        let total_profit = final_amount - self.input.investment;
        let profit_per_trade = if self.steps.is_empty() {
            Decimal::ZERO
        } else {
            total_profit / Decimal::from(self.steps.len())
        };

        PlanSummary {
            total_profit,
            final_amount,
            profit_per_trade,
            completed: self.steps.iter().filter(|s| s.completed).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_trade_plan_is_exact() {
        let plan = CompoundPlan::build(PlanInput {
            investment: dec!(1000),
            margin_pct: dec!(2.5),
            trades: 2,
        })
        .unwrap();

        let steps = plan.steps();
        assert_eq!(steps[0].profit, dec!(25));
        assert_eq!(steps[0].total, dec!(1025));
        assert_eq!(steps[1].starting_amount, dec!(1025));
        assert_eq!(steps[1].profit, dec!(25.625));
        assert_eq!(steps[1].total, dec!(1050.625));

        let summary = plan.summary();
        assert_eq!(summary.total_profit, dec!(50.625));
        assert_eq!(summary.final_amount, dec!(1050.625));
        assert_eq!(summary.profit_per_trade, dec!(25.3125));
    }

    #[test]
    fn test_default_plan() {
        let plan = CompoundPlan::build(PlanInput::default()).unwrap();
        let summary = plan.summary();

        assert_eq!(plan.steps().len(), 10);
        assert_eq!(summary.final_amount.round_dp(2), dec!(1280.08));
        assert_eq!(summary.total_profit.round_dp(2), dec!(280.08));
    }

    #[test]
    fn test_empty_plan() {
        let plan = CompoundPlan::build(PlanInput {
            trades: 0,
            ..Default::default()
        })
        .unwrap();
        let summary = plan.summary();

        assert!(plan.steps().is_empty());
        assert_eq!(summary.final_amount, dec!(1000));
        assert_eq!(summary.total_profit, Decimal::ZERO);
        assert_eq!(summary.profit_per_trade, Decimal::ZERO);
    }

    #[test]
    fn test_toggle_completed() {
        let mut plan = CompoundPlan::build(PlanInput::default()).unwrap();

        assert!(plan.toggle(3));
        assert!(plan.toggle(5));
        assert_eq!(plan.summary().completed, 2);

        assert!(plan.toggle(3));
        assert_eq!(plan.summary().completed, 1);
        assert!(!plan.toggle(11));
        assert!(!plan.toggle(0));
    }

    #[test]
    fn test_invalid_inputs() {
        let zero = PlanInput {
            investment: Decimal::ZERO,
            ..Default::default()
        };
        assert!(CompoundPlan::build(zero).is_err());

        let negative_margin = PlanInput {
            margin_pct: dec!(-1),
            ..Default::default()
        };
        assert!(CompoundPlan::build(negative_margin).is_err());

        let too_many = PlanInput {
            trades: MAX_TRADES + 1,
            ..Default::default()
        };
        assert!(CompoundPlan::build(too_many).is_err());
    }
}
