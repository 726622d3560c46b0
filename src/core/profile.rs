use serde::{Deserialize, Serialize};

use super::error::ProfileError;

/// A user's standing monthly figures and yearly savings goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub phone: Option<String>,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub savings: f64,
    pub monthly_investment: f64,
    pub other_assets: f64,
    pub liabilities: f64,
    pub yearly_savings_goal: f64,
}

/// Partial update; only the keys present are changed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub phone: Option<String>,
    pub monthly_income: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub savings: Option<f64>,
    pub monthly_investment: Option<f64>,
    pub other_assets: Option<f64>,
    pub liabilities: Option<f64>,
    pub yearly_savings_goal: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub monthly_surplus: f64,
    pub projected_yearly_savings: f64,
    /// `None` when no goal is set.
    pub goal_progress: Option<f64>,
    pub on_track: bool,
    pub net_worth: f64,
}

impl Profile {
    /// Validates every amount in `update` before touching `self`, so a rejected
    /// update leaves the profile unchanged.
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<(), ProfileError> {
        let amounts = [
            ("monthlyIncome", update.monthly_income),
            ("monthlyExpenses", update.monthly_expenses),
            ("savings", update.savings),
            ("monthlyInvestment", update.monthly_investment),
            ("otherAssets", update.other_assets),
            ("liabilities", update.liabilities),
            ("yearlySavingsGoal", update.yearly_savings_goal),
        ];
        for (name, value) in amounts {
            if value.is_some_and(|value| !value.is_finite() || value < 0.0) {
                return Err(ProfileError::InvalidInput(format!(
                    "{name} must be a finite number >= 0"
                )));
            }
        }

        if let Some(phone) = update.phone {
            let phone = phone.trim();
            self.phone = (!phone.is_empty()).then(|| phone.to_string());
        }
        let fields = [
            (&mut self.monthly_income, update.monthly_income),
            (&mut self.monthly_expenses, update.monthly_expenses),
            (&mut self.savings, update.savings),
            (&mut self.monthly_investment, update.monthly_investment),
            (&mut self.other_assets, update.other_assets),
            (&mut self.liabilities, update.liabilities),
            (&mut self.yearly_savings_goal, update.yearly_savings_goal),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
        Ok(())
    }

    pub fn goal_progress(&self) -> GoalProgress {
        let monthly_surplus = self.monthly_income - self.monthly_expenses;
        let projected_yearly_savings = monthly_surplus * 12.0;
        let goal_progress = (self.yearly_savings_goal > 0.0)
            .then(|| projected_yearly_savings / self.yearly_savings_goal);
        GoalProgress {
            monthly_surplus,
            projected_yearly_savings,
            goal_progress,
            on_track: goal_progress.is_none_or(|ratio| ratio >= 1.0),
            net_worth: self.savings + self.other_assets - self.liabilities,
        }
    }
}
