use serde::{Deserialize, Serialize};

/// Where the invest scenario's monthly contribution comes from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionMode {
    /// Use `monthly_investment_contribution` as supplied.
    Fixed,
    /// Invest `abs(mortgage payment - monthly rent)` every month.
    Derived,
}

/// What counts towards the buy scenario's net worth.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetWorthPolicy {
    EquityOnly,
    /// Equity plus rental income collected to date.
    EquityWithRent,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Buy,
    Invest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub initial_house_price: f64,
    pub down_payment: f64,
    pub mortgage_annual_rate_percent: f64,
    pub monthly_rent: f64,
    pub house_annual_appreciation_percent: f64,
    pub initial_investment: f64,
    pub investment_annual_rate_percent: f64,
    pub monthly_investment_contribution: f64,
    pub term_years: u32,
    pub contribution_mode: ContributionMode,
    pub net_worth_policy: NetWorthPolicy,
}

impl ProjectionInput {
    pub fn months(&self) -> u32 {
        self.term_years * 12
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyState {
    pub month_index: u32,
    pub payment: f64,
    pub mortgage_balance: f64,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub house_value: f64,
    pub investment_value: f64,
    pub rental_income_to_date: f64,
    pub buy_net_worth: f64,
    pub invest_net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub months: u32,
    pub loan_principal: f64,
    pub monthly_mortgage_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub final_mortgage_balance: f64,
    pub final_house_value: f64,
    pub final_equity: f64,
    pub total_rental_income: f64,
    pub monthly_investment_contribution: f64,
    pub final_investment_value: f64,
    pub total_contribution: f64,
    pub total_growth: f64,
    pub final_buy_net_worth: f64,
    pub final_invest_net_worth: f64,
    /// `final_invest_net_worth - final_buy_net_worth`; positive favours investing.
    pub comparison: f64,
    pub preferred: Scenario,
    pub monthly: Vec<MonthlyState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year: u32,
    pub month: u32,
    pub buy_net_worth: f64,
    pub invest_net_worth: f64,
    pub difference: f64,
}
