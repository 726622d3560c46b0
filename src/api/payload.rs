use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::core::{
    ContributionMode, NetWorthPolicy, ProjectionInput, ProjectionResult, YearlySnapshot,
    yearly_rollup,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CliContributionMode {
    Fixed,
    Derived,
}

impl From<CliContributionMode> for ContributionMode {
    fn from(value: CliContributionMode) -> Self {
        match value {
            CliContributionMode::Fixed => ContributionMode::Fixed,
            CliContributionMode::Derived => ContributionMode::Derived,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CliNetWorthPolicy {
    EquityOnly,
    EquityWithRent,
}

impl From<CliNetWorthPolicy> for NetWorthPolicy {
    fn from(value: CliNetWorthPolicy) -> Self {
        match value {
            CliNetWorthPolicy::EquityOnly => NetWorthPolicy::EquityOnly,
            CliNetWorthPolicy::EquityWithRent => NetWorthPolicy::EquityWithRent,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ApiContributionMode {
    #[serde(alias = "constant", alias = "explicit")]
    Fixed,
    #[serde(alias = "mortgageMinusRent", alias = "mortgage-minus-rent")]
    Derived,
}

impl From<ApiContributionMode> for CliContributionMode {
    fn from(value: ApiContributionMode) -> Self {
        match value {
            ApiContributionMode::Fixed => CliContributionMode::Fixed,
            ApiContributionMode::Derived => CliContributionMode::Derived,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ApiNetWorthPolicy {
    #[serde(alias = "equityOnly", alias = "equity_only", alias = "equity")]
    EquityOnly,
    #[serde(alias = "equityWithRent", alias = "equity_with_rent")]
    EquityWithRent,
}

impl From<ApiNetWorthPolicy> for CliNetWorthPolicy {
    fn from(value: ApiNetWorthPolicy) -> Self {
        match value {
            ApiNetWorthPolicy::EquityOnly => CliNetWorthPolicy::EquityOnly,
            ApiNetWorthPolicy::EquityWithRent => CliNetWorthPolicy::EquityWithRent,
        }
    }
}

/// Web form keys. Every field must be present; unknown keys are rejected so a
/// misspelled field can never fall back to some other value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct ProjectionPayload {
    initial_house_price: Option<f64>,
    down_payment: Option<f64>,
    #[serde(alias = "mortgageAnnualRatePercent")]
    mortgage_rate: Option<f64>,
    monthly_rent: Option<f64>,
    #[serde(alias = "houseAnnualAppreciationPercent")]
    house_appreciation_rate: Option<f64>,
    initial_investment: Option<f64>,
    #[serde(alias = "investmentAnnualRatePercent")]
    investment_rate: Option<f64>,
    #[serde(alias = "monthlyInvestmentContribution")]
    monthly_contribution: Option<f64>,
    #[serde(alias = "termYears")]
    years: Option<u32>,
    contribution_mode: Option<ApiContributionMode>,
    net_worth_policy: Option<ApiNetWorthPolicy>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ProjectArgs {
    #[arg(long, help = "Purchase price of the house")]
    pub(crate) initial_house_price: f64,
    #[arg(long, help = "Down payment; must be at least 25% of the house price")]
    pub(crate) down_payment: f64,
    #[arg(long, help = "Annual mortgage rate in percent, e.g. 4.5")]
    pub(crate) mortgage_rate: f64,
    #[arg(long, help = "Monthly rental income from the house")]
    pub(crate) monthly_rent: f64,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Annual house appreciation in percent; negative for depreciation"
    )]
    pub(crate) house_appreciation_rate: f64,
    #[arg(long, help = "Amount invested at month 0")]
    pub(crate) initial_investment: f64,
    #[arg(long, help = "Annual investment return in percent")]
    pub(crate) investment_rate: f64,
    #[arg(long, help = "Monthly investment, used when --contribution-mode=fixed")]
    pub(crate) monthly_contribution: f64,
    #[arg(long, help = "Mortgage and projection term in years (1-50)")]
    pub(crate) years: u32,
    #[arg(
        long,
        value_enum,
        help = "fixed: invest --monthly-contribution; derived: invest |mortgage payment - rent|"
    )]
    pub(crate) contribution_mode: CliContributionMode,
    #[arg(
        long,
        value_enum,
        help = "Whether collected rent counts towards the buy scenario's net worth"
    )]
    pub(crate) net_worth_policy: CliNetWorthPolicy,
}

impl From<ProjectArgs> for ProjectionInput {
    fn from(args: ProjectArgs) -> Self {
        ProjectionInput {
            initial_house_price: args.initial_house_price,
            down_payment: args.down_payment,
            mortgage_annual_rate_percent: args.mortgage_rate,
            monthly_rent: args.monthly_rent,
            house_annual_appreciation_percent: args.house_appreciation_rate,
            initial_investment: args.initial_investment,
            investment_annual_rate_percent: args.investment_rate,
            monthly_investment_contribution: args.monthly_contribution,
            term_years: args.years,
            contribution_mode: args.contribution_mode.into(),
            net_worth_policy: args.net_worth_policy.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectionResponse {
    pub(crate) input: ProjectionInput,
    #[serde(flatten)]
    pub(crate) result: ProjectionResult,
    pub(crate) yearly: Vec<YearlySnapshot>,
}

pub(crate) fn build_projection_response(
    input: ProjectionInput,
    result: ProjectionResult,
) -> ProjectionResponse {
    let yearly = yearly_rollup(&result.monthly, input.term_years);
    ProjectionResponse {
        input,
        result,
        yearly,
    }
}

#[cfg(test)]
pub(crate) fn api_input_from_json(json: &str) -> Result<ProjectionInput, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_input_from_payload(payload)
}

pub(crate) fn api_input_from_payload(
    payload: ProjectionPayload,
) -> Result<ProjectionInput, String> {
    let contribution_mode: ApiContributionMode =
        required(payload.contribution_mode, "contributionMode (fixed or derived)")?;
    let net_worth_policy: ApiNetWorthPolicy = required(
        payload.net_worth_policy,
        "netWorthPolicy (equity-only or equity-with-rent)",
    )?;

    let args = ProjectArgs {
        initial_house_price: required(payload.initial_house_price, "initialHousePrice")?,
        down_payment: required(payload.down_payment, "downPayment")?,
        mortgage_rate: required(payload.mortgage_rate, "mortgageRate")?,
        monthly_rent: required(payload.monthly_rent, "monthlyRent")?,
        house_appreciation_rate: required(
            payload.house_appreciation_rate,
            "houseAppreciationRate",
        )?,
        initial_investment: required(payload.initial_investment, "initialInvestment")?,
        investment_rate: required(payload.investment_rate, "investmentRate")?,
        monthly_contribution: required(payload.monthly_contribution, "monthlyContribution")?,
        years: required(payload.years, "years")?,
        contribution_mode: contribution_mode.into(),
        net_worth_policy: net_worth_policy.into(),
    };

    Ok(args.into())
}

fn required<T>(value: Option<T>, key: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{key} is required"))
}
