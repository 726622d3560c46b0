mod amortization;
mod error;
pub mod ledger;
pub mod profile;
mod projection;
mod rates;
mod rollup;
pub mod tax;
mod types;

pub use amortization::{
    AmortizationRow, AmortizationSchedule, MIN_DOWN_PAYMENT_RATIO, amortization_schedule,
    check_down_payment, fixed_monthly_payment, loan_principal,
};
pub use error::{LedgerError, ProfileError, ProjectionError, TaxError};
pub use projection::{
    MAX_TERM_YEARS, compare_net_worth, derived_contribution, project, project_house_value,
    project_investment,
};
pub use rates::monthly_rate;
pub use rollup::yearly_rollup;
pub use types::{
    ContributionMode, MonthlyState, NetWorthPolicy, ProjectionInput, ProjectionResult, Scenario,
    YearlySnapshot,
};
