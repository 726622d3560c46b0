use super::types::{MonthlyState, YearlySnapshot};

/// Samples the monthly series at each year end for reporting.
///
/// The sampled month is capped at the last computed month, so a short series
/// repeats its final state instead of reading past the end.
pub fn yearly_rollup(monthly: &[MonthlyState], term_years: u32) -> Vec<YearlySnapshot> {
    let total_months = monthly.len();
    if total_months == 0 {
        return Vec::new();
    }

    (1..=term_years)
        .map(|year| {
            let month = (year as usize * 12).min(total_months);
            let state = &monthly[month - 1];
            YearlySnapshot {
                year,
                month: state.month_index,
                buy_net_worth: state.buy_net_worth,
                invest_net_worth: state.invest_net_worth,
                difference: state.invest_net_worth - state.buy_net_worth,
            }
        })
        .collect()
}
