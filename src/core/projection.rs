use super::amortization::{
    AmortizationRow, amortization_schedule, check_down_payment, loan_principal,
};
use super::error::ProjectionError;
use super::rates::monthly_rate;
use super::types::{
    ContributionMode, MonthlyState, NetWorthPolicy, ProjectionInput, ProjectionResult, Scenario,
};

pub const MAX_TERM_YEARS: u32 = 50;

/// Runs the buy-versus-invest projection for one parameter set.
///
/// Validation happens up front; on success every month from 1 to
/// `term_years * 12` is present in the result.
pub fn project(input: &ProjectionInput) -> Result<ProjectionResult, ProjectionError> {
    validate_input(input)?;
    check_down_payment(input.initial_house_price, input.down_payment)?;

    let months = input.months();
    let principal = loan_principal(input.initial_house_price, input.down_payment);
    let schedule = amortization_schedule(
        principal,
        monthly_rate(input.mortgage_annual_rate_percent),
        months,
    );

    let contribution = match input.contribution_mode {
        ContributionMode::Fixed => input.monthly_investment_contribution,
        ContributionMode::Derived => {
            derived_contribution(schedule.fixed_payment, input.monthly_rent)
        }
    };
    let investment_values = project_investment(
        input.initial_investment,
        monthly_rate(input.investment_annual_rate_percent),
        contribution,
        months,
    );
    let house_values = project_house_value(
        input.initial_house_price,
        monthly_rate(input.house_annual_appreciation_percent),
        months,
    );

    let monthly = compare_net_worth(
        &schedule.rows,
        &house_values,
        &investment_values,
        input.monthly_rent,
        input.net_worth_policy,
    );

    let overflowed = !schedule.fixed_payment.is_finite()
        || monthly.iter().any(|state| {
            !(state.payment.is_finite()
                && state.house_value.is_finite()
                && state.buy_net_worth.is_finite()
                && state.invest_net_worth.is_finite())
        });
    if overflowed {
        return Err(ProjectionError::InvalidInput(
            "rates are too large: projected values exceed the representable range".to_string(),
        ));
    }

    let final_mortgage_balance = schedule.final_balance();
    let final_house_value = house_values
        .last()
        .copied()
        .unwrap_or(input.initial_house_price);
    let final_investment_value = investment_values
        .last()
        .copied()
        .unwrap_or(input.initial_investment);
    let (final_buy_net_worth, final_invest_net_worth) = monthly.last().map_or(
        (
            input.initial_house_price - principal,
            input.initial_investment,
        ),
        |state| (state.buy_net_worth, state.invest_net_worth),
    );
    let comparison = final_invest_net_worth - final_buy_net_worth;
    let total_contribution = input.initial_investment + contribution * f64::from(months);

    Ok(ProjectionResult {
        months,
        loan_principal: principal,
        monthly_mortgage_payment: schedule.fixed_payment,
        total_paid: schedule.total_paid(),
        total_interest: schedule.total_interest(),
        final_mortgage_balance,
        final_house_value,
        final_equity: final_house_value - final_mortgage_balance,
        total_rental_income: input.monthly_rent * f64::from(months),
        monthly_investment_contribution: contribution,
        final_investment_value,
        total_contribution,
        total_growth: final_investment_value - total_contribution,
        final_buy_net_worth,
        final_invest_net_worth,
        comparison,
        preferred: if comparison >= 0.0 {
            Scenario::Invest
        } else {
            Scenario::Buy
        },
        monthly,
    })
}

/// Cash left to invest once rental income and the mortgage payment net out.
pub fn derived_contribution(mortgage_payment: f64, monthly_rent: f64) -> f64 {
    (mortgage_payment - monthly_rent).abs()
}

/// Month-end investment balances: each month's contribution is added before growth.
pub fn project_investment(
    initial: f64,
    monthly_rate: f64,
    contribution: f64,
    months: u32,
) -> Vec<f64> {
    let mut value = initial;
    (0..months)
        .map(|_| {
            value = (value + contribution) * (1.0 + monthly_rate);
            value
        })
        .collect()
}

pub fn project_house_value(initial: f64, monthly_rate: f64, months: u32) -> Vec<f64> {
    let mut value = initial;
    (0..months)
        .map(|_| {
            value *= 1.0 + monthly_rate;
            value
        })
        .collect()
}

/// Zips the three monthly series into per-month buy and invest net worth.
pub fn compare_net_worth(
    schedule: &[AmortizationRow],
    house_values: &[f64],
    investment_values: &[f64],
    monthly_rent: f64,
    policy: NetWorthPolicy,
) -> Vec<MonthlyState> {
    schedule
        .iter()
        .zip(house_values)
        .zip(investment_values)
        .map(|((row, &house_value), &investment_value)| {
            let rental_income_to_date = monthly_rent * f64::from(row.month);
            let equity = house_value - row.balance;
            let buy_net_worth = match policy {
                NetWorthPolicy::EquityOnly => equity,
                NetWorthPolicy::EquityWithRent => equity + rental_income_to_date,
            };
            MonthlyState {
                month_index: row.month,
                payment: row.payment,
                mortgage_balance: row.balance,
                interest_paid: row.interest,
                principal_paid: row.principal,
                house_value,
                investment_value,
                rental_income_to_date,
                buy_net_worth,
                invest_net_worth: investment_value,
            }
        })
        .collect()
}

fn validate_input(input: &ProjectionInput) -> Result<(), ProjectionError> {
    let amounts = [
        ("initialHousePrice", input.initial_house_price),
        ("downPayment", input.down_payment),
        ("mortgageAnnualRatePercent", input.mortgage_annual_rate_percent),
        ("monthlyRent", input.monthly_rent),
        ("initialInvestment", input.initial_investment),
        (
            "investmentAnnualRatePercent",
            input.investment_annual_rate_percent,
        ),
        (
            "monthlyInvestmentContribution",
            input.monthly_investment_contribution,
        ),
    ];
    for (name, value) in amounts {
        if !value.is_finite() {
            return Err(ProjectionError::InvalidInput(format!(
                "{name} must be a finite number"
            )));
        }
        if value < 0.0 {
            return Err(ProjectionError::InvalidInput(format!("{name} must be >= 0")));
        }
    }

    if !input.house_annual_appreciation_percent.is_finite() {
        return Err(ProjectionError::InvalidInput(
            "houseAnnualAppreciationPercent must be a finite number".to_string(),
        ));
    }

    if !(1..=MAX_TERM_YEARS).contains(&input.term_years) {
        return Err(ProjectionError::InvalidInput(format!(
            "termYears must be between 1 and {MAX_TERM_YEARS}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assume, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_input() -> ProjectionInput {
        ProjectionInput {
            initial_house_price: 2_000_000.0,
            down_payment: 500_000.0,
            mortgage_annual_rate_percent: 4.5,
            monthly_rent: 4_000.0,
            house_annual_appreciation_percent: 4.0,
            initial_investment: 500_000.0,
            investment_annual_rate_percent: 7.0,
            monthly_investment_contribution: 0.0,
            term_years: 30,
            contribution_mode: ContributionMode::Derived,
            net_worth_policy: NetWorthPolicy::EquityOnly,
        }
    }

    fn zero_rate_input() -> ProjectionInput {
        ProjectionInput {
            initial_house_price: 1_000_000.0,
            down_payment: 250_000.0,
            mortgage_annual_rate_percent: 0.0,
            monthly_rent: 0.0,
            house_annual_appreciation_percent: 0.0,
            initial_investment: 0.0,
            investment_annual_rate_percent: 0.0,
            monthly_investment_contribution: 1_000.0,
            term_years: 1,
            contribution_mode: ContributionMode::Fixed,
            net_worth_policy: NetWorthPolicy::EquityOnly,
        }
    }

    #[test]
    fn extreme_mortgage_rate_stays_finite() {
        let input = ProjectionInput {
            initial_house_price: 400_000.0,
            down_payment: 100_000.0,
            mortgage_annual_rate_percent: 10_000.0,
            term_years: 50,
            ..sample_input()
        };
        let result = project(&input).expect("large but finite rate");
        assert!(result.monthly_mortgage_payment.is_finite());
        assert!(result.total_paid.is_finite());
        assert_eq!(result.final_mortgage_balance, 0.0);
        let summed: f64 = result.monthly.iter().map(|m| m.payment).sum();
        assert_eq!(result.total_paid, summed);
        for state in &result.monthly {
            let split = state.interest_paid + state.principal_paid;
            assert!((split - state.payment).abs() <= 1e-9 * state.payment.abs().max(1.0));
        }
        let json = serde_json::to_string(&result).expect("serialize");
        assert!(!json.contains("null"), "{json}");
    }

    #[test]
    fn overflowing_appreciation_is_rejected() {
        let input = ProjectionInput {
            house_annual_appreciation_percent: 100_000.0,
            term_years: 50,
            ..sample_input()
        };
        let err = project(&input).expect_err("house value overflows");
        assert!(matches!(err, ProjectionError::InvalidInput(_)));
    }

    #[test]
    fn one_year_zero_rate_mortgage_pays_off() {
        let result = project(&zero_rate_input()).expect("valid input");
        assert_eq!(result.months, 12);
        assert_eq!(result.monthly_mortgage_payment, 62_500.0);
        assert_eq!(result.final_mortgage_balance, 0.0);
        assert_approx(result.total_paid, 750_000.0);
        assert_eq!(result.total_interest, 0.0);
        assert_eq!(result.final_equity, 1_000_000.0);
    }

    #[test]
    fn fixed_contribution_without_growth_accumulates_linearly() {
        let result = project(&zero_rate_input()).expect("valid input");
        assert_eq!(result.final_investment_value, 12_000.0);
        assert_eq!(result.total_contribution, 12_000.0);
        assert_eq!(result.total_growth, 0.0);
        assert_eq!(result.monthly_investment_contribution, 1_000.0);
    }

    #[test]
    fn derived_contribution_uses_payment_minus_rent() {
        let mut input = zero_rate_input();
        input.contribution_mode = ContributionMode::Derived;
        input.monthly_rent = 2_500.0;
        let result = project(&input).expect("valid input");
        assert_eq!(result.monthly_investment_contribution, 60_000.0);
        assert_eq!(result.final_investment_value, 720_000.0);

        // Rent above the payment still yields a positive contribution.
        assert_eq!(derived_contribution(1_000.0, 1_500.0), 500.0);
    }

    #[test]
    fn rejects_low_down_payment_before_computing() {
        let mut input = zero_rate_input();
        input.down_payment = 200_000.0;
        let err = project(&input).expect_err("ratio 0.2 is below the minimum");
        assert!(matches!(err, ProjectionError::DownPaymentTooLow { .. }));
    }

    #[test]
    fn rejects_out_of_range_terms() {
        for term_years in [0, 51] {
            let mut input = zero_rate_input();
            input.term_years = term_years;
            let err = project(&input).expect_err("term out of range");
            assert!(matches!(
                err,
                ProjectionError::InvalidInput(ref msg) if msg.contains("termYears")
            ));
        }
        let mut input = zero_rate_input();
        input.term_years = 50;
        assert_eq!(project(&input).expect("50 years is allowed").monthly.len(), 600);
    }

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        let mut input = zero_rate_input();
        input.monthly_rent = -1.0;
        let err = project(&input).expect_err("negative rent");
        assert_eq!(
            err,
            ProjectionError::InvalidInput("monthlyRent must be >= 0".to_string())
        );

        let mut input = zero_rate_input();
        input.initial_investment = f64::NAN;
        assert!(project(&input).is_err());

        let mut input = zero_rate_input();
        input.house_annual_appreciation_percent = f64::INFINITY;
        assert!(project(&input).is_err());
    }

    #[test]
    fn negative_appreciation_depreciates_house() {
        let mut input = zero_rate_input();
        input.house_annual_appreciation_percent = -12.0;
        let result = project(&input).expect("negative appreciation is allowed");
        assert!(result.final_house_value < input.initial_house_price);
        assert_approx(result.final_house_value, 1_000_000.0 * 0.99f64.powi(12));
    }

    #[test]
    fn equity_with_rent_policy_adds_collected_rent() {
        let mut input = zero_rate_input();
        input.monthly_rent = 3_000.0;
        input.contribution_mode = ContributionMode::Fixed;

        let equity_only = project(&input).expect("valid");
        input.net_worth_policy = NetWorthPolicy::EquityWithRent;
        let with_rent = project(&input).expect("valid");

        assert_approx(
            with_rent.final_buy_net_worth - equity_only.final_buy_net_worth,
            36_000.0,
        );
        assert_approx(with_rent.monthly[2].rental_income_to_date, 9_000.0);
        assert_approx(with_rent.total_rental_income, 36_000.0);
        assert_eq!(with_rent.final_equity, equity_only.final_equity);
    }

    #[test]
    fn comparison_sign_picks_preferred_scenario() {
        let result = project(&zero_rate_input()).expect("valid");
        assert_approx(result.comparison, 12_000.0 - 1_000_000.0);
        assert_eq!(result.preferred, Scenario::Buy);

        let mut input = zero_rate_input();
        input.initial_house_price = 0.0;
        input.down_payment = 0.0;
        let result = project(&input).expect("no house");
        assert_eq!(result.monthly_mortgage_payment, 0.0);
        assert_eq!(result.preferred, Scenario::Invest);
    }

    #[test]
    fn monthly_states_track_every_series() {
        let result = project(&sample_input()).expect("valid");
        assert_eq!(result.monthly.len(), 360);
        for (index, state) in result.monthly.iter().enumerate() {
            assert_eq!(state.month_index as usize, index + 1);
            assert_approx(state.buy_net_worth, state.house_value - state.mortgage_balance);
            assert_eq!(state.invest_net_worth, state.investment_value);
        }
        assert_eq!(result.final_mortgage_balance, 0.0);
        assert_approx(
            result.monthly_investment_contribution,
            (result.monthly_mortgage_payment - 4_000.0).abs(),
        );
    }

    #[test]
    fn repeated_projection_is_bit_identical() {
        let input = sample_input();
        let first = project(&input).expect("valid");
        let second = project(&input).expect("valid");
        assert_eq!(first, second);
    }

    #[test]
    fn compounding_adds_contribution_before_growth() {
        let values = project_investment(100.0, 0.1, 10.0, 3);
        assert_approx(values[0], 121.0);
        assert_approx(values[1], 144.1);
        assert_approx(values[2], 169.51);

        let houses = project_house_value(200.0, 0.1, 2);
        assert_approx(houses[1], 242.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_projection_series_are_consistent(
            house_price in 1u32..3_000_000,
            down_share_bp in 2_500u32..10_001,
            mortgage_bp in 0u32..1_500,
            rent in 0u32..20_000,
            appreciation_bp in -500i32..800,
            initial_investment in 0u32..1_000_000,
            investment_bp in 0u32..1_500,
            contribution in 0u32..10_000,
            term_years in 1u32..51,
            derived in proptest::bool::ANY,
            with_rent in proptest::bool::ANY
        ) {
            let house_price = f64::from(house_price);
            let down_payment = house_price * f64::from(down_share_bp) / 10_000.0;
            prop_assume!(down_payment / house_price >= 0.25);

            let input = ProjectionInput {
                initial_house_price: house_price,
                down_payment,
                mortgage_annual_rate_percent: f64::from(mortgage_bp) / 100.0,
                monthly_rent: f64::from(rent),
                house_annual_appreciation_percent: f64::from(appreciation_bp) / 100.0,
                initial_investment: f64::from(initial_investment),
                investment_annual_rate_percent: f64::from(investment_bp) / 100.0,
                monthly_investment_contribution: f64::from(contribution),
                term_years,
                contribution_mode: if derived {
                    ContributionMode::Derived
                } else {
                    ContributionMode::Fixed
                },
                net_worth_policy: if with_rent {
                    NetWorthPolicy::EquityWithRent
                } else {
                    NetWorthPolicy::EquityOnly
                },
            };

            let result = project(&input).expect("generated inputs are valid");
            prop_assert!(result.monthly.len() == (term_years * 12) as usize);
            prop_assert!(result.final_mortgage_balance == 0.0);

            let mut previous_balance = result.loan_principal;
            let mut paid = 0.0;
            let mut interest = 0.0;
            for state in &result.monthly {
                prop_assert!(state.mortgage_balance <= previous_balance + 1e-9);
                let split = state.interest_paid + state.principal_paid;
                prop_assert!((split - state.payment).abs() <= 1e-6);
                prop_assert!(state.investment_value >= 0.0);
                paid += state.payment;
                interest += state.interest_paid;
                previous_balance = state.mortgage_balance;
            }
            prop_assert!((result.total_paid - paid).abs() <= 1e-6);
            prop_assert!((result.total_interest - interest).abs() <= 1e-6);
            let expected = result.final_invest_net_worth - result.final_buy_net_worth;
            prop_assert!((result.comparison - expected).abs() <= 1e-9);
        }
    }
}
