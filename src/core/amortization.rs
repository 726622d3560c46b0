use super::error::ProjectionError;

/// Lowest down payment, as a share of the house price, a lender accepts.
pub const MIN_DOWN_PAYMENT_RATIO: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationSchedule {
    pub principal: f64,
    pub fixed_payment: f64,
    pub rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    pub fn total_paid(&self) -> f64 {
        self.rows.iter().map(|row| row.payment).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|row| row.interest).sum()
    }

    pub fn final_balance(&self) -> f64 {
        self.rows.last().map_or(self.principal, |row| row.balance)
    }
}

pub fn loan_principal(house_price: f64, down_payment: f64) -> f64 {
    (house_price - down_payment).max(0.0)
}

pub fn check_down_payment(house_price: f64, down_payment: f64) -> Result<(), ProjectionError> {
    if house_price > 0.0 {
        let ratio = down_payment / house_price;
        if ratio < MIN_DOWN_PAYMENT_RATIO {
            return Err(ProjectionError::DownPaymentTooLow { ratio });
        }
    }
    Ok(())
}

/// Level annuity payment that retires `principal` over `months` periods.
pub fn fixed_monthly_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    let n = f64::from(months);
    if monthly_rate == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + monthly_rate).powf(n);
    if !growth.is_finite() {
        // r·g/(g-1) tends to r once the compounding factor overflows.
        return principal * monthly_rate;
    }
    principal * (monthly_rate * growth) / (growth - 1.0)
}

pub fn amortization_schedule(
    principal: f64,
    monthly_rate: f64,
    months: u32,
) -> AmortizationSchedule {
    let fixed_payment = fixed_monthly_payment(principal, monthly_rate, months);
    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = principal;

    for month in 1..=months {
        let interest = balance * monthly_rate;
        let due = balance + interest;

        // The last scheduled month settles whatever rounding left behind.
        let (payment, next_balance) = if fixed_payment > due || month == months {
            (due, 0.0)
        } else {
            (fixed_payment, (balance - (fixed_payment - interest)).max(0.0))
        };

        rows.push(AmortizationRow {
            month,
            payment,
            interest,
            principal: payment - interest,
            balance: next_balance,
        });
        balance = next_balance;
    }

    AmortizationSchedule {
        principal,
        fixed_payment,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn zero_rate_payment_is_straight_line() {
        assert_eq!(fixed_monthly_payment(750_000.0, 0.0, 12), 62_500.0);
        assert_eq!(fixed_monthly_payment(120.0, 0.0, 360), 120.0 / 360.0);
    }

    #[test]
    fn annuity_payment_matches_published_table() {
        // 100k over 30 years at 6% is the textbook 599.55/month.
        let payment = fixed_monthly_payment(100_000.0, 0.005, 360);
        assert!((payment - 599.550_525).abs() < 1e-5, "got {payment}");
    }

    #[test]
    fn overflowing_growth_falls_back_to_interest_only_payment() {
        // 10000%/year over 50 years overflows (1 + r)^n.
        let rate = 10_000.0 / 100.0 / 12.0;
        let schedule = amortization_schedule(300_000.0, rate, 600);
        assert_eq!(schedule.fixed_payment, 300_000.0 * rate);
        assert!(schedule.rows.iter().all(|row| row.payment.is_finite()));
        for row in &schedule.rows {
            let split = row.interest + row.principal;
            assert!((split - row.payment).abs() <= 1e-9 * row.payment.abs().max(1.0));
        }
        assert_eq!(schedule.rows[0].balance, 300_000.0);
        assert_eq!(schedule.final_balance(), 0.0);
        let summed: f64 = schedule.rows.iter().map(|row| row.payment).sum();
        assert_eq!(schedule.total_paid(), summed);
    }

    #[test]
    fn zero_months_has_no_payment() {
        assert_eq!(fixed_monthly_payment(1_000.0, 0.01, 0), 0.0);
        let schedule = amortization_schedule(1_000.0, 0.01, 0);
        assert!(schedule.rows.is_empty());
        assert_eq!(schedule.final_balance(), 1_000.0);
    }

    #[test]
    fn one_year_zero_rate_schedule_pays_off_exactly() {
        let schedule = amortization_schedule(750_000.0, 0.0, 12);
        assert_eq!(schedule.rows.len(), 12);
        for row in &schedule.rows {
            assert_eq!(row.payment, 62_500.0);
            assert_eq!(row.interest, 0.0);
        }
        assert_eq!(schedule.final_balance(), 0.0);
        assert_approx(schedule.total_paid(), 750_000.0);
        assert_eq!(schedule.total_interest(), 0.0);
    }

    #[test]
    fn first_row_splits_interest_and_principal() {
        let schedule = amortization_schedule(100_000.0, 0.005, 360);
        let first = schedule.rows[0];
        assert_approx(first.interest, 500.0);
        assert_approx(first.principal, schedule.fixed_payment - 500.0);
        assert_approx(first.balance, 100_000.0 - first.principal);
    }

    #[test]
    fn zero_principal_produces_all_zero_rows() {
        let schedule = amortization_schedule(0.0, 0.004, 24);
        assert_eq!(schedule.fixed_payment, 0.0);
        assert!(schedule.rows.iter().all(|row| row.payment == 0.0 && row.balance == 0.0));
    }

    #[test]
    fn down_payment_below_quarter_is_rejected() {
        let err = check_down_payment(1_000_000.0, 200_000.0).expect_err("ratio 0.2");
        assert_eq!(err, ProjectionError::DownPaymentTooLow { ratio: 0.2 });
        assert!(check_down_payment(1_000_000.0, 250_000.0).is_ok());
        assert!(check_down_payment(0.0, 0.0).is_ok());
    }

    #[test]
    fn principal_never_goes_negative() {
        assert_eq!(loan_principal(300_000.0, 400_000.0), 0.0);
        assert_eq!(loan_principal(300_000.0, 100_000.0), 200_000.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_schedule_amortizes_to_zero_and_conserves_payments(
            principal in 0u32..5_000_000,
            rate_bp in 0u32..2_000,
            years in 1u32..51
        ) {
            let principal = f64::from(principal);
            let rate = f64::from(rate_bp) / 10_000.0 / 12.0;
            let months = years * 12;
            let schedule = amortization_schedule(principal, rate, months);

            prop_assert!(schedule.rows.len() == months as usize);
            let mut previous = principal;
            for row in &schedule.rows {
                prop_assert!(row.balance <= previous + 1e-9);
                prop_assert!(row.balance >= 0.0);
                prop_assert!((row.interest + row.principal - row.payment).abs() <= 1e-6);
                previous = row.balance;
            }
            prop_assert!(schedule.final_balance() == 0.0);

            let paid: f64 = schedule.rows.iter().map(|row| row.payment).sum();
            let interest: f64 = schedule.rows.iter().map(|row| row.interest).sum();
            prop_assert!((schedule.total_paid() - paid).abs() <= 1e-6);
            prop_assert!((schedule.total_interest() - interest).abs() <= 1e-6);
            prop_assert!((paid - interest - principal).abs() <= 1e-3);
        }
    }
}
