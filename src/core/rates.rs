/// Converts an annual percentage (`4.5` meaning 4.5%/year) to a periodic monthly rate.
///
/// Zero and negative percentages pass straight through; a negative result models
/// depreciation.
pub fn monthly_rate(annual_percent: f64) -> f64 {
    annual_percent / 100.0 / 12.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_percent_per_year_to_fraction_per_month() {
        assert!((monthly_rate(6.0) - 0.005).abs() < 1e-15);
        assert_eq!(monthly_rate(0.0), 0.0);
        assert!((monthly_rate(-1.2) + 0.001).abs() < 1e-15);
    }
}
