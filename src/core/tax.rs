use serde::{Deserialize, Serialize};

use super::error::TaxError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub lower: f64,
    /// `None` for the open-ended top bracket.
    pub upper: Option<f64>,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxSchedule {
    pub brackets: Vec<TaxBracket>,
    pub surtax_threshold: f64,
    pub surtax_rate: f64,
}

impl TaxSchedule {
    /// Israeli 2025 income tax bands with the 3% high-earner surtax.
    pub fn israel_2025() -> Self {
        let bands = [
            (0.0, Some(84_120.0), 0.10),
            (84_120.0, Some(120_720.0), 0.14),
            (120_720.0, Some(193_800.0), 0.20),
            (193_800.0, Some(269_280.0), 0.31),
            (269_280.0, Some(560_280.0), 0.35),
            (560_280.0, Some(721_560.0), 0.47),
            (721_560.0, None, 0.50),
        ];
        Self {
            brackets: bands
                .into_iter()
                .map(|(lower, upper, rate)| TaxBracket { lower, upper, rate })
                .collect(),
            surtax_threshold: 721_560.0,
            surtax_rate: 0.03,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomePeriod {
    #[default]
    Annual,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxInput {
    pub income: f64,
    #[serde(default)]
    pub period: IncomePeriod,
    #[serde(default)]
    pub deductions: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTax {
    #[serde(flatten)]
    pub bracket: TaxBracket,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub annual_income: f64,
    pub taxable_income: f64,
    pub total_tax: f64,
    pub surtax: f64,
    pub effective_rate: f64,
    pub net_income: f64,
    pub brackets: Vec<BracketTax>,
}

pub fn calculate_tax(input: &TaxInput, schedule: &TaxSchedule) -> Result<TaxResult, TaxError> {
    for (name, value) in [("income", input.income), ("deductions", input.deductions)] {
        if !value.is_finite() || value < 0.0 {
            return Err(TaxError::InvalidInput(format!(
                "{name} must be a finite number >= 0"
            )));
        }
    }

    let annual_income = match input.period {
        IncomePeriod::Annual => input.income,
        IncomePeriod::Monthly => input.income * 12.0,
    };
    let taxable_income = (annual_income - input.deductions).max(0.0);

    let brackets: Vec<BracketTax> = schedule
        .brackets
        .iter()
        .map(|&bracket| {
            let amount = if taxable_income <= bracket.lower {
                0.0
            } else {
                let top = bracket.upper.map_or(taxable_income, |upper| upper.min(taxable_income));
                (top - bracket.lower) * bracket.rate
            };
            BracketTax { bracket, amount }
        })
        .collect();

    let surtax = if taxable_income > schedule.surtax_threshold {
        (taxable_income - schedule.surtax_threshold) * schedule.surtax_rate
    } else {
        0.0
    };
    let total_tax = brackets.iter().map(|b| b.amount).sum::<f64>() + surtax;

    Ok(TaxResult {
        annual_income,
        taxable_income,
        total_tax,
        surtax,
        effective_rate: if annual_income > 0.0 {
            total_tax / annual_income
        } else {
            0.0
        },
        net_income: annual_income - total_tax,
        brackets,
    })
}
