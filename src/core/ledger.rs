use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

const RECENT_LIMIT: usize = 10;
const MONTH_BUCKETS: u32 = 12;
const SPENDING_WARNING_RATIO: f64 = 0.8;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Transaction as submitted by a client; `date` defaults to the day it is recorded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub amount: f64,
    #[serde(rename = "type", alias = "kind")]
    pub kind: TransactionKind,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl AsRef<TransactionEntry> for TransactionEntry {
    fn as_ref(&self) -> &TransactionEntry {
        self
    }
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(LedgerError::InvalidTransaction(
                "amount must be a positive number".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "category is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_entry(self, today: NaiveDate) -> Result<TransactionEntry, LedgerError> {
        self.validate()?;
        Ok(TransactionEntry {
            amount: self.amount,
            kind: self.kind,
            category: self.category.trim().to_string(),
            description: self.description.trim().to_string(),
            date: self.date.unwrap_or(today),
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerAlert {
    pub severity: AlertSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary<E> {
    pub income: f64,
    pub expenses: f64,
    pub net_balance: f64,
    pub income_categories: Vec<CategoryTotal>,
    pub expense_categories: Vec<CategoryTotal>,
    pub monthly: Vec<MonthTotals>,
    pub alerts: Vec<LedgerAlert>,
    pub recent_transactions: Vec<E>,
}

/// Aggregates a user's transactions into totals, category breakdowns, the twelve
/// months ending with `today`, and spending alerts.
pub fn summarize<E>(entries: &[E], today: NaiveDate) -> LedgerSummary<E>
where
    E: AsRef<TransactionEntry> + Clone,
{
    let mut income = 0.0;
    let mut expenses = 0.0;
    let mut income_by_category: BTreeMap<&str, f64> = BTreeMap::new();
    let mut expense_by_category: BTreeMap<&str, f64> = BTreeMap::new();

    let first_month = month_start(today)
        .checked_sub_months(Months::new(MONTH_BUCKETS - 1))
        .unwrap_or(NaiveDate::MIN);
    let mut monthly: Vec<MonthTotals> = (0..MONTH_BUCKETS)
        .filter_map(|offset| first_month.checked_add_months(Months::new(offset)))
        .map(|start| MonthTotals {
            month: start.format("%Y-%m").to_string(),
            income: 0.0,
            expenses: 0.0,
        })
        .collect();

    for item in entries {
        let entry: &TransactionEntry = item.as_ref();
        let bucket = month_offset(first_month, entry.date)
            .and_then(|offset| monthly.get_mut(offset));
        match entry.kind {
            TransactionKind::Income => {
                income += entry.amount;
                *income_by_category.entry(entry.category.as_str()).or_default() += entry.amount;
                if let Some(bucket) = bucket {
                    bucket.income += entry.amount;
                }
            }
            TransactionKind::Expense => {
                expenses += entry.amount;
                *expense_by_category.entry(entry.category.as_str()).or_default() += entry.amount;
                if let Some(bucket) = bucket {
                    bucket.expenses += entry.amount;
                }
            }
        }
    }

    let mut alerts = Vec::new();
    if expenses > income {
        alerts.push(LedgerAlert {
            severity: AlertSeverity::Warning,
            message: "Your expenses are higher than your income".to_string(),
        });
    }
    if expenses > 0.0 && income > 0.0 && expenses / income > SPENDING_WARNING_RATIO {
        alerts.push(LedgerAlert {
            severity: AlertSeverity::Info,
            message: "You are spending more than 80% of your income".to_string(),
        });
    }

    let mut recent_transactions = entries.to_vec();
    recent_transactions.sort_by(|a, b| b.as_ref().date.cmp(&a.as_ref().date));
    recent_transactions.truncate(RECENT_LIMIT);

    LedgerSummary {
        income,
        expenses,
        net_balance: income - expenses,
        income_categories: category_totals(income_by_category),
        expense_categories: category_totals(expense_by_category),
        monthly,
        alerts,
        recent_transactions,
    }
}

fn category_totals(totals: BTreeMap<&str, f64>) -> Vec<CategoryTotal> {
    totals
        .into_iter()
        .map(|(category, value)| CategoryTotal {
            category: category.to_string(),
            value,
        })
        .collect()
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_offset(first_month: NaiveDate, date: NaiveDate) -> Option<usize> {
    let months = (date.year() - first_month.year()) * 12 + date.month() as i32
        - first_month.month() as i32;
    usize::try_from(months).ok()
}
