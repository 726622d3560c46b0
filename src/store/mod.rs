//! Owner-scoped record storage used by the HTTP layer.
//!
//! The calculation engine never touches storage; handlers compute results and
//! hand finished records to a [`Repository`].

mod memory;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ProjectionInput, ProjectionResult, Scenario};

pub use memory::InMemoryRepository;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: RecordId,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> AsRef<T> for Record<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

/// Storage abstraction so handlers can be exercised without a database.
pub trait Repository<T>: Send + Sync {
    fn insert(&self, owner: &UserId, data: T) -> Result<Record<T>, RepositoryError>;
    fn update(&self, owner: &UserId, id: &RecordId, data: T) -> Result<Record<T>, RepositoryError>;
    /// Records belonging to `owner`, newest first.
    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Record<T>>, RepositoryError>;
    fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), RepositoryError>;
    fn count(&self) -> Result<usize, RepositoryError>;
    /// Every record regardless of owner, newest first. Admin routes only.
    fn list_all(&self) -> Result<Vec<Record<T>>, RepositoryError>;
    /// Deletes by id regardless of owner. Admin routes only.
    fn remove(&self, id: &RecordId) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// A saved buy-versus-invest comparison. Results are always recomputed on the
/// server from `input`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub input: ProjectionInput,
    pub summary: ComparisonSummary,
    pub buy_net_worth: Vec<f64>,
    pub invest_net_worth: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub monthly_mortgage_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub final_mortgage_balance: f64,
    pub final_house_value: f64,
    pub final_equity: f64,
    pub total_rental_income: f64,
    pub final_investment_value: f64,
    pub total_contribution: f64,
    pub total_growth: f64,
    pub comparison: f64,
    pub preferred: Scenario,
}

impl ComparisonRecord {
    pub fn from_projection(input: ProjectionInput, result: &ProjectionResult) -> Self {
        Self {
            input,
            summary: ComparisonSummary {
                monthly_mortgage_payment: result.monthly_mortgage_payment,
                total_paid: result.total_paid,
                total_interest: result.total_interest,
                final_mortgage_balance: result.final_mortgage_balance,
                final_house_value: result.final_house_value,
                final_equity: result.final_equity,
                total_rental_income: result.total_rental_income,
                final_investment_value: result.final_investment_value,
                total_contribution: result.total_contribution,
                total_growth: result.total_growth,
                comparison: result.comparison,
                preferred: result.preferred,
            },
            buy_net_worth: result.monthly.iter().map(|m| m.buy_net_worth).collect(),
            invest_net_worth: result.monthly.iter().map(|m| m.invest_net_worth).collect(),
        }
    }
}
