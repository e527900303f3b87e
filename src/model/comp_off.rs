use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

use super::text_column;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CreditStatus {
    Available,
    Pending,
    Used,
    Expired,
}

text_column!(CreditStatus);

/// One comp-off day earned by working a non-scheduled day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CompOffCredit {
    /// Row id; `None` until the credit is first written.
    #[schema(example = 41, nullable = true)]
    pub id: Option<u64>,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2025-03-01", format = "date", value_type = String)]
    pub earned_date: NaiveDate,

    #[schema(example = "2025-04-01", format = "date", value_type = String)]
    pub valid_from: NaiveDate,

    #[schema(example = "2025-07-31", format = "date", value_type = String)]
    pub expiry_date: NaiveDate,

    #[schema(example = "available")]
    pub status: CreditStatus,

    /// Leave request holding this credit while `pending` or `used`.
    #[schema(example = 7, nullable = true)]
    pub reserved_by: Option<u64>,
}

impl CompOffCredit {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.expiry_date
    }
}
