use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

use super::request::RequestStatus;
use super::text_column;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Casual,
    Unpaid,
}

text_column!(LeaveType);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2025-06-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = "pending")]
    pub status: RequestStatus,
    /// Business days in the range, fixed at submission.
    #[schema(example = 3)]
    pub total_days: i32,
    #[schema(example = "Family visit")]
    pub reason: String,
    #[schema(example = 12, nullable = true)]
    pub manager_id: Option<u64>,
    #[schema(nullable = true)]
    pub manager_notes: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_on: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub rejected_on: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub revoked_on: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<NaiveDateTime>,
}
