use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

use super::request::RequestStatus;
use super::text_column;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema,
)]
pub enum AttendanceKind {
    /// Worked a non-scheduled day; approval earns comp-off credits.
    #[serde(rename = "compoff")]
    #[strum(serialize = "compoff")]
    CompOff,
    /// Regularization of a missed punch; approval only flips status.
    #[serde(rename = "general attendance")]
    #[strum(serialize = "general attendance")]
    General,
}

text_column!(AttendanceKind);

/// Comp-off earning and attendance regularization requests share one table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRequest {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "compoff", value_type = String)]
    pub kind: AttendanceKind,
    #[schema(example = "2025-03-01", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Release weekend")]
    pub reason: String,
    #[schema(example = "pending")]
    pub status: RequestStatus,
    #[schema(nullable = true)]
    pub manager_id: Option<u64>,
    #[schema(nullable = true)]
    pub manager_notes: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_on: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub rejected_on: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<NaiveDateTime>,
}

impl AttendanceRequest {
    /// Calendar days the request covers: the range when present, else the single date.
    pub fn covered_dates(&self) -> Vec<NaiveDate> {
        match (self.start_date, self.end_date, self.date) {
            (Some(start), Some(end), _) => start.iter_days().take_while(|d| *d <= end).collect(),
            (_, _, Some(date)) => vec![date],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(date: Option<&str>, range: Option<(&str, &str)>) -> AttendanceRequest {
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        AttendanceRequest {
            id: 1,
            employee_id: 1000,
            kind: AttendanceKind::CompOff,
            date: date.map(parse),
            start_date: range.map(|r| parse(r.0)),
            end_date: range.map(|r| parse(r.1)),
            reason: "weekend deploy".into(),
            status: RequestStatus::Pending,
            manager_id: None,
            manager_notes: None,
            approved_on: None,
            rejected_on: None,
            created_at: None,
        }
    }

    #[test]
    fn range_wins_over_single_date() {
        let req = request(Some("2025-01-01"), Some(("2025-03-01", "2025-03-03")));
        let dates = req.covered_dates();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0].to_string(), "2025-03-01");
        assert_eq!(dates[2].to_string(), "2025-03-03");
    }

    #[test]
    fn single_date_request_covers_one_day() {
        assert_eq!(request(Some("2025-01-04"), None).covered_dates().len(), 1);
    }

    #[test]
    fn kind_uses_legacy_column_spelling() {
        assert_eq!(AttendanceKind::General.as_str(), "general attendance");
        assert_eq!(
            "compoff".parse::<AttendanceKind>().unwrap(),
            AttendanceKind::CompOff
        );
    }
}
