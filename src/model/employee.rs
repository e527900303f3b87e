use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::comp_off::CompOffCredit;

/// Employee columns the ledger works with.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub location: String,
    pub leaves_remaining: i32,
}

/// Response of `GET /ledger/{employee_id}`.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1000,
    "leaves_remaining": 12,
    "available_comp_off": 1,
    "credits": [{
        "id": 41,
        "employee_id": 1000,
        "earned_date": "2025-03-01",
        "valid_from": "2025-04-01",
        "expiry_date": "2025-07-31",
        "status": "available",
        "reserved_by": null
    }]
}))]
pub struct EmployeeBalance {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 12)]
    pub leaves_remaining: i32,
    /// Credits currently `available`.
    #[schema(example = 1)]
    pub available_comp_off: usize,
    pub credits: Vec<CompOffCredit>,
}
