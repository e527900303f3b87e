use crate::error::{LedgerError, LedgerResult};
use crate::model::leave_request::LeaveRequest;
use crate::model::tenant::TenantId;
use crate::store;
use crate::store::requests::LeaveFilter;

use super::LedgerService;

impl LedgerService {
    pub async fn get_leave(&self, tenant: &TenantId, leave_id: u64) -> LedgerResult<LeaveRequest> {
        store::requests::find_leave(&self.pool, tenant, leave_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Leave request not found"))
    }

    /// One page of leave requests and the total number matching the filter.
    pub async fn list_leaves(
        &self,
        filter: &LeaveFilter<'_>,
    ) -> LedgerResult<(Vec<LeaveRequest>, i64)> {
        store::requests::list_leaves(&self.pool, filter).await
    }
}
