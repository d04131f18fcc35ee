//! Membership plan changes with point carryover.
//!
//! A plan change is four sequential calls against the data service: read the
//! old plan's active membership, deactivate it, create the new membership
//! with the carried balance plus the new plan's grant, update the customer's
//! denormalized plan label. The steps are NOT atomic: a failure after step
//! N leaves a mixed state (for example, old membership deactivated but no
//! replacement created). That window is inherent to driving a hosted query
//! API without transactions and is documented here rather than papered over.
//! No step is retried.

use crate::api::logs::{log_info, log_success};
use crate::error::{MembershipResult, ServiceResult};
use crate::models::{MembershipRecord, Plan, UpgradeOutcome};

/// Data-service operations the plan-change sequence needs.
///
/// Implemented by [`crate::service::DataServiceClient`] and by in-memory
/// doubles in tests.
#[allow(async_fn_in_trait)]
pub trait MembershipStore {
    /// The customer's active membership on the given plan, if any.
    async fn active_membership(
        &self,
        customer_id: &str,
        plan_id: &str,
    ) -> ServiceResult<Option<MembershipRecord>>;

    /// Mark a membership inactive.
    async fn deactivate_membership(&self, membership_id: &str) -> ServiceResult<()>;

    /// Create an active membership with an initial point balance.
    async fn create_membership(
        &self,
        customer_id: &str,
        plan_id: &str,
        points: i64,
    ) -> ServiceResult<MembershipRecord>;

    /// Update the customer's denormalized membership-type label.
    async fn set_customer_plan_label(&self, customer_id: &str, label: &str) -> ServiceResult<()>;
}

/// Move a customer onto `new_plan`, carrying points over from `old_plan`.
///
/// With no old plan (a first-time member), nothing is fetched or
/// deactivated and the new balance is just the plan's grant. With an old
/// plan whose active membership is missing, the carried balance defaults
/// to 0.
pub async fn upgrade_plan<S: MembershipStore>(
    store: &S,
    customer_id: &str,
    old_plan: Option<&Plan>,
    new_plan: &Plan,
) -> MembershipResult<UpgradeOutcome> {
    let mut carried_points = 0;

    if let Some(old) = old_plan {
        log_info(format!("Closing membership on plan '{}'", old.label));
        if let Some(membership) = store.active_membership(customer_id, &old.id).await? {
            carried_points = membership.points;
            store.deactivate_membership(&membership.id).await?;
            log_success(format!("Carrying over {} points", carried_points));
        }
    }

    let starting_balance = carried_points + new_plan.grant_points;
    let created = store
        .create_membership(customer_id, &new_plan.id, starting_balance)
        .await?;
    store
        .set_customer_plan_label(customer_id, &new_plan.label)
        .await?;
    log_success(format!(
        "Customer {} now on plan '{}' with {} points",
        customer_id, new_plan.label, starting_balance
    ));

    Ok(UpgradeOutcome {
        membership_id: created.id,
        carried_points,
        granted_points: new_plan.grant_points,
        starting_balance,
    })
}
