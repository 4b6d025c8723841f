use serde::Serialize;
use tracing::{info, warn};

use crate::database::models::{Notice, Role};
use crate::database::{AgreementRepository, DatabaseError, NoticeRepository, Store, UserRepository};

/// Active notices at which a tenancy is revoked.
pub const ESCALATION_THRESHOLD: i64 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct NoticeOutcome {
    pub notice: Notice,
    /// The agreement was deleted and the role reset by this issuance.
    pub revoked: bool,
}

/// Record a notice against a tenant and revoke the tenancy once the tenant
/// reaches `ESCALATION_THRESHOLD` active notices.
///
/// The count is read and then the notice written as two separate store
/// calls, so concurrent issuances for the same tenant may both observe the
/// same prior count and record the same sequence number. Notices past the
/// threshold are still accepted; each one repeats the revocation.
///
/// The revocation is not transactional. If the notice is written but the
/// agreement delete or role reset fails, the error is returned and the
/// notice stays.
pub async fn issue_notice(
    store: &dyn Store,
    tenant_email: &str,
    apartment: &str,
    reason: &str,
) -> Result<NoticeOutcome, DatabaseError> {
    let prior = store.count_active_notices(tenant_email).await?;
    let notice = Notice::active(tenant_email, apartment, reason, prior + 1);
    store.insert_notice(&notice).await?;

    info!(
        tenant = tenant_email,
        count = notice.count,
        "Issued notice"
    );

    let revoked = notice.count >= ESCALATION_THRESHOLD;
    if revoked {
        let removed = store.delete_agreement_by_email(tenant_email).await?;
        let user = store.set_user_role(tenant_email, Role::User).await?;
        if user.is_none() {
            warn!(tenant = tenant_email, "Escalated tenant has no user record to reset");
        }
        info!(
            tenant = tenant_email,
            agreements_removed = removed,
            "Tenancy revoked after {} notices",
            notice.count
        );
    }

    Ok(NoticeOutcome { notice, revoked })
}
