use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::database::{AgreementRepository, DatabaseError, Store};

/// Proof that agreements have been deduplicated and the tenant-email
/// uniqueness constraint installed. The router cannot be built without it.
#[derive(Debug)]
pub struct Ready {
    _private: (),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub duplicate_groups: usize,
    pub removed: u64,
}

/// Collapse agreements sharing a tenant email down to one survivor each,
/// then install the uniqueness constraint. Must finish before any
/// agreement-writing route takes traffic. Running it again on a clean
/// store deletes nothing.
pub async fn reconcile(store: &dyn Store) -> Result<(Ready, ReconcileReport), DatabaseError> {
    let agreements = store.list_agreements(None).await?;
    let scanned = agreements.len();

    let mut groups: HashMap<String, Vec<Uuid>> = HashMap::new();
    for agreement in agreements {
        groups.entry(agreement.tenant_email).or_default().push(agreement.id);
    }

    let mut duplicate_groups = 0;
    let mut doomed = Vec::new();
    for ids in groups.values().filter(|ids| ids.len() > 1) {
        duplicate_groups += 1;
        // The survivor is arbitrary: whichever the listing returned first.
        doomed.extend_from_slice(&ids[1..]);
    }

    let removed = store.delete_agreements(&doomed).await?;
    store.ensure_agreement_email_unique().await?;

    let report = ReconcileReport {
        scanned,
        duplicate_groups,
        removed,
    };
    info!(
        scanned = report.scanned,
        duplicate_groups = report.duplicate_groups,
        removed = report.removed,
        "Agreement reconciliation complete"
    );

    Ok((Ready { _private: () }, report))
}
