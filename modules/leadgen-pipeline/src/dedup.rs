//! Deduplication Gate: drops leads whose email is already on file for the owner.

use std::collections::HashSet;

use tracing::{info, warn};

use leadgen_common::CanonicalLead;

use crate::traits::LeadStore;

/// One batched lookup, then an order-preserving filter. Leads without an
/// email always pass. A failed lookup passes everything through.
pub async fn filter_new(
    leads: Vec<CanonicalLead>,
    owner: &str,
    store: &dyn LeadStore,
) -> Vec<CanonicalLead> {
    let contacts: HashSet<String> = leads.iter().filter_map(|l| l.email.clone()).collect();
    if contacts.is_empty() {
        return leads;
    }

    let existing = match store.find_existing_contacts(owner, &contacts).await {
        Ok(existing) => existing,
        Err(e) => {
            warn!(owner, error = %e, "Duplicate lookup failed, keeping all leads");
            return leads;
        }
    };

    let before = leads.len();
    let fresh = retain_unseen(leads, &existing);
    if fresh.len() < before {
        info!(
            owner,
            filtered = before - fresh.len(),
            remaining = fresh.len(),
            "Filtered duplicate leads"
        );
    }
    fresh
}

fn retain_unseen(mut leads: Vec<CanonicalLead>, existing: &HashSet<String>) -> Vec<CanonicalLead> {
    leads.retain(|lead| match &lead.email {
        Some(email) => !existing.contains(email),
        None => true,
    });
    leads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[tokio::test]
    async fn known_emails_removed_in_order() {
        let store = MockLeadStore::new().with_existing("owner-1", &["b@glow.tw", "d@glow.tw"]);
        let leads = vec![
            lead("1", Some("a@glow.tw")),
            lead("2", Some("b@glow.tw")),
            lead("3", None),
            lead("4", Some("d@glow.tw")),
            lead("5", Some("e@glow.tw")),
        ];

        let fresh = filter_new(leads, "owner-1", &store).await;

        let ids: Vec<_> = fresh.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "5"]);
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn other_owners_emails_do_not_filter() {
        let store = MockLeadStore::new().with_existing("owner-2", &["a@glow.tw"]);
        let fresh = filter_new(vec![lead("1", Some("a@glow.tw"))], "owner-1", &store).await;
        assert_eq!(fresh.len(), 1);
    }

    #[tokio::test]
    async fn no_emails_skips_lookup() {
        let store = MockLeadStore::new();
        let fresh = filter_new(vec![lead("1", None), lead("2", None)], "owner-1", &store).await;
        assert_eq!(fresh.len(), 2);
        assert_eq!(store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_everything() {
        let store = MockLeadStore::new()
            .with_existing("owner-1", &["a@glow.tw"])
            .failing_lookups();
        let fresh = filter_new(vec![lead("1", Some("a@glow.tw"))], "owner-1", &store).await;
        assert_eq!(fresh.len(), 1);
    }
}
