//! Configure-rights gate based on the requester's existing broker permissions.

use crate::client::AdminClient;
use crate::models::VhostPermission;
use tracing::{error, info, warn};

/// Decides whether a requester may provision users on a vhost.
///
/// The requester must already hold a non-blank configure pattern on the
/// vhost. Lookup failures deny.
#[derive(Debug, Clone)]
pub struct AuthorizationChecker {
    client: AdminClient,
}

impl AuthorizationChecker {
    #[must_use]
    pub fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// Whether `username` holds configure rights on `vhost` (exact, case-sensitive match).
    pub async fn has_configure_rights(&self, username: &str, vhost: &str) -> bool {
        info!(requester = %username, vhost = %vhost, "Checking configure rights");

        let permissions = match self.client.list_user_permissions(username).await {
            Ok(permissions) => permissions,
            Err(e) if e.is_admin_rejection() => {
                error!(
                    requester = %username,
                    status = ?e.status(),
                    error = %e,
                    "Permission lookup failed: administrative credentials rejected"
                );
                return false;
            }
            Err(e) => {
                error!(
                    requester = %username,
                    status = ?e.status(),
                    error = %e,
                    "Failed to retrieve requester permissions"
                );
                return false;
            }
        };

        let decision = configure_rights_on(&permissions, vhost);
        if decision {
            info!(requester = %username, vhost = %vhost, "Requester holds configure rights");
        } else {
            warn!(requester = %username, vhost = %vhost, "Requester holds no configure rights");
        }
        decision
    }
}

/// Pure decision over an already fetched permission list.
///
/// The first entry for `vhost` wins.
#[must_use]
pub fn configure_rights_on(permissions: &[VhostPermission], vhost: &str) -> bool {
    permissions
        .iter()
        .find(|p| p.vhost == vhost)
        .is_some_and(VhostPermission::grants_configure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(vhost: &str, configure: Option<&str>) -> VhostPermission {
        VhostPermission {
            vhost: vhost.into(),
            configure: configure.map(str::to_string),
            write: Some(".*".into()),
            read: Some(".*".into()),
        }
    }

    #[test]
    fn test_matching_vhost_with_pattern() {
        let perms = vec![entry("billing", None), entry("orders", Some(".*"))];
        assert!(configure_rights_on(&perms, "orders"));
    }

    #[test]
    fn test_no_entry_for_vhost() {
        let perms = vec![entry("billing", Some(".*"))];
        assert!(!configure_rights_on(&perms, "orders"));
        assert!(!configure_rights_on(&[], "orders"));
    }

    #[test]
    fn test_blank_or_missing_pattern_denies() {
        assert!(!configure_rights_on(&[entry("orders", Some(""))], "orders"));
        assert!(!configure_rights_on(&[entry("orders", Some("   "))], "orders"));
        assert!(!configure_rights_on(&[entry("orders", None)], "orders"));
    }

    #[test]
    fn test_vhost_match_is_case_sensitive() {
        let perms = vec![entry("Prod", Some(".*"))];
        assert!(!configure_rights_on(&perms, "prod"));
        assert!(configure_rights_on(&perms, "Prod"));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let perms = vec![entry("orders", Some("")), entry("orders", Some(".*"))];
        assert!(!configure_rights_on(&perms, "orders"));
    }
}
