//! Built-in expert directory.
//!
//! In production this would come from an HR system or a config service;
//! here it is static configuration loaded once at process start and
//! treated as immutable for the process lifetime. A TOML config file may
//! replace the default list (see [`crate::config::FlowConfig`]).

use crate::contracts::{ExpertDirectoryEntry, FALLBACK_BACKUP_EXPERT, FALLBACK_PRIMARY_EXPERT};

/// Default expert directory. The two routing-fallback ids are always
/// members, so the fallback routing is valid against any directory that
/// includes the defaults.
pub fn default_directory() -> Vec<ExpertDirectoryEntry> {
    fn entry(id: &str, skills: &[&str]) -> ExpertDirectoryEntry {
        ExpertDirectoryEntry {
            id: id.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    vec![
        entry(
            FALLBACK_PRIMARY_EXPERT,
            &["basis", "kernel", "system-down", "transport"],
        ),
        entry(
            FALLBACK_BACKUP_EXPERT,
            &["hana", "system-replication", "failover", "backup-recovery"],
        ),
        entry(
            "sap-fiori-frontend",
            &["fiori", "ui5", "gateway", "odata"],
        ),
        entry(
            "sap-security-authorizations",
            &["roles", "authorizations", "sso", "audit"],
        ),
        entry(
            "sap-s4-finance",
            &["fi", "co", "period-close", "reconciliation"],
        ),
        entry(
            "sap-integration-middleware",
            &["pi-po", "cpi", "idoc", "api-management"],
        ),
    ]
}

/// Membership check used by the routing stage to validate the model's
/// chosen primary expert.
pub fn contains(directory: &[ExpertDirectoryEntry], id: &str) -> bool {
    directory.iter().any(|e| e.id == id)
}
