//! Build metadata stamped in at compile time.
//!
//! The packaging step exports the `TSDADMIN_*` variables before compiling;
//! local builds fall back to placeholder values.

use std::fmt;
use std::sync::OnceLock;

use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    Unknown,
    /// Working tree had local changes.
    Modified,
    /// Clean checkout.
    Minted,
}

impl RepoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RepoStatus::Unknown => "UNKNOWN",
            RepoStatus::Modified => "MODIFIED",
            RepoStatus::Minted => "MINTED",
        }
    }

    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "modified" | "dirty" => RepoStatus::Modified,
            "minted" | "clean" => RepoStatus::Minted,
            _ => RepoStatus::Unknown,
        }
    }
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub short_revision: &'static str,
    pub full_revision: &'static str,
    /// Seconds since the epoch.
    pub timestamp: u64,
    pub repo_status: RepoStatus,
    pub user: &'static str,
    pub host: &'static str,
    pub repo: &'static str,
}

impl BuildInfo {
    /// Metadata of the running binary.
    pub fn current() -> &'static BuildInfo {
        static CURRENT: OnceLock<BuildInfo> = OnceLock::new();
        CURRENT.get_or_init(|| BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            short_revision: option_env!("TSDADMIN_SHORT_REVISION").unwrap_or("unknown"),
            full_revision: option_env!("TSDADMIN_FULL_REVISION").unwrap_or("unknown"),
            timestamp: option_env!("TSDADMIN_BUILD_TIMESTAMP")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
            repo_status: RepoStatus::parse(option_env!("TSDADMIN_REPO_STATUS").unwrap_or("")),
            user: option_env!("TSDADMIN_BUILD_USER").unwrap_or("unknown"),
            host: option_env!("TSDADMIN_BUILD_HOST").unwrap_or("unknown"),
            repo: option_env!("TSDADMIN_BUILD_REPO").unwrap_or("unknown"),
        })
    }

    /// e.g. `tsdadmin 0.1.0 built at revision 1a2b3c4 (MODIFIED)`
    pub fn revision_string(&self) -> String {
        format!(
            "tsdadmin {} built at revision {} ({})",
            self.version, self.short_revision, self.repo_status
        )
    }

    /// e.g. `Built on 1700000000 by alice@buildbox:/src/tsdadmin`
    pub fn build_string(&self) -> String {
        format!(
            "Built on {} by {}@{}:{}",
            self.timestamp, self.user, self.host, self.repo
        )
    }

    /// Single-line JSON object with the seven build fields.
    pub fn to_json(&self) -> String {
        json!({
            "short_revision": self.short_revision,
            "full_revision": self.full_revision,
            "timestamp": self.timestamp,
            "repo_status": self.repo_status.as_str(),
            "user": self.user,
            "host": self.host,
            "repo": self.repo,
        })
        .to_string()
    }
}
