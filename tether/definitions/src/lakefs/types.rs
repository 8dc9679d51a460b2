//! lakeFS configuration API types.
//!
//! Field names are the lakeFS wire names; the few that are not snake_case
//! carry a serde rename.

use serde::{Deserialize, Serialize};

// =============================================================================
// Shared
// =============================================================================

/// Error body returned by lakeFS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Error {
    pub message: String,
}

// =============================================================================
// Server configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbageCollectionConfig {
    /// Seconds that uncommitted objects are kept before collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_recommended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_url: Option<String>,
}

/// Blockstore capabilities of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `s3`, `gs`, `azure`, `local`, ...
    pub blockstore_type: String,
    pub blockstore_namespace_example: String,
    #[serde(rename = "blockstore_namespace_ValidityRegex")]
    pub blockstore_namespace_validity_regex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace_prefix: Option<String>,
    pub pre_sign_support: bool,
    pub pre_sign_support_ui: bool,
    pub import_support: bool,
    pub import_validity_regex: String,
}

// =============================================================================
// Setup
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationState {
    Initialized,
    NotInitialized,
}

/// Authorization model the server runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rbac {
    None,
    Simplified,
    External,
    Internal,
}

/// How the web UI logs users in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(rename = "RBAC", default, skip_serializing_if = "Option::is_none")]
    pub rbac: Option<Rbac>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_ui_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_ui_placeholder: Option<String>,
    pub login_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_failed_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_login_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_login_label: Option<String>,
    pub login_cookie_names: Vec<String>,
    pub logout_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<InstallationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comm_prefs_missing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_config: Option<LoginConfig>,
}

impl SetupState {
    pub fn is_initialized(&self) -> bool {
        self.state == Some(InstallationState::Initialized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeyCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Body of `POST /setup_lakefs`.
///
/// Without `key` the server generates the admin credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<AccessKeyCredentials>,
}

impl Setup {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            key: None,
        }
    }

    pub fn with_key(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.key = Some(AccessKeyCredentials {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        });
        self
    }
}

/// Admin credentials returned by setup. The secret is only ever shown once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsWithSecret {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Unix seconds.
    pub creation_date: i64,
}

impl std::fmt::Debug for CredentialsWithSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsWithSecret")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("creation_date", &self.creation_date)
            .finish()
    }
}

/// Body of `POST /setup_comm_prefs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommPrefsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub feature_updates: bool,
    pub security_updates: bool,
}
