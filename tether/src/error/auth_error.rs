//! Credential lookup errors.

use thiserror::Error;

/// Errors raised by an auth provider before the request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// None of the configured sources yielded a credential.
    #[error("missing credential: set one of {}", .env_vars.join(", "))]
    MissingCredential { env_vars: Vec<String> },

    /// A credential was found but cannot be used.
    #[error("invalid credential: {reason}")]
    InvalidCredential { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_lists_variables() {
        let err = AuthError::MissingCredential {
            env_vars: vec![
                "LAKECTL_CREDENTIALS_ACCESS_KEY_ID".into(),
                "LAKEFS_ACCESS_KEY_ID".into(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "missing credential: set one of LAKECTL_CREDENTIALS_ACCESS_KEY_ID, LAKEFS_ACCESS_KEY_ID"
        );
    }
}
