use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer credential for the storage API.
///
/// `Debug` never prints the secret so tokens can sit inside logged structs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Result of a successful code exchange at the provider.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access_token: AccessToken,
    /// Provider account identifier; empty when the provider did not return one.
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_secret() {
        let token = AccessToken::new("sl.very-secret");
        assert_eq!(format!("{:?}", token), "AccessToken([redacted])");
        assert_eq!(token.secret(), "sl.very-secret");
    }
}
