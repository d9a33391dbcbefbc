use serde::Deserialize;

use super::basic::BasicAuthHandler;
use super::error::AuthError;
use super::flow::AuthChain;
use super::types::Credentials;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Basic,
    Ntlm,
    Digest,
}

/// ```toml
/// scheme = "basic"
/// username = "bob"
/// password = "secret"
/// domain = "WORK"
/// preemptive = true
/// ```
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub scheme: Scheme,
    pub username: String,
    pub password: String,
    pub domain: Option<String>,
    #[serde(default)]
    pub preemptive: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("scheme", &self.scheme)
            .field("credentials", &self.credentials())
            .field("preemptive", &self.preemptive)
            .finish()
    }
}

impl AuthConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, AuthError> {
        let config: Self = toml::from_str(src)?;
        tracing::debug!(
            scheme=?config.scheme,
            preemptive = config.preemptive,
            "loaded authentication config"
        );
        Ok(config)
    }

    /// For the NTLM and Digest engines
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            domain: self.domain.clone(),
        }
    }

    /// A chain for the configured scheme. Only Basic can be built from the
    /// configuration alone, the other schemes need an engine.
    pub fn chain(&self) -> Result<AuthChain, AuthError> {
        let chain = match self.scheme {
            Scheme::Basic => AuthChain::new().with(BasicAuthHandler::new(self.credentials())),
            Scheme::Ntlm => return Err(AuthError::EngineRequired("NTLM".into())),
            Scheme::Digest => return Err(AuthError::EngineRequired("Digest".into())),
        };
        match self.preemptive {
            true => Ok(chain),
            false => Ok(chain.without_preemptive()),
        }
    }
}
