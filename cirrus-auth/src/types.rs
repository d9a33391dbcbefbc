use std::collections::BTreeMap;
use std::fmt;

use http::Method;

use super::error::AuthError;

/// The request an `Authorization` header is computed for. Digest and NTLM
/// sign the method and the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    pub uri: String,
}

impl RequestContext {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Windows domain, sent as `DOMAIN\username`
    pub domain: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn user_part(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}\\{}", domain, self.username),
            None => self.username.clone(),
        }
    }
}

// Keep the password out of the logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// A decoded `WWW-Authenticate` challenge.
///
/// ```text
/// challenge   = auth-scheme [ 1*SP ( token68 / #auth-param ) ]
/// auth-param  = token BWS "=" BWS ( token / quoted-string )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Challenge {
    pub scheme: String,
    pub token68: Option<String>,
    /// Parameter names are lower-cased, quoted values unescaped
    pub params: BTreeMap<String, String>,
}

impl Challenge {
    pub fn is_scheme(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// RFC 7616, 3.3. The WWW-Authenticate Response Header Field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    /// `auth`, `auth-int`, empty for the RFC 2069 compatibility mode
    pub qop: Vec<String>,
    pub algorithm: Option<String>,
    pub opaque: Option<String>,
    pub stale: bool,
    /// Any other parameter (domain, charset, userhash...)
    pub other: BTreeMap<String, String>,
}

impl TryFrom<Challenge> for DigestChallenge {
    type Error = AuthError;

    fn try_from(mut chal: Challenge) -> Result<Self, Self::Error> {
        if !chal.is_scheme("digest") {
            return Err(AuthError::Challenge(chal.scheme));
        }

        let realm = chal
            .params
            .remove("realm")
            .ok_or(AuthError::MissingParameter("realm"))?;
        let nonce = chal
            .params
            .remove("nonce")
            .ok_or(AuthError::MissingParameter("nonce"))?;
        let qop = chal
            .params
            .remove("qop")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let stale = chal
            .params
            .remove("stale")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            realm,
            nonce,
            qop,
            algorithm: chal.params.remove("algorithm"),
            opaque: chal.params.remove("opaque"),
            stale,
            other: chal.params,
        })
    }
}
