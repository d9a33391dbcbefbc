use async_trait::async_trait;

use super::encode::authorization;
use super::error::AuthError;
use super::handler::AuthHandler;
use super::types::RequestContext;

pub const NTLM: &str = "NTLM";

/// Produces the base64 encoded NTLM messages.
///
/// The cryptography lives outside of this crate, the handler only drives the
/// exchange.
pub trait NtlmEngine: Send + Sync {
    /// Negotiate message, sent in answer to a bare `NTLM` challenge
    fn type1_message(&self) -> Result<String, AuthError>;

    /// Authenticate message computed from the server's challenge message
    fn type3_message(&self, type2_challenge: &str) -> Result<String, AuthError>;
}

/// Where a challenge stands in the NTLM handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtlmRound<'a> {
    /// `NTLM` alone: the server asks for a negotiate message
    Negotiate,
    /// `NTLM <type2>`: the server sent its challenge message
    Authenticate(&'a str),
    Unsupported,
}

impl<'a> NtlmRound<'a> {
    pub fn of(challenge: &'a str) -> Self {
        if challenge.eq_ignore_ascii_case("ntlm") {
            return Self::Negotiate;
        }
        match challenge.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("ntlm ") => {
                Self::Authenticate(&challenge[5..])
            }
            _ => Self::Unsupported,
        }
    }
}

/// Two rounds NTLM handshake. No state is kept between the rounds, the
/// round is deduced from the challenge alone. Never preemptive.
pub struct NtlmAuthHandler<E: NtlmEngine> {
    engine: E,
}

impl<E: NtlmEngine> NtlmAuthHandler<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<E: NtlmEngine> AuthHandler for NtlmAuthHandler<E> {
    fn scheme_name(&self) -> &str {
        NTLM
    }

    async fn handle_challenge(&self, challenge: &str, _ctx: &RequestContext) -> Option<String> {
        if !self.can_handle(challenge) {
            return None;
        }

        let message = match NtlmRound::of(challenge) {
            NtlmRound::Negotiate => self.engine.type1_message(),
            NtlmRound::Authenticate(type2) => self.engine.type3_message(type2),
            NtlmRound::Unsupported => {
                tracing::debug!(challenge = challenge, "not an NTLM handshake round");
                return None;
            }
        };

        match message {
            Ok(msg) => Some(authorization(NTLM, &msg)),
            Err(err) => {
                tracing::warn!(err=%err, "NTLM engine failed");
                None
            }
        }
    }

    fn preemptive_auth(&self, _ctx: &RequestContext) -> Option<String> {
        None
    }
}
