use async_trait::async_trait;

use super::decode;
use super::encode::authorization;
use super::error::AuthError;
use super::handler::AuthHandler;
use super::types::{DigestChallenge, RequestContext};

pub const DIGEST: &str = "Digest";

/// Computes the parameters of a Digest `Authorization` header, everything
/// after the `Digest ` prefix (username, realm, nonce, uri, response...).
pub trait DigestEngine: Send + Sync {
    fn respond(
        &self,
        challenge: &DigestChallenge,
        ctx: &RequestContext,
    ) -> Result<String, AuthError>;
}

/// Digest authentication. The challenge is decoded here, the hashing is left
/// to the engine. Never preemptive: a nonce is needed.
pub struct DigestAuthHandler<E: DigestEngine> {
    engine: E,
}

impl<E: DigestEngine> DigestAuthHandler<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    fn answer(&self, challenge: &str, ctx: &RequestContext) -> Result<String, AuthError> {
        let chal = DigestChallenge::try_from(decode::challenge(challenge)?)?;
        tracing::debug!(realm = %chal.realm, stale = chal.stale, "answering digest challenge");
        let token = self.engine.respond(&chal, ctx)?;
        Ok(authorization(DIGEST, &token))
    }
}

#[async_trait]
impl<E: DigestEngine> AuthHandler for DigestAuthHandler<E> {
    fn scheme_name(&self) -> &str {
        DIGEST
    }

    async fn handle_challenge(&self, challenge: &str, ctx: &RequestContext) -> Option<String> {
        if !self.can_handle(challenge) {
            return None;
        }

        match self.answer(challenge, ctx) {
            Ok(header) => Some(header),
            Err(err) => {
                tracing::warn!(err=%err, "unable to answer the digest challenge");
                None
            }
        }
    }

    fn preemptive_auth(&self, _ctx: &RequestContext) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    /// Echoes what it was given instead of hashing
    struct EchoEngine;
    impl DigestEngine for EchoEngine {
        fn respond(
            &self,
            chal: &DigestChallenge,
            ctx: &RequestContext,
        ) -> Result<String, AuthError> {
            Ok(format!(
                r#"realm="{}", nonce="{}", uri="{}", method="{}", qop={}"#,
                chal.realm,
                chal.nonce,
                ctx.uri,
                ctx.method,
                chal.qop.join("|"),
            ))
        }
    }

    #[tokio::test]
    async fn delegates_to_engine() {
        let handler = DigestAuthHandler::new(EchoEngine);
        let ctx = RequestContext::new(Method::PUT, "/dav/notes.txt");

        assert_eq!(
            handler
                .handle_challenge(
                    r#"Digest realm="dav@example.org", qop="auth,auth-int", nonce="abc""#,
                    &ctx
                )
                .await
                .as_deref(),
            Some(r#"Digest realm="dav@example.org", nonce="abc", uri="/dav/notes.txt", method="PUT", qop=auth|auth-int"#)
        );
    }

    #[tokio::test]
    async fn unusable_challenges() {
        let handler = DigestAuthHandler::new(EchoEngine);
        let ctx = RequestContext::new(Method::GET, "/");

        assert_eq!(handler.handle_challenge("Basic realm=\"x\"", &ctx).await, None);
        // no nonce
        assert_eq!(
            handler.handle_challenge("Digest realm=\"x\"", &ctx).await,
            None
        );
        // not a challenge
        assert_eq!(handler.handle_challenge("digest \"", &ctx).await, None);
        assert_eq!(handler.preemptive_auth(&ctx), None);
    }
}
