use async_trait::async_trait;

use super::encode::{authorization, basic_token};
use super::handler::AuthHandler;
use super::types::{Credentials, RequestContext};

pub const BASIC: &str = "Basic";

/// Basic authentication, always sent preemptively since the credentials do
/// not depend on the server.
#[derive(Debug, Clone)]
pub struct BasicAuthHandler {
    credentials: Credentials,
}

impl BasicAuthHandler {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn header(&self) -> String {
        authorization(BASIC, &basic_token(&self.credentials))
    }
}

#[async_trait]
impl AuthHandler for BasicAuthHandler {
    fn scheme_name(&self) -> &str {
        BASIC
    }

    async fn handle_challenge(&self, challenge: &str, _ctx: &RequestContext) -> Option<String> {
        if !self.can_handle(challenge) {
            return None;
        }
        Some(self.header())
    }

    fn preemptive_auth(&self, _ctx: &RequestContext) -> Option<String> {
        Some(self.header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use http::Method;

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, "/dav/file.txt")
    }

    #[tokio::test]
    async fn bob_secret() {
        let handler = BasicAuthHandler::new(Credentials::new("bob", "secret"));

        assert_eq!(
            handler.preemptive_auth(&ctx()).as_deref(),
            Some("Basic Ym9iOnNlY3JldA==")
        );
        assert_eq!(
            handler
                .handle_challenge("Basic realm=\"dav\"", &ctx())
                .await
                .as_deref(),
            Some("Basic Ym9iOnNlY3JldA==")
        );
    }

    #[tokio::test]
    async fn with_domain() {
        let handler = BasicAuthHandler::new(Credentials::new("bob", "secret").with_domain("WORK"));
        let expected = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("WORK\\bob:secret")
        );

        assert_eq!(handler.preemptive_auth(&ctx()), Some(expected.clone()));
        assert_eq!(handler.handle_challenge("basic", &ctx()).await, Some(expected));
    }

    #[tokio::test]
    async fn other_schemes() {
        let handler = BasicAuthHandler::new(Credentials::new("bob", "secret"));
        assert_eq!(handler.handle_challenge("NTLM", &ctx()).await, None);
        assert_eq!(
            handler.handle_challenge("Digest realm=\"x\"", &ctx()).await,
            None
        );
    }
}
