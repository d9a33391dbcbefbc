use async_trait::async_trait;

use super::types::RequestContext;

/// Computes the `Authorization` header for one authentication scheme.
///
/// Handlers are shared between requests and never keep state about a
/// negotiation in progress: the whole round is carried by the challenge.
#[async_trait]
pub trait AuthHandler: Send + Sync {
    /// Canonical name of the scheme, eg. `Basic` or `NTLM`
    fn scheme_name(&self) -> &str;

    fn can_handle(&self, challenge: &str) -> bool {
        contains_ignore_case(challenge, self.scheme_name())
    }

    /// The header answering this challenge, `None` when the challenge is
    /// not for this scheme or can not be answered.
    async fn handle_challenge(&self, challenge: &str, ctx: &RequestContext) -> Option<String>;

    /// The header to send before any challenge was received
    fn preemptive_auth(&self, ctx: &RequestContext) -> Option<String>;
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
