use http::header::{HeaderMap, WWW_AUTHENTICATE};

use super::handler::AuthHandler;
use super::types::RequestContext;

/// The handlers a client is willing to use, by order of preference.
pub struct AuthChain {
    handlers: Vec<Box<dyn AuthHandler>>,
    preemptive: bool,
}

impl Default for AuthChain {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthChain {
    pub fn new() -> Self {
        Self {
            handlers: vec![],
            preemptive: true,
        }
    }

    pub fn with(mut self, handler: impl AuthHandler + 'static) -> Self {
        self.push(Box::new(handler));
        self
    }

    pub fn push(&mut self, handler: Box<dyn AuthHandler>) {
        self.handlers.push(handler);
    }

    /// Do not send anything before the server asks for it
    pub fn without_preemptive(mut self) -> Self {
        self.preemptive = false;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn schemes(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.scheme_name()).collect()
    }

    /// Answer the first challenge we can, trying the handlers in order.
    pub async fn authorize<S: AsRef<str>>(
        &self,
        challenges: &[S],
        ctx: &RequestContext,
    ) -> Option<String> {
        for handler in self.handlers.iter() {
            for challenge in challenges.iter().map(AsRef::as_ref) {
                if !handler.can_handle(challenge) {
                    continue;
                }
                if let Some(header) = handler.handle_challenge(challenge, ctx).await {
                    tracing::debug!(scheme = handler.scheme_name(), "challenge answered");
                    return Some(header);
                }
            }
        }

        tracing::debug!(
            offered = challenges.len(),
            schemes = ?self.schemes(),
            "no handler could answer the challenges"
        );
        None
    }

    pub fn preemptive(&self, ctx: &RequestContext) -> Option<String> {
        if !self.preemptive {
            return None;
        }
        self.handlers.iter().find_map(|h| h.preemptive_auth(ctx))
    }
}

/// Every `WWW-Authenticate` value of a response, in order. Values that are
/// not valid strings are skipped.
pub fn www_authenticate(headers: &HeaderMap) -> Vec<&str> {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect()
}
