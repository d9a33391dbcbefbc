use async_trait::async_trait;
use futures::future::BoxFuture;

use super::handler::{contains_ignore_case, AuthHandler};
use super::types::RequestContext;

type CanHandleFn = Box<dyn Fn(&str) -> bool + Send + Sync>;
type HandleFn =
    Box<dyn Fn(String, RequestContext) -> BoxFuture<'static, Option<String>> + Send + Sync>;
type PreemptiveFn = Box<dyn Fn(&RequestContext) -> Option<String> + Send + Sync>;

/// A scheme implemented by the caller, eg. a bearer token fetched from an
/// identity provider.
///
/// Unless overridden, `can_handle` matches the scheme name and nothing is
/// sent preemptively.
pub struct CustomAuthHandler {
    scheme: String,
    can_handle: Option<CanHandleFn>,
    handle: HandleFn,
    preemptive: Option<PreemptiveFn>,
}

impl CustomAuthHandler {
    pub fn new<F>(scheme: impl Into<String>, handle: F) -> Self
    where
        F: Fn(String, RequestContext) -> BoxFuture<'static, Option<String>> + Send + Sync + 'static,
    {
        Self {
            scheme: scheme.into(),
            can_handle: None,
            handle: Box::new(handle),
            preemptive: None,
        }
    }

    pub fn with_can_handle<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.can_handle = Some(Box::new(f));
        self
    }

    pub fn with_preemptive<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext) -> Option<String> + Send + Sync + 'static,
    {
        self.preemptive = Some(Box::new(f));
        self
    }
}

#[async_trait]
impl AuthHandler for CustomAuthHandler {
    fn scheme_name(&self) -> &str {
        &self.scheme
    }

    fn can_handle(&self, challenge: &str) -> bool {
        match &self.can_handle {
            Some(f) => f(challenge),
            None => contains_ignore_case(challenge, &self.scheme),
        }
    }

    async fn handle_challenge(&self, challenge: &str, ctx: &RequestContext) -> Option<String> {
        if !self.can_handle(challenge) {
            return None;
        }
        (self.handle)(challenge.to_string(), ctx.clone()).await
    }

    fn preemptive_auth(&self, ctx: &RequestContext) -> Option<String> {
        self.preemptive.as_ref().and_then(|f| f(ctx))
    }
}
