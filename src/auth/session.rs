// Session expiry hook

/// Invoked after credentials are wiped because the session cannot be recovered
pub trait SessionExpiredHandler: Send + Sync {
    fn on_session_expired(&self);
}

impl<F> SessionExpiredHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_session_expired(&self) {
        self()
    }
}

/// Sends the user back to the authentication entry point
pub struct LoginRedirect {
    login_url: String,
}

impl LoginRedirect {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

impl SessionExpiredHandler for LoginRedirect {
    fn on_session_expired(&self) {
        tracing::warn!(
            login_url = %self.login_url,
            "Session expired, re-authentication required"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = move || {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        handler.on_session_expired();
        handler.on_session_expired();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_login_redirect_target() {
        let redirect = LoginRedirect::new("/auth.html");
        assert_eq!(redirect.login_url(), "/auth.html");
        redirect.on_session_expired();
    }
}
