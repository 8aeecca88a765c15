//! Client for the app's testing API
//!
//! Every scenario starts from the same state: the backend is emptied through
//! `POST /api/testing/reset` and the seed users are recreated through
//! `POST /api/users`. Nothing is retried; a failed request aborts the scenario
//! before the browser is launched.

use std::time::Duration;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::model::SeedUser;

pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> E2eResult<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Remove all users and blogs
    pub async fn reset(&self) -> E2eResult<()> {
        let url = format!("{}/api/testing/reset", self.base_url);
        let resp = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| E2eError::Setup(format!("POST {} failed: {}", url, e)))?;

        if !resp.status().is_success() {
            return Err(E2eError::Setup(format!("POST {} returned {}", url, resp.status())));
        }

        debug!("Backend state reset");
        Ok(())
    }

    /// Create a user through the public API
    pub async fn create_user(&self, user: &SeedUser) -> E2eResult<()> {
        let url = format!("{}/api/users", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(user)
            .send()
            .await
            .map_err(|e| E2eError::Setup(format!("POST {} failed: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(E2eError::Setup(format!(
                "creating user '{}' returned {}: {}",
                user.username,
                status,
                body.trim()
            )));
        }

        debug!("Seeded user {}", user.username);
        Ok(())
    }

    /// Reset, then seed the primary user followed by any extra users
    pub async fn prepare(&self, primary: &SeedUser, extra: &[SeedUser]) -> E2eResult<()> {
        self.reset().await?;
        self.create_user(primary).await?;
        for user in extra {
            self.create_user(user).await?;
        }
        info!("Backend ready with {} user(s)", 1 + extra.len());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn client(url: &str) -> BackendClient {
        BackendClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_prepare_resets_then_seeds() {
        let state = stub::Shared::default();
        let url = stub::spawn(state.clone()).await;
        let backend = client(&url);

        backend.prepare(&SeedUser::primary(), &[SeedUser::secondary()]).await.unwrap();

        let s = state.lock().unwrap();
        assert_eq!(s.calls, vec!["reset", "user:john", "user:jane"]);
        assert_eq!(s.users.len(), 2);
    }

    #[tokio::test]
    async fn test_prepare_is_repeatable() {
        let state = stub::Shared::default();
        let url = stub::spawn(state.clone()).await;
        let backend = client(&url);

        backend.prepare(&SeedUser::primary(), &[]).await.unwrap();
        backend.prepare(&SeedUser::primary(), &[]).await.unwrap();

        assert_eq!(state.lock().unwrap().calls, vec!["reset", "user:john", "reset", "user:john"]);
    }

    #[tokio::test]
    async fn test_duplicate_user_is_setup_failure() {
        let state = stub::Shared::default();
        let url = stub::spawn(state.clone()).await;
        let backend = client(&url);

        backend.create_user(&SeedUser::primary()).await.unwrap();
        let err = backend.create_user(&SeedUser::primary()).await.unwrap_err();

        assert!(err.is_setup());
        assert!(err.to_string().contains("unique"), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_failed_reset_skips_seeding() {
        let state = Arc::new(Mutex::new(stub::StubState {
            fail_reset: true,
            ..Default::default()
        }));
        let url = stub::spawn(state.clone()).await;
        let backend = client(&url);

        let err = backend.prepare(&SeedUser::primary(), &[]).await.unwrap_err();

        assert!(matches!(err, E2eError::Setup(_)));
        assert_eq!(state.lock().unwrap().calls, vec!["reset"]);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_setup_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = client(&format!("http://{}/", addr));
        assert_eq!(backend.base_url(), format!("http://{}", addr));

        let err = backend.reset().await.unwrap_err();
        assert!(err.is_setup());
    }
}
