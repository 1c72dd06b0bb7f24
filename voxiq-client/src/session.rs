//! Authenticated session
//!
//! The session is an explicitly constructed object passed by reference
//! to the components that need it: `establish` verifies the token with
//! the backend and loads the current user. There is no ambient global
//! session state; dropping the session is its teardown.

use crate::api::ApiClient;
use voxiq_common::api::UserResponse;
use voxiq_common::Result;

/// Verified identity plus the bearer token for subsequent calls
#[derive(Debug, Clone)]
pub struct Session {
    user: UserResponse,
    token: String,
}

impl Session {
    /// Verify `token` against the backend and load the current user
    pub async fn establish(api: &ApiClient, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let user = api.verify_token(&token).await?;
        tracing::debug!(user = %user.email, plan = %user.plan, "session established");
        Ok(Self { user, token })
    }

    pub fn user(&self) -> &UserResponse {
        &self.user
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Re-fetch the current user (plan changes, profile edits)
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<()> {
        self.user = api.me(&self.token).await?;
        Ok(())
    }
}
