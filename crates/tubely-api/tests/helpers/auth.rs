//! Auth test helpers: bearer tokens for synthetic users.

use super::TestApp;
use chrono::Duration;
use uuid::Uuid;

/// A caller with a valid token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn test_user(app: &TestApp) -> TestUser {
    let id = Uuid::new_v4();
    let token = app
        .state
        .jwt
        .issue_token(id, Duration::minutes(15))
        .expect("Failed to issue token");
    TestUser { id, token }
}

/// Token that expired a minute ago.
pub fn expired_token(app: &TestApp) -> String {
    app.state
        .jwt
        .issue_token(Uuid::new_v4(), Duration::minutes(-1))
        .expect("Failed to issue token")
}
