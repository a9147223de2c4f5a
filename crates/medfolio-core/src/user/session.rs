use serde::{Deserialize, Serialize};

use super::model::User;

/// The authenticated session: an opaque bearer token and who it belongs to.
///
/// The token's expiry is server-defined; the client treats it as valid until
/// a request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}
