use serde::{Deserialize, Serialize};

/// Account backend a session was authenticated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Mojang,
    Crucible,
}

impl AccountKind {
    /// Crucible accounts are relaunched through the bundled helper so the
    /// access token never appears in the visible OS argument list.
    pub fn hides_token(&self) -> bool {
        matches!(self, AccountKind::Crucible)
    }
}

/// The authenticated identity handed to the launched game. Read-only from
/// the launch core; the session client owns refresh and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    /// Selected player profile id (uuid).
    pub profile_id: String,
    pub access_token: String,
    pub display_name: String,
    pub kind: AccountKind,
}
