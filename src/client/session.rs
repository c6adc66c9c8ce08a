use super::storage::{LocalStorage, StorageError};
use crate::models::{AuthResponse, UserProfile};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "userInfo";

/// The signed-in user as remembered by the client between runs.
pub struct Session<S: LocalStorage> {
    storage: S,
    token: Option<String>,
    profile: Option<UserProfile>,
}

impl<S: LocalStorage> Session<S> {
    pub fn load(storage: S) -> Result<Self, StorageError> {
        let token = storage.get_item(TOKEN_KEY)?;
        let profile = match storage.get_item(USER_KEY)? {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };
        Ok(Session {
            storage,
            token,
            profile,
        })
    }

    /// Remembers the outcome of a successful register or login.
    pub fn sign_in(&mut self, response: AuthResponse) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, &response.token)?;
        self.storage
            .set_item(USER_KEY, &serde_json::to_string(&response.profile)?)?;
        self.token = Some(response.token);
        self.profile = Some(response.profile);
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)?;
        self.token = None;
        self.profile = None;
        Ok(())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// Value for the `Authorization` header on protected calls.
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStorage;
    use std::sync::Arc;

    fn response() -> AuthResponse {
        AuthResponse {
            profile: UserProfile {
                id: "u1".into(),
                name: "Jane".into(),
                email: "jane@example.com".into(),
                is_admin: false,
            },
            token: "abc.def.ghi".into(),
        }
    }

    #[test]
    fn sign_in_persists_across_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = Session::load(storage.clone()).unwrap();
        assert!(!session.is_signed_in());
        session.sign_in(response()).unwrap();

        let restored = Session::load(storage).unwrap();
        assert_eq!(restored.authorization_header().as_deref(), Some("Bearer abc.def.ghi"));
        assert_eq!(restored.profile().map(|p| p.id.as_str()), Some("u1"));
    }

    #[test]
    fn sign_out_forgets_everything() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = Session::load(storage.clone()).unwrap();
        session.sign_in(response()).unwrap();
        session.sign_out().unwrap();
        assert!(session.authorization_header().is_none());

        let restored = Session::load(storage).unwrap();
        assert!(!restored.is_signed_in());
        assert!(restored.profile().is_none());
    }
}
