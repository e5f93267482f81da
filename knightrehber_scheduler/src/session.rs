use std::sync::{PoisonError, RwLock};

use knightrehber_models::user::{SessionUser, UserId};

pub trait SessionProvider: Send + Sync + 'static {
    fn current_user(&self) -> Option<SessionUser>;
}

#[derive(Default)]
pub struct InMemorySession {
    user: RwLock<Option<SessionUser>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user_id: UserId) -> SessionUser {
        let user = SessionUser::registered(user_id);
        self.replace(Some(user.clone()));
        user
    }

    pub fn continue_as_guest(&self) -> SessionUser {
        let user = SessionUser::guest();
        self.replace(Some(user.clone()));
        user
    }

    /// Returns the user that was signed in, if any.
    pub fn sign_out(&self) -> Option<SessionUser> {
        self.replace(None)
    }

    fn replace(&self, user: Option<SessionUser>) -> Option<SessionUser> {
        let mut current = self.user.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, user)
    }
}

impl SessionProvider for InMemorySession {
    fn current_user(&self) -> Option<SessionUser> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_lifecycle() {
        let session = InMemorySession::new();
        assert_eq!(session.current_user(), None);

        session.continue_as_guest();
        assert!(session.current_user().unwrap().is_guest);

        session.sign_in(UserId::new("1712"));
        let user = session.current_user().unwrap();
        assert_eq!(user.id, UserId::new("1712"));
        assert!(user.can_use_alarms());

        assert_eq!(session.sign_out(), Some(user));
        assert_eq!(session.current_user(), None);
    }
}
