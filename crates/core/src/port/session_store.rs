// Session Store Port

use crate::domain::PersistedSession;
use crate::error::Result;

/// Local persistence for the authenticated flag and remembered username
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Load persisted state (default state when nothing was saved yet)
    fn load(&self) -> Result<PersistedSession>;

    /// Replace persisted state
    fn save(&self, session: &PersistedSession) -> Result<()>;
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store
    #[derive(Default)]
    pub struct MemorySessionStore {
        state: Mutex<PersistedSession>,
    }

    impl MemorySessionStore {
        pub fn with_state(state: PersistedSession) -> Self {
            Self {
                state: Mutex::new(state),
            }
        }

        pub fn snapshot(&self) -> PersistedSession {
            self.state.lock().unwrap().clone()
        }
    }

    impl SessionStore for MemorySessionStore {
        fn load(&self) -> Result<PersistedSession> {
            Ok(self.state.lock().unwrap().clone())
        }

        fn save(&self, session: &PersistedSession) -> Result<()> {
            *self.state.lock().unwrap() = session.clone();
            Ok(())
        }
    }
}
