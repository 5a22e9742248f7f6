pub mod game;
pub mod session;
pub mod state_machine;
pub mod status;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::dao::session::SessionRepository;

pub use self::session::{CorrectRegistration, PuzzleSession};
pub use self::state_machine::{LoadOutcome, LoadTicket, SessionManager, SessionPhase, Snapshot};
pub use self::status::{GameRules, SessionStatus, derive_status};

/// Session manager shared between the load path and the guess path.
pub type SharedSession = Arc<RwLock<SessionManager>>;

/// Construct a shared manager in the loading phase.
pub fn shared_session(repository: SessionRepository, rules: GameRules) -> SharedSession {
    Arc::new(RwLock::new(SessionManager::new(repository, rules)))
}
