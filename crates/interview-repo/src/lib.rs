//! Persistence layer (spec §4.2, §6, §7): repository traits plus a SQLite
//! and an in-memory implementation. Every write is a standalone,
//! independently-committed statement or transaction — there is no
//! cross-repository transaction spanning a whole turn, matching spec §7's
//! "each write is its own transaction" error-handling stance.

mod error;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use error::{RepoError, Result};
pub use memory::InMemoryRepositories;
pub use sqlite::SqliteRepositories;
pub use traits::{
    CanonicalRepository, NodeStateRepository, Repositories, ScoringRepository,
    SessionRepository, SurfaceGraphRepository, UtteranceRepository,
};
