//! Persistence for accounts, houses and flats.
//!
//! Two backends implement the store traits:
//! - **Memory**: everything behind one lock, used by tests and throwaway runs
//! - **Turso/SQLite**: libsql, either a local file or a remote Turso database
//!   (the latter behind the `turso` feature)

pub mod memory;
pub mod traits;
pub mod turso;

pub use memory::MemoryStore;
pub use traits::{CredentialStore, DatabaseProvider, FlatStore, HouseStore, Stores};
pub use turso::TursoClient;
