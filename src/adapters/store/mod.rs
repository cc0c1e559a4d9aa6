//! Document store adapters
//!
//! - Firestore: REST API (`documents:runQuery`, document GET)
//! - Memory: in-process collections, loadable from a JSON fixture

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
