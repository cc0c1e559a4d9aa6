/// Adapters - concrete implementations of the port traits
///
/// These modules implement the port traits for specific document stores.
pub mod store;
