/// Port trait definitions (interfaces)
///
/// These traits define the contracts for adapters to implement.
/// Following the ports-and-adapters (hexagonal) architecture pattern.
pub mod document_store;

#[cfg(test)]
pub mod mocks;

pub use document_store::{
    limit, order_by, where_field, Direction, DocumentStorePort, Filter, Operator, OrderBy, Query,
    QueryConstraint,
};
