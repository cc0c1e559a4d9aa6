/// Document store port trait
///
/// Defines the query-building types and the interface for fetching documents.
/// Implementations: Firestore REST adapter, in-memory adapter
use crate::domain::value::{Document, DocumentReference, Value};
use crate::error::Result;
use async_trait::async_trait;

/// Sort direction of an ordering clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Ascending => write!(f, "asc"),
            Direction::Descending => write!(f, "desc"),
        }
    }
}

/// Comparison operator of a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    ArrayContains,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::In => "in",
            Operator::ArrayContains => "array-contains",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// One clause of a query, composed the way callers list them
#[derive(Debug, Clone, PartialEq)]
pub enum QueryConstraint {
    Where(Filter),
    OrderBy(OrderBy),
    Limit(u32),
}

/// Filter clause: `field op value`
pub fn where_field(field: &str, op: Operator, value: impl Into<Value>) -> QueryConstraint {
    QueryConstraint::Where(Filter {
        field: field.to_string(),
        op,
        value: value.into(),
    })
}

/// Ordering clause
pub fn order_by(field: &str, direction: Direction) -> QueryConstraint {
    QueryConstraint::OrderBy(OrderBy {
        field: field.to_string(),
        direction,
    })
}

pub fn limit(count: u32) -> QueryConstraint {
    QueryConstraint::Limit(count)
}

/// A query against a single collection
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u32>,
}

impl Query {
    /// Builds a query from its constraints. Orderings keep their listed
    /// precedence; a later limit replaces an earlier one.
    pub fn new(collection: &str, constraints: Vec<QueryConstraint>) -> Self {
        let mut query = Self {
            collection: collection.to_string(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        };
        for constraint in constraints {
            match constraint {
                QueryConstraint::Where(filter) => query.filters.push(filter),
                QueryConstraint::OrderBy(order) => query.order_by.push(order),
                QueryConstraint::Limit(count) => query.limit = Some(count),
            }
        }
        query
    }

    /// Whether the query orders by `field` in `direction`
    pub fn sorts_by(&self, field: &str, direction: Direction) -> bool {
        self.order_by
            .iter()
            .any(|o| o.field == field && o.direction == direction)
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection)?;
        for filter in &self.filters {
            write!(f, " where {} {} {:?}", filter.field, filter.op, filter.value)?;
        }
        for order in &self.order_by {
            write!(f, " order by {} {}", order.field, order.direction)?;
        }
        if let Some(count) = self.limit {
            write!(f, " limit {}", count)?;
        }
        Ok(())
    }
}

/// Port trait for document store operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStorePort: Send + Sync {
    /// Run a query, returning documents in the store's result order
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Fetch one document; `None` when it does not exist
    async fn get_document(&self, reference: &DocumentReference) -> Result<Option<Document>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_collects_constraints() {
        let query = Query::new(
            "session",
            vec![
                where_field(
                    "event_ref",
                    Operator::Equal,
                    DocumentReference::new("event", "e1"),
                ),
                order_by("session_index", Direction::Ascending),
                limit(10),
                limit(5),
            ],
        );

        assert_eq!(query.collection, "session");
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].op, Operator::Equal);
        assert!(query.sorts_by("session_index", Direction::Ascending));
        assert!(!query.sorts_by("session_index", Direction::Descending));
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_query_display() {
        let query = Query::new("body", vec![order_by("name", Direction::Ascending)]);
        assert_eq!(query.to_string(), "body order by name asc");
    }
}
