//! Pending computations and their aggregation.

pub mod aggregate;
pub mod pending;

pub use aggregate::{aggregate, aggregate_optional, Aggregate, Task};
pub use pending::{channel, Pending, Resolver, SharedPending};
