//! Seqkit - order-preserving aggregation of async tasks.
//!
//! The centerpiece is [`future::aggregate`]: it waits on a list of tasks,
//! some plain values and some pending computations, and yields their values
//! in input order, or the first error any of them produces.
//!
//! ```no_run
//! use seqkit::future::{aggregate, Pending, Task};
//! use std::time::Duration;
//!
//! # async fn demo() {
//! let tasks: Vec<Task<&str, ()>> = vec![
//!     Pending::resolved("a").into(),
//!     Task::ready("b"),
//!     Pending::after(Duration::from_millis(20), Ok("c")).into(),
//! ];
//! assert_eq!(aggregate(tasks).await, Ok(vec!["a", "b", "c"]));
//! # }
//! ```
//!
//! Alongside it live the sequence utilities in [`seq`], partial application
//! in [`bind`], and the scenario runner behind the `seqkit` binary.

pub mod bind;
pub mod error;
pub mod future;
pub mod models;
pub mod report;
pub mod scenario;
pub mod seq;

pub use error::{SeqError, TaskFailure};
pub use future::{aggregate, aggregate_optional, Aggregate, Pending, Resolver, Task};
pub use seq::Seq;
