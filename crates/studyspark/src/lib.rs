//! StudySpark - test-range planning and problem-set tracking.
//!
//! The core is [`generator::generate_tasks`]: given a start and an end
//! section of a problem book, it produces one task per problem in between.
//! Everything else keeps state around that list: the stepped range picker,
//! the checklist, the goal wizard, the countdown calendar, the coach talk
//! room and the key-value store the records are saved in.

pub mod calendar;
pub mod catalog;
pub mod checklist;
pub mod config;
pub mod db;
pub mod generator;
pub mod goal;
pub mod picker;
pub mod profile;
pub mod prompt;
pub mod range;
pub mod store;
pub mod talk;
pub mod types;

pub use catalog::{Catalog, ALGEBRA_1};
pub use generator::generate_tasks;
pub use range::{select_range, RangeEndpoint, RangeError, RangeSelection};
pub use types::{Task, TaskStatus};
