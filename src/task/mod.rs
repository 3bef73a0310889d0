//! Task management for the taskboard service.
//!
//! Tasks move forward through `OPEN`, `IN_PROGRESS`, and `DONE` and carry a
//! set of labels unique by case-insensitive name. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
