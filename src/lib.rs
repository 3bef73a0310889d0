//! Taskboard: a task-management backend.
//!
//! Users register, create tasks, attach labels, and query tasks with
//! pagination, filtering, and search. Tasks only move forward through
//! `OPEN`, `IN_PROGRESS`, and `DONE`, and label updates are reconciled by
//! case-insensitive name so that each task keeps one label per name.
//!
//! # Architecture
//!
//! Each aggregate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and hashing
//! - **Adapters**: In-memory and `PostgreSQL` implementations of ports
//! - **Services**: Orchestration over ports
//!
//! # Modules
//!
//! - [`task`]: Tasks, labels, the status guard, and task listing
//! - [`user`]: Registration, password hashing, and authentication
//! - [`http`]: axum router and JSON mapping
//! - [`config`]: Environment-driven configuration
//! - [`storage`]: `PostgreSQL` pool and schema bootstrap
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod http;
pub mod storage;
pub mod task;
pub mod telemetry;
pub mod user;
