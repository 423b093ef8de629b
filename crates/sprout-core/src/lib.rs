//! # Sprout Core Library
//!
//! Business logic for the Sprout pomodoro timer. The terminal binary is a
//! thin layer over this crate: it reads snapshots and sends commands, and
//! everything else lives here.
//!
//! ## Architecture
//!
//! - **Pomodoro Engine**: a synchronous state machine over mode, running flag
//!   and remaining seconds. The caller invokes `tick()` once per second.
//! - **Tick Driver**: an async task that owns the engine and keeps exactly one
//!   one-second ticker alive while the engine is running.
//! - **Storage**: best-effort preference store (SQLite key-value table or
//!   in-memory map) and TOML-based configuration.
//! - **Display**: clock formatting, labels and the sprout growth stage.
//!
//! ## Key Components
//!
//! - [`PomodoroEngine`]: countdown/mode state machine
//! - [`TimerDriver`] / [`TimerHandle`]: tick source and command surface
//! - [`Preferences`]: non-throwing `load`/`save` over a [`KvBackend`]
//! - [`Config`]: application configuration management

pub mod display;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError};
pub use events::{Event, Snapshot};
pub use storage::{Config, Database, KvBackend, MemoryKv, Preferences};
pub use timer::{Command, Mode, PomodoroEngine, TimerDriver, TimerHandle, MODE_KEY};
