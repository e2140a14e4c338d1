//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Vacuum: sweeps expired and strategy-marked entries at configured
//!   intervals and keeps the durable tier free of lapsed entries

mod vacuum;

pub use vacuum::spawn_vacuum_task;
