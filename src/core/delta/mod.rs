// src/core/delta/mod.rs

//! Delta connections, their replay implementation, and the historical log store.

pub mod connection;
pub mod replay;
pub mod storage;

pub use connection::{DeltaConnection, DeltaEvent, DeltaEventStream};
pub use replay::{ReplayDeltaConnection, ReplayPhase, ReplayProgress, ReplayWindow};
pub use storage::{DeltaStorageService, HttpDeltaStorage, InMemoryDeltaStorage};
