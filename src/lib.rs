//! symbscan - SymbCtrl Register Scanner Library
//!
//! Keeps a live, continuously refreshed mirror of a SymbCtrl aquaculture
//! controller's coils and holding registers over Modbus/TCP. Reads and writes
//! go through the in-memory mirror; a background worker owns the network.

pub mod block;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod metrics;
pub mod modbus;
pub mod scanner;

pub use catalog::{AccessMode, Catalog, Register, UnitRef};
pub use codec::{Value, WireType};
pub use error::{DeviceFault, ErrorCode, ScanError};
pub use scanner::Scanner;
