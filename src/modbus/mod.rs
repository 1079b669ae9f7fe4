//! Modbus protocol handling
//!
//! Modbus/TCP link to a SymbCtrl controller and the worker that polls it

pub mod client;
pub mod worker;

pub use client::{DeviceLink, ModbusError, TcpLink};
pub use worker::{Worker, MAX_READ_REGISTERS};
