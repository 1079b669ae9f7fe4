//! Error taxonomy for the scanner
//!
//! Every façade call resolves to exactly one [`ErrorCode`]. The most recent
//! outcome is kept by the [`Scanner`](crate::scanner::Scanner) so text-oriented
//! callers can poll `error()` / `message()` after each call.

use serde::Serialize;
use thiserror::Error;

/// Flat classification of a call result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    None,
    InvalidAddress,
    AlreadyOpen,
    NotOpen,
    CommFailure,
    ReadFailure,
    WriteFailure,
    QueueFull,
    QueueBusy,
    BadRegisterName,
    NotReadable,
    NotWritable,
    BadValue,
    StaleData,
    WorkerSpawn,
}

/// Error type for scanner operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Illegal IP address {0}")]
    InvalidAddress(String),
    #[error("Controller already open")]
    AlreadyOpen,
    #[error("Controller is not open")]
    NotOpen,
    #[error("Unable to open controller session")]
    CommFailure,
    #[error("Unable to read controller registers")]
    ReadFailure,
    #[error("Unable to write controller registers")]
    WriteFailure,
    #[error("Controller write buffer full")]
    QueueFull,
    #[error("Controller write queue busy")]
    QueueBusy,
    #[error("Bad register name {0}")]
    BadRegisterName(String),
    #[error("Register {0} not readable")]
    NotReadable(String),
    #[error("Register {0} not writable")]
    NotWritable(String),
    #[error("Bad value for {register}: {reason}")]
    BadValue { register: String, reason: String },
    #[error("No recent data from controller")]
    StaleData,
    #[error("Unable to start scanner worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

impl ScanError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScanError::InvalidAddress(_) => ErrorCode::InvalidAddress,
            ScanError::AlreadyOpen => ErrorCode::AlreadyOpen,
            ScanError::NotOpen => ErrorCode::NotOpen,
            ScanError::CommFailure => ErrorCode::CommFailure,
            ScanError::ReadFailure => ErrorCode::ReadFailure,
            ScanError::WriteFailure => ErrorCode::WriteFailure,
            ScanError::QueueFull => ErrorCode::QueueFull,
            ScanError::QueueBusy => ErrorCode::QueueBusy,
            ScanError::BadRegisterName(_) => ErrorCode::BadRegisterName,
            ScanError::NotReadable(_) => ErrorCode::NotReadable,
            ScanError::NotWritable(_) => ErrorCode::NotWritable,
            ScanError::BadValue { .. } => ErrorCode::BadValue,
            ScanError::StaleData => ErrorCode::StaleData,
            ScanError::WorkerSpawn(_) => ErrorCode::WorkerSpawn,
        }
    }
}

/// Fault recorded by the polling worker, observed by the façade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DeviceFault {
    #[default]
    None,
    Comm,
    Read,
    Write,
    QueueFull,
}

impl DeviceFault {
    pub fn is_none(self) -> bool {
        self == DeviceFault::None
    }

    /// The façade-level error equivalent of this fault
    pub fn to_error(self) -> Option<ScanError> {
        match self {
            DeviceFault::None => None,
            DeviceFault::Comm => Some(ScanError::CommFailure),
            DeviceFault::Read => Some(ScanError::ReadFailure),
            DeviceFault::Write => Some(ScanError::WriteFailure),
            DeviceFault::QueueFull => Some(ScanError::QueueFull),
        }
    }
}

/// Result of the most recent façade call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub code: ErrorCode,
    pub message: String,
}

impl Outcome {
    pub fn ok() -> Self {
        Self {
            code: ErrorCode::None,
            message: "No error".to_string(),
        }
    }

    pub fn from_error(error: &ScanError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.code != ErrorCode::None
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::ok()
    }
}
