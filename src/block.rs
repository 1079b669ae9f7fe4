//! Shared state block between a scanner and its polling worker
//!
//! The block is split into two handles so that ownership of each region is
//! visible in the types:
//!
//! - [`CallerSide`] posts commands, requests shutdown and reads the mirrors.
//! - [`WorkerSide`] receives commands and is the only writer of the status
//!   region and of scan results.
//!
//! The one deliberate overlap is [`CallerSide::reflect`], which patches the
//! mirror with the value just written so an immediate read sees it before the
//! next scan confirms it.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::codec::Encoded;
use crate::error::{DeviceFault, ScanError};

/// Raw copy of the device's coil and holding register space
#[derive(Debug, Clone, Default)]
pub struct Mirror {
    pub coils: Vec<bool>,
    pub holding: Vec<u16>,
}

impl Mirror {
    fn new(coil_span: u16, holding_span: u16) -> Self {
        Self {
            coils: vec![false; coil_span as usize],
            holding: vec![0; holding_span as usize],
        }
    }

    pub fn coil(&self, address: u16) -> Option<bool> {
        self.coils.get(address as usize).copied()
    }

    pub fn words(&self, address: u16, width: u16) -> Option<&[u16]> {
        let start = address as usize;
        self.holding.get(start..start + width as usize)
    }

    fn apply(&mut self, address: u16, payload: &Encoded) {
        match payload {
            Encoded::Coil(bit) => {
                if let Some(slot) = self.coils.get_mut(address as usize) {
                    *slot = *bit;
                }
            }
            Encoded::Words(words) => {
                let start = address as usize;
                for (i, word) in words.iter().enumerate() {
                    if let Some(slot) = self.holding.get_mut(start + i) {
                        *slot = *word;
                    }
                }
            }
        }
    }
}

/// Worker lifecycle states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum WorkerState {
    #[default]
    Idle,
    Polling,
    WriteDraining,
    Scanning,
    Terminated,
}

/// Status region, written by the worker only
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatus {
    pub state: WorkerState,
    pub fault: DeviceFault,
    pub valid: bool,
    /// Completion time of the last successful scan
    pub last_scan: Option<DateTime<Utc>>,
    pub scans: u64,
    pub failed_scans: u64,
    pub pending_writes: usize,
    /// Writes discarded for a full buffer or exhausted retries
    pub dropped_writes: u64,
    pub scan_interval_secs: u64,
}

impl ScanStatus {
    fn new(scan_interval_secs: u64) -> Self {
        Self {
            state: WorkerState::Idle,
            // nothing has been heard from the device yet
            fault: DeviceFault::Comm,
            valid: false,
            last_scan: None,
            scans: 0,
            failed_scans: 0,
            pending_writes: 0,
            dropped_writes: 0,
            scan_interval_secs,
        }
    }
}

/// A pending write: single coil or a run of holding registers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCommand {
    pub address: u16,
    pub payload: Encoded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Write(WriteCommand),
    ScanInterval(u64),
}

struct Block {
    target: SocketAddr,
    mirror: RwLock<Mirror>,
    status: RwLock<ScanStatus>,
    kill: AtomicBool,
}

/// Allocate a block sized for the given spans and split it into its two handles
pub fn split(
    target: SocketAddr,
    coil_span: u16,
    holding_span: u16,
    capacity: usize,
    scan_interval_secs: u64,
) -> (CallerSide, WorkerSide) {
    let block = Arc::new(Block {
        target,
        mirror: RwLock::new(Mirror::new(coil_span, holding_span)),
        status: RwLock::new(ScanStatus::new(scan_interval_secs)),
        kill: AtomicBool::new(false),
    });
    let (tx, rx) = flume::bounded(capacity.max(1));

    (
        CallerSide {
            block: block.clone(),
            commands: tx,
        },
        WorkerSide {
            block,
            commands: rx,
        },
    )
}

/// Façade handle on the shared block
pub struct CallerSide {
    block: Arc<Block>,
    commands: flume::Sender<Command>,
}

impl CallerSide {
    pub fn target(&self) -> SocketAddr {
        self.block.target
    }

    pub fn status(&self) -> ScanStatus {
        self.block.status.read().clone()
    }

    pub fn valid(&self) -> bool {
        self.block.status.read().valid
    }

    pub fn fault(&self) -> DeviceFault {
        self.block.status.read().fault
    }

    /// Run a closure against a consistent view of the mirror
    pub fn with_mirror<R>(&self, f: impl FnOnce(&Mirror) -> R) -> R {
        f(&self.block.mirror.read())
    }

    /// Hand a command to the worker, waiting up to `wait` for room
    pub fn post(&self, command: Command, wait: Duration) -> Result<(), ScanError> {
        self.commands
            .send_timeout(command, wait)
            .map_err(|e| match e {
                flume::SendTimeoutError::Timeout(_) => ScanError::QueueBusy,
                flume::SendTimeoutError::Disconnected(_) => ScanError::NotOpen,
            })
    }

    /// Optimistically show a posted write in the mirror
    pub fn reflect(&self, command: &WriteCommand) {
        self.block
            .mirror
            .write()
            .apply(command.address, &command.payload);
    }

    /// Raise the kill flag and close the command channel
    pub fn shutdown(self) {
        self.block.kill.store(true, Ordering::Release);
    }
}

/// Worker handle on the shared block
pub struct WorkerSide {
    block: Arc<Block>,
    commands: flume::Receiver<Command>,
}

/// The façade has gone away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnected;

impl WorkerSide {
    pub fn target(&self) -> SocketAddr {
        self.block.target
    }

    pub fn kill_requested(&self) -> bool {
        self.block.kill.load(Ordering::Acquire)
    }

    pub fn try_command(&self) -> Result<Option<Command>, Disconnected> {
        match self.commands.try_recv() {
            Ok(command) => Ok(Some(command)),
            Err(flume::TryRecvError::Empty) => Ok(None),
            Err(flume::TryRecvError::Disconnected) => Err(Disconnected),
        }
    }

    /// Wait for the next command; `Err` once the façade's sender is dropped
    pub async fn next_command(&self) -> Result<Command, Disconnected> {
        self.commands.recv_async().await.map_err(|_| Disconnected)
    }

    /// Store scan results. Either part may be absent when its read failed.
    pub fn publish(&self, coils: Option<&[bool]>, holding: Option<&[u16]>) {
        let mut mirror = self.block.mirror.write();
        if let Some(coils) = coils {
            for (slot, bit) in mirror.coils.iter_mut().zip(coils) {
                *slot = *bit;
            }
        }
        if let Some(holding) = holding {
            for (slot, word) in mirror.holding.iter_mut().zip(holding) {
                *slot = *word;
            }
        }
    }

    pub fn update_status(&self, f: impl FnOnce(&mut ScanStatus)) {
        f(&mut self.block.status.write());
    }

    pub fn status(&self) -> ScanStatus {
        self.block.status.read().clone()
    }
}
