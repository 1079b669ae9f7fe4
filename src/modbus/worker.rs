//! Polling worker
//!
//! Owns the device link for one controller. Each pass of the loop:
//!
//! 1. stops if the kill flag is raised
//! 2. decays data validity
//! 3. accepts one command from the façade
//! 4. applies the oldest pending write
//! 5. scans the device if the scan interval has elapsed
//! 6. otherwise backs off until a command arrives or the back-off expires
//!
//! The link is opened right before each transaction group and closed right
//! after, so a controller that drops idle connections never sees one.

use std::collections::VecDeque;
use std::io;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use super::client::DeviceLink;
use crate::block::{Command, WorkerSide, WorkerState, WriteCommand};
use crate::codec::Encoded;
use crate::config::{ScannerConfig, MAX_SCAN_INTERVAL_SECS};
use crate::error::DeviceFault;
use crate::metrics::{self, ScanMetrics};

/// Largest holding register block per read request
pub const MAX_READ_REGISTERS: u16 = 100;

struct PendingWrite {
    command: WriteCommand,
    attempts: u32,
    not_before: Option<Instant>,
}

impl PendingWrite {
    fn kind(&self) -> &'static str {
        match self.command.payload {
            Encoded::Coil(_) => "coil",
            Encoded::Words(_) => "holding",
        }
    }
}

pub struct Worker<L> {
    link: L,
    side: WorkerSide,
    device: String,
    coil_span: u16,
    holding_span: u16,
    scan_interval: Duration,
    data_expiry: Duration,
    idle_backoff: Duration,
    buffer_capacity: usize,
    retry_limit: Option<u32>,
    retry_delay: Duration,
    pending: VecDeque<PendingWrite>,
    last_attempt: Option<Instant>,
    last_success: Option<Instant>,
}

impl<L: DeviceLink> Worker<L> {
    pub fn new(
        link: L,
        side: WorkerSide,
        config: &ScannerConfig,
        coil_span: u16,
        holding_span: u16,
    ) -> Self {
        let device = side.target().to_string();
        Self {
            link,
            side,
            device,
            coil_span,
            holding_span,
            scan_interval: Duration::from_secs(
                config.scan_interval_secs.clamp(1, MAX_SCAN_INTERVAL_SECS),
            ),
            data_expiry: config.data_expiry(),
            idle_backoff: config.idle_backoff(),
            buffer_capacity: config.write_buffer_capacity,
            retry_limit: config.write_retry_limit,
            retry_delay: config.write_retry_delay(),
            pending: VecDeque::new(),
            last_attempt: None,
            last_success: None,
        }
    }

    /// Run until the kill flag is raised or the façade goes away
    pub async fn run(mut self) {
        info!("Starting scan of {} every {:?}", self.device, self.scan_interval);

        loop {
            if self.side.kill_requested() {
                break;
            }
            self.set_state(WorkerState::Polling);
            self.decay_validity();

            match self.side.try_command() {
                Ok(Some(command)) => {
                    self.accept(command);
                    continue;
                }
                Ok(None) => {}
                Err(_) => break,
            }

            if self.drain_one().await {
                continue;
            }

            if self.scan_due() {
                self.scan().await;
                continue;
            }

            self.set_state(WorkerState::Idle);
            tokio::select! {
                command = self.side.next_command() => match command {
                    Ok(command) => self.accept(command),
                    Err(_) => break,
                },
                _ = sleep(self.idle_backoff) => {}
            }
        }

        if !self.pending.is_empty() {
            warn!(
                "Discarding {} pending writes for {}",
                self.pending.len(),
                self.device
            );
        }
        self.link.close().await;
        self.side.update_status(|s| {
            s.state = WorkerState::Terminated;
            s.pending_writes = 0;
        });
        metrics::record_device_status(&self.device, false);
        info!("Stopped scan of {}", self.device);
    }

    fn set_state(&self, state: WorkerState) {
        self.side.update_status(|s| s.state = state);
    }

    fn set_fault(&self, fault: DeviceFault) {
        self.side.update_status(|s| s.fault = fault);
        metrics::record_device_status(&self.device, fault.is_none());
    }

    fn sync_pending(&self) {
        let count = self.pending.len();
        self.side.update_status(|s| s.pending_writes = count);
        metrics::record_pending_writes(&self.device, count);
    }

    fn accept(&mut self, command: Command) {
        match command {
            Command::Write(write) => {
                if self.pending.len() >= self.buffer_capacity {
                    error!(
                        "Write buffer for {} full, dropping write to {}",
                        self.device, write.address
                    );
                    metrics::record_write_dropped(&self.device, "queue_full");
                    self.side.update_status(|s| s.dropped_writes += 1);
                    self.set_fault(DeviceFault::QueueFull);
                } else {
                    debug!("Queued write to {} on {}", write.address, self.device);
                    self.pending.push_back(PendingWrite {
                        command: write,
                        attempts: 0,
                        not_before: None,
                    });
                }
                self.sync_pending();
            }
            Command::ScanInterval(secs) => {
                if (1..=MAX_SCAN_INTERVAL_SECS).contains(&secs) {
                    info!("Scan interval for {} set to {}s", self.device, secs);
                    self.scan_interval = Duration::from_secs(secs);
                    self.side.update_status(|s| s.scan_interval_secs = secs);
                } else {
                    warn!("Rejected scan interval {}s for {}", secs, self.device);
                    self.set_fault(DeviceFault::Write);
                }
            }
        }
    }

    /// Apply the oldest pending write if it is due. Returns true on success.
    async fn drain_one(&mut self) -> bool {
        let Some(entry) = self.pending.front_mut() else {
            return false;
        };
        if entry.not_before.is_some_and(|t| Instant::now() < t) {
            return false;
        }
        entry.attempts += 1;
        let command = entry.command.clone();
        let kind = entry.kind();
        let attempts = entry.attempts;

        self.set_state(WorkerState::WriteDraining);
        let result = self.apply(&command).await;
        metrics::record_write(&self.device, kind, result.is_ok());

        match result {
            Ok(()) => {
                debug!("Wrote {} register {} on {}", kind, command.address, self.device);
                self.pending.pop_front();
                self.sync_pending();
                true
            }
            Err(fault) => {
                self.set_fault(fault);
                if self.retry_limit.is_some_and(|limit| attempts >= limit) {
                    error!(
                        "Giving up on write to {} on {} after {} attempts",
                        command.address, self.device, attempts
                    );
                    metrics::record_write_dropped(&self.device, "retry_limit");
                    self.side.update_status(|s| s.dropped_writes += 1);
                    self.pending.pop_front();
                    self.sync_pending();
                } else if let Some(entry) = self.pending.front_mut() {
                    entry.not_before = Some(Instant::now() + self.retry_delay);
                }
                false
            }
        }
    }

    async fn apply(&mut self, command: &WriteCommand) -> Result<(), DeviceFault> {
        if let Err(e) = self.link.open().await {
            warn!("Unable to open {} for write: {}", self.device, e);
            return Err(DeviceFault::Comm);
        }
        let result = match &command.payload {
            Encoded::Coil(bit) => self.link.write_single_coil(command.address, *bit).await,
            Encoded::Words(words) => {
                self.link
                    .write_multiple_registers(command.address, words.clone())
                    .await
            }
        };
        self.link.close().await;

        result.map_err(|e| {
            warn!("Write to {} on {} failed: {}", command.address, self.device, e);
            DeviceFault::Write
        })
    }

    fn decay_validity(&self) {
        let valid = self
            .last_success
            .is_some_and(|t| t.elapsed() <= self.data_expiry);
        if valid != self.side.status().valid {
            if !valid {
                warn!("Data from {} is stale", self.device);
            }
            self.side.update_status(|s| s.valid = valid);
            metrics::record_data_valid(&self.device, valid);
        }
    }

    fn scan_due(&self) -> bool {
        self.last_attempt
            .map_or(true, |t| t.elapsed() >= self.scan_interval)
    }

    async fn scan(&mut self) {
        self.last_attempt = Some(Instant::now());
        self.set_state(WorkerState::Scanning);
        let timer = ScanMetrics::start(&self.device);

        if let Err(e) = self.link.open().await {
            warn!("Unable to open {}: {}", self.device, e);
            self.set_fault(DeviceFault::Comm);
            self.side.update_status(|s| s.failed_scans += 1);
            timer.finish("comm");
            return;
        }

        let coils = self.read_coils().await;
        let holding = self.read_holding().await;
        self.link.close().await;

        self.side.publish(coils.as_deref(), holding.as_deref());

        if coils.is_some() && holding.is_some() {
            debug!("Scanned {}", self.device);
            self.last_success = Some(Instant::now());
            self.side.update_status(|s| {
                s.fault = DeviceFault::None;
                s.valid = true;
                s.last_scan = Some(chrono::Utc::now());
                s.scans += 1;
            });
            metrics::record_device_status(&self.device, true);
            metrics::record_data_valid(&self.device, true);
            timer.finish("success");
        } else {
            self.set_fault(DeviceFault::Read);
            self.side.update_status(|s| s.failed_scans += 1);
            timer.finish("read");
        }
    }

    async fn read_coils(&mut self) -> Option<Vec<bool>> {
        if self.coil_span == 0 {
            return Some(vec![]);
        }
        match self.link.read_coils(0, self.coil_span).await {
            Ok(coils) => Some(coils),
            Err(e) => {
                warn!("Failed to read coils from {}: {}", self.device, e);
                None
            }
        }
    }

    async fn read_holding(&mut self) -> Option<Vec<u16>> {
        let mut words = Vec::with_capacity(self.holding_span as usize);
        let mut addr = 0;
        while addr < self.holding_span {
            let cnt = MAX_READ_REGISTERS.min(self.holding_span - addr);
            match self.link.read_holding_registers(addr, cnt).await {
                Ok(block) => words.extend(block),
                Err(e) => {
                    warn!(
                        "Failed to read {} holding registers at {} from {}: {}",
                        cnt, addr, self.device, e
                    );
                    return None;
                }
            }
            addr += cnt;
        }
        Some(words)
    }
}

/// Start a worker on its own thread with a single-threaded runtime
pub fn spawn<L>(worker: Worker<L>) -> io::Result<JoinHandle<()>>
where
    L: DeviceLink + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name(format!("symbscan-{}", worker.device))
        .spawn(move || runtime.block_on(worker.run()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{self, CallerSide};
    use crate::modbus::client::{MockDeviceLink, ModbusError};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_modbus::prelude::ExceptionCode;

    const COILS: u16 = 8;
    const HOLDING: u16 = 250;

    fn config() -> ScannerConfig {
        ScannerConfig {
            scan_interval_secs: 60,
            command_capacity: 4,
            ..ScannerConfig::default()
        }
    }

    fn start(link: MockDeviceLink, config: ScannerConfig) -> (CallerSide, tokio::task::JoinHandle<()>) {
        let (caller, side) = block::split(
            "127.0.0.1:502".parse().unwrap(),
            COILS,
            HOLDING,
            config.command_capacity,
            config.scan_interval_secs,
        );
        let worker = Worker::new(link, side, &config, COILS, HOLDING);
        (caller, tokio::spawn(worker.run()))
    }

    async fn stop(caller: CallerSide, task: tokio::task::JoinHandle<()>) {
        caller.shutdown();
        task.await.unwrap();
    }

    /// A device that answers every request
    fn healthy_link() -> MockDeviceLink {
        let mut link = MockDeviceLink::new();
        link.expect_open().returning(|| Ok(()));
        link.expect_close().returning(|| ());
        link.expect_read_coils()
            .returning(|_, cnt| Ok((0..cnt).map(|i| i % 2 == 0).collect()));
        link.expect_read_holding_registers()
            .returning(|addr, cnt| Ok((addr..addr + cnt).collect()));
        link
    }

    fn write(address: u16, words: Vec<u16>) -> Command {
        Command::Write(WriteCommand {
            address,
            payload: Encoded::Words(words),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_scan_is_immediate() {
        let (caller, task) = start(healthy_link(), config());
        sleep(Duration::from_millis(10)).await;

        let status = caller.status();
        assert!(status.valid);
        assert_eq!(status.fault, DeviceFault::None);
        assert_eq!(status.scans, 1);
        assert!(status.last_scan.is_some());
        caller.with_mirror(|m| {
            assert_eq!(m.coil(0), Some(true));
            assert_eq!(m.coil(1), Some(false));
            assert_eq!(m.words(199, 2), Some(&[199u16, 200][..]));
        });

        stop(caller, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_holding_read_in_blocks() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        let mut link = MockDeviceLink::new();
        link.expect_open().returning(|| Ok(()));
        link.expect_close().returning(|| ());
        link.expect_read_coils()
            .withf(|addr, cnt| *addr == 0 && *cnt == COILS)
            .returning(|_, cnt| Ok(vec![false; cnt as usize]));
        link.expect_read_holding_registers().returning(move |addr, cnt| {
            seen.lock().push((addr, cnt));
            Ok(vec![0; cnt as usize])
        });

        let (caller, task) = start(link, config());
        sleep(Duration::from_millis(10)).await;
        stop(caller, task).await;

        assert_eq!(*requests.lock(), vec![(0, 100), (100, 100), (200, 50)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_device() {
        let mut link = MockDeviceLink::new();
        link.expect_open().returning(|| Err(ModbusError::Timeout));
        link.expect_close().returning(|| ());
        link.expect_read_coils().never();

        let (caller, task) = start(link, config());
        sleep(Duration::from_millis(10)).await;

        let status = caller.status();
        assert!(!status.valid);
        assert_eq!(status.fault, DeviceFault::Comm);
        assert_eq!(status.failed_scans, 1);
        assert!(status.last_scan.is_none());

        stop(caller, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failure_keeps_partial_results() {
        let mut link = MockDeviceLink::new();
        link.expect_open().returning(|| Ok(()));
        link.expect_close().returning(|| ());
        link.expect_read_coils().returning(|_, cnt| Ok(vec![true; cnt as usize]));
        link.expect_read_holding_registers()
            .returning(|_, _| Err(ModbusError::Exception(ExceptionCode::IllegalDataAddress)));

        let (caller, task) = start(link, config());
        sleep(Duration::from_millis(10)).await;

        let status = caller.status();
        assert_eq!(status.fault, DeviceFault::Read);
        assert!(!status.valid);
        caller.with_mirror(|m| assert_eq!(m.coil(7), Some(true)));

        stop(caller, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_validity_expires() {
        let opens = Arc::new(AtomicUsize::new(0));
        let count = opens.clone();

        let mut link = MockDeviceLink::new();
        link.expect_open().returning(move || {
            // only the first scan reaches the device
            if count.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(())
            } else {
                Err(ModbusError::Timeout)
            }
        });
        link.expect_close().returning(|| ());
        link.expect_read_coils().returning(|_, cnt| Ok(vec![false; cnt as usize]));
        link.expect_read_holding_registers()
            .returning(|_, cnt| Ok(vec![0; cnt as usize]));

        let config = ScannerConfig {
            scan_interval_secs: 1,
            ..config()
        };
        let (caller, task) = start(link, config);

        sleep(Duration::from_secs(5)).await;
        let status = caller.status();
        assert!(status.valid);
        assert_eq!(status.fault, DeviceFault::Comm);

        sleep(Duration::from_secs(6)).await;
        assert!(!caller.valid());

        stop(caller, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_applied_in_order() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let log = written.clone();
        let coil_log = written.clone();

        let mut link = healthy_link();
        link.expect_write_multiple_registers()
            .returning(move |addr, words| {
                log.lock().push((addr, words));
                Ok(())
            });
        link.expect_write_single_coil().returning(move |addr, bit| {
            coil_log.lock().push((addr, vec![bit as u16]));
            Ok(())
        });

        let (caller, task) = start(link, config());
        sleep(Duration::from_millis(10)).await;

        caller.post(write(100, vec![1, 2]), Duration::from_millis(10)).unwrap();
        caller
            .post(
                Command::Write(WriteCommand {
                    address: 5,
                    payload: Encoded::Coil(true),
                }),
                Duration::from_millis(10),
            )
            .unwrap();
        sleep(Duration::from_millis(200)).await;

        assert_eq!(*written.lock(), vec![(100, vec![1, 2]), (5, vec![1])]);
        assert_eq!(caller.status().pending_writes, 0);

        stop(caller, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_retried_then_dropped() {
        let mut link = healthy_link();
        link.expect_write_multiple_registers()
            .times(3)
            .returning(|_, _| Err(ModbusError::Exception(ExceptionCode::ServerDeviceFailure)));

        let config = ScannerConfig {
            write_retry_limit: Some(3),
            write_retry_delay_ms: 250,
            ..config()
        };
        let (caller, task) = start(link, config);
        sleep(Duration::from_millis(10)).await;

        caller.post(write(40, vec![7]), Duration::from_millis(10)).unwrap();
        sleep(Duration::from_millis(10)).await;

        let status = caller.status();
        assert_eq!(status.fault, DeviceFault::Write);
        assert_eq!(status.pending_writes, 1);

        sleep(Duration::from_secs(1)).await;
        let status = caller.status();
        assert_eq!(status.pending_writes, 0);
        assert_eq!(status.dropped_writes, 1);

        stop(caller, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_buffer_overflow() {
        let mut link = MockDeviceLink::new();
        link.expect_open().returning(|| Err(ModbusError::Timeout));
        link.expect_close().returning(|| ());

        let config = ScannerConfig {
            write_buffer_capacity: 2,
            write_retry_limit: None,
            ..config()
        };
        let (caller, task) = start(link, config);

        for address in 0..3 {
            caller
                .post(write(address, vec![address]), Duration::from_millis(10))
                .unwrap();
        }
        sleep(Duration::from_millis(10)).await;

        let status = caller.status();
        assert_eq!(status.pending_writes, 2);
        assert_eq!(status.dropped_writes, 1);

        stop(caller, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_interval_command() {
        let scans = Arc::new(AtomicUsize::new(0));
        let count = scans.clone();

        let mut link = MockDeviceLink::new();
        link.expect_open().returning(|| Ok(()));
        link.expect_close().returning(|| ());
        link.expect_read_coils().returning(move |_, cnt| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(vec![false; cnt as usize])
        });
        link.expect_read_holding_registers()
            .returning(|_, cnt| Ok(vec![0; cnt as usize]));

        let (caller, task) = start(link, config());
        sleep(Duration::from_millis(10)).await;

        caller
            .post(Command::ScanInterval(0), Duration::from_millis(10))
            .unwrap();
        sleep(Duration::from_millis(10)).await;
        let status = caller.status();
        assert_eq!(status.fault, DeviceFault::Write);
        assert_eq!(status.scan_interval_secs, 60);

        caller
            .post(Command::ScanInterval(5), Duration::from_millis(10))
            .unwrap();
        sleep(Duration::from_secs(11)).await;

        let status = caller.status();
        assert_eq!(status.scan_interval_secs, 5);
        assert_eq!(status.fault, DeviceFault::None);
        assert_eq!(scans.load(Ordering::SeqCst), 3);

        stop(caller, task).await;
    }

    #[test]
    fn test_validity_expires_while_writes_drain() {
        let mut link = healthy_link();
        link.expect_write_multiple_registers().returning(|_, _| {
            std::thread::sleep(Duration::from_millis(100));
            Ok(())
        });

        let config = ScannerConfig {
            data_expiry_ms: 300,
            command_capacity: 16,
            write_retry_limit: None,
            ..config()
        };
        let (caller, side) = block::split(
            "127.0.0.1:502".parse().unwrap(),
            COILS,
            HOLDING,
            config.command_capacity,
            config.scan_interval_secs,
        );
        let worker = Worker::new(link, side, &config, COILS, HOLDING);
        let handle = spawn(worker).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !caller.valid() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(caller.valid());

        for address in 0..12 {
            caller
                .post(write(address, vec![address]), Duration::from_millis(50))
                .unwrap();
        }
        std::thread::sleep(Duration::from_millis(700));

        // the only scan is well past expiry and writes are still queued
        let status = caller.status();
        assert!(status.pending_writes > 0);
        assert!(!status.valid);

        caller.shutdown();
        handle.join().unwrap();
    }

    #[test]
    fn test_spawn_on_thread() {
        let (caller, side) = block::split("127.0.0.1:502".parse().unwrap(), COILS, HOLDING, 1, 60);
        let worker = Worker::new(healthy_link(), side, &config(), COILS, HOLDING);

        let handle = spawn(worker).unwrap();
        caller.shutdown();
        handle.join().unwrap();
    }
}
