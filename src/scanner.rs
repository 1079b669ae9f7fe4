//! Scanner façade
//!
//! [`Scanner`] is the caller-facing object for one controller. It owns the
//! polling worker and its shared block; every read and write touches only the
//! in-memory mirror, never the network.
//!
//! Each call returns a `Result` and also records its outcome, so text-oriented
//! callers can check [`Scanner::error`] and [`Scanner::message`] afterwards.
//!
//! # Example
//!
//! ```no_run
//! use symbscan::Scanner;
//!
//! let mut scanner = Scanner::new();
//! scanner.start("192.168.1.4")?;
//! if scanner.valid() {
//!     println!("{}", scanner.text_value("WQSensor", 12, true));
//! }
//! scanner.write("Relay1Request", true)?;
//! scanner.close()?;
//! # Ok::<(), symbscan::ScanError>(())
//! ```

use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::thread::JoinHandle;
use tracing::{error, info};

use crate::block::{self, CallerSide, Command, ScanStatus, WriteCommand};
use crate::catalog::{self, AccessMode, Catalog, UnitRef, CHANNELS, CHANNEL_NAMES, PROCESSES, UNITS};
use crate::codec::{Value, WireType};
use crate::config::{ScannerConfig, MAX_SCAN_INTERVAL_SECS};
use crate::error::{ErrorCode, Outcome, ScanError};
use crate::modbus::{worker, DeviceLink, TcpLink, Worker};

/// Narrowest field `text_value` produces
const MIN_TEXT_WIDTH: usize = 8;
/// Columns reserved for the unit suffix
const UNIT_WIDTH: usize = 4;

struct Session {
    caller: CallerSide,
    thread: JoinHandle<()>,
}

/// Live register cache for a single SymbCtrl controller
pub struct Scanner {
    config: ScannerConfig,
    catalog: &'static Catalog,
    session: Option<Session>,
    outcome: Mutex<Outcome>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        Self {
            config,
            catalog: Catalog::symbctrl(),
            session: None,
            outcome: Mutex::new(Outcome::ok()),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    fn record<T>(&self, result: Result<T, ScanError>) -> Result<T, ScanError> {
        *self.outcome.lock() = match &result {
            Ok(_) => Outcome::ok(),
            Err(e) => Outcome::from_error(e),
        };
        result
    }

    fn session(&self) -> Result<&Session, ScanError> {
        self.session.as_ref().ok_or(ScanError::NotOpen)
    }

    /// Validate the address and start polling the controller at it.
    /// Returns without waiting for the first scan.
    pub fn start(&mut self, address: &str) -> Result<(), ScanError> {
        let result = address
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ScanError::InvalidAddress(address.to_string()));
        let ip = self.record(result)?;

        let target = SocketAddr::new(ip, self.config.port);
        let link = TcpLink::new(target, self.config.unit_id, self.config.timeout());
        self.attach(target, link)
    }

    /// Start polling over a caller supplied link
    pub fn attach<L>(&mut self, target: SocketAddr, link: L) -> Result<(), ScanError>
    where
        L: DeviceLink + 'static,
    {
        let result = self.spawn(target, link);
        self.record(result)
    }

    fn spawn<L>(&mut self, target: SocketAddr, link: L) -> Result<(), ScanError>
    where
        L: DeviceLink + 'static,
    {
        if self.session.is_some() {
            return Err(ScanError::AlreadyOpen);
        }

        let coil_span = self.catalog.coil_span();
        let holding_span = self.catalog.holding_span();
        let (caller, side) = block::split(
            target,
            coil_span,
            holding_span,
            self.config.command_capacity,
            self.config.scan_interval_secs,
        );
        let worker = Worker::new(link, side, &self.config, coil_span, holding_span);
        let thread = worker::spawn(worker)?;

        info!("Started scanner for {}", target);
        self.session = Some(Session { caller, thread });
        Ok(())
    }

    /// Stop the worker and wait for it to finish. Pending writes are dropped.
    pub fn close(&mut self) -> Result<(), ScanError> {
        let result = self.session.take().ok_or(ScanError::NotOpen).map(|session| {
            let target = session.caller.target();
            session.caller.shutdown();
            if session.thread.join().is_err() {
                error!("Scanner worker for {} panicked", target);
            }
            info!("Closed scanner for {}", target);
        });
        self.record(result)
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<SocketAddr> {
        self.session.as_ref().map(|s| s.caller.target())
    }

    /// True while the mirror holds data from a recent successful scan
    pub fn valid(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.caller.valid())
    }

    /// True when a worker is running and its last device transaction succeeded.
    /// Otherwise the worker's fault becomes the recorded outcome.
    pub fn connected(&self) -> bool {
        let result = self
            .session()
            .and_then(|s| s.caller.fault().to_error().map_or(Ok(()), Err));
        self.record(result).is_ok()
    }

    /// True when connected and the controller reports good status
    pub fn status(&self) -> bool {
        self.connected() && matches!(self.read("Status"), Ok(Value::Bool(true)))
    }

    /// Diagnostic copy of the worker status
    pub fn snapshot(&self) -> Option<ScanStatus> {
        self.session.as_ref().map(|s| s.caller.status())
    }

    pub fn error(&self) -> ErrorCode {
        self.outcome.lock().code
    }

    pub fn message(&self) -> String {
        self.outcome.lock().message.clone()
    }

    /// Decode a register from the mirror
    pub fn read(&self, name: &str) -> Result<Value, ScanError> {
        let result = self.read_mirror(name);
        self.record(result)
    }

    fn read_mirror(&self, name: &str) -> Result<Value, ScanError> {
        let session = self.session()?;
        let reg = self.catalog.descriptor(name)?;
        if !reg.mode.readable() {
            return Err(ScanError::NotReadable(name.to_string()));
        }
        if !session.caller.valid() {
            return Err(ScanError::StaleData);
        }

        Ok(session.caller.with_mirror(|mirror| match reg.wire {
            WireType::Bool => Value::Bool(mirror.coil(reg.address).unwrap_or(false)),
            wire => wire.decode(mirror.words(reg.address, wire.width()).unwrap_or(&[])),
        }))
    }

    /// Validate and queue a write, then show it in the mirror straight away
    pub fn write(&self, name: &str, value: impl Into<Value>) -> Result<(), ScanError> {
        let value = value.into();
        let result = self.queue_write(name, &value);
        self.record(result)
    }

    fn queue_write(&self, name: &str, value: &Value) -> Result<(), ScanError> {
        let reg = self.catalog.descriptor(name)?;
        if !reg.mode.writable() {
            return Err(ScanError::NotWritable(name.to_string()));
        }
        let payload = reg.wire.encode(value).map_err(|e| ScanError::BadValue {
            register: name.to_string(),
            reason: e.to_string(),
        })?;
        let session = self.session()?;

        let command = WriteCommand {
            address: reg.address,
            payload,
        };
        session
            .caller
            .post(Command::Write(command.clone()), self.config.write_wait())?;
        session.caller.reflect(&command);
        Ok(())
    }

    /// Change the worker's scan interval, 1 to 60 seconds
    pub fn set_scan_interval(&self, secs: u64) -> Result<(), ScanError> {
        let result = self.session().and_then(|session| {
            if !(1..=MAX_SCAN_INTERVAL_SECS).contains(&secs) {
                return Err(ScanError::BadValue {
                    register: "scan interval".to_string(),
                    reason: format!("{} not between 1 and {} seconds", secs, MAX_SCAN_INTERVAL_SECS),
                });
            }
            session
                .caller
                .post(Command::ScanInterval(secs), self.config.write_wait())
        });
        self.record(result)
    }

    /// User assigned controller name, empty when unavailable
    pub fn controller_name(&self) -> String {
        match self.read("ControlName") {
            Ok(Value::Text(name)) => name,
            _ => String::new(),
        }
    }

    /// Value of the validity flag attached to a sensor register.
    /// Registers without a flag are always valid.
    pub fn sensor_valid(&self, name: &str) -> Result<bool, ScanError> {
        let flag = self.record(self.catalog.validity_of(name))?;
        match flag {
            Some(flag) => self.read(flag).map(|v| v.as_bool().unwrap_or(false)),
            None => Ok(true),
        }
    }

    /// Register names in catalog order
    pub fn registers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.catalog.names()
    }

    pub fn register_type(&self, name: &str) -> Result<WireType, ScanError> {
        self.record(self.catalog.wire_type(name))
    }

    pub fn mode(&self, name: &str) -> Result<AccessMode, ScanError> {
        self.record(self.catalog.access_mode(name))
    }

    pub fn description(&self, name: &str) -> Result<&'static str, ScanError> {
        self.record(self.catalog.description(name))
    }

    pub fn address(&self, name: &str) -> Result<u16, ScanError> {
        self.record(self.catalog.descriptor(name).map(|r| r.address))
    }

    /// Unit string for a unit code; code 0 is unitless
    pub fn unit(&self, code: i64) -> Option<&'static str> {
        catalog::unit_name(code)
    }

    pub fn unit_list(&self) -> &'static [&'static str] {
        &UNITS
    }

    /// Engineering unit of a register: its fixed unit, or the entry of the
    /// unit table selected by its unit register. Empty when there is none.
    pub fn channel_unit(&self, name: &str) -> String {
        match self.catalog.unit_of(name) {
            Ok(Some(UnitRef::Literal(unit))) => unit.to_string(),
            Ok(Some(UnitRef::Register(unit_reg))) => self
                .read(unit_reg)
                .ok()
                .and_then(|code| code.as_i64())
                .and_then(|code| usize::try_from(code).ok())
                .and_then(|i| UNITS.get(i))
                .filter(|unit| **unit != "None")
                .map(|unit| unit.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Registers selectable as channel sources
    pub fn channels(&self) -> &'static [&'static str] {
        &CHANNELS
    }

    pub fn channel(&self, index: usize) -> Option<&'static str> {
        CHANNELS.get(index).copied()
    }

    /// Display names matching [`Scanner::channels`]
    pub fn channel_names(&self) -> &'static [&'static str] {
        &CHANNEL_NAMES
    }

    pub fn processes(&self) -> &'static [&'static str] {
        &PROCESSES
    }

    /// Coerce an externally sourced string into a value for `name`.
    /// Range is not checked here; `write` does that.
    pub fn convert(&self, name: &str, raw: &str) -> Option<Value> {
        let wire = self.catalog.wire_type(name).ok()?;
        match wire {
            WireType::Text => Some(Value::Text(raw.to_string())),
            WireType::Int16 | WireType::UInt16 | WireType::UInt32 => {
                raw.trim().parse::<i64>().ok().map(Value::Int)
            }
            WireType::Float32 => raw.trim().parse::<f64>().ok().map(Value::Float),
            WireType::Bool => Some(Value::Bool(raw.trim().eq_ignore_ascii_case("true"))),
            WireType::Date | WireType::Time | WireType::DateTime | WireType::HourMinute => None,
        }
    }

    /// Current value of a register formatted to a fixed width, optionally
    /// followed by its unit
    pub fn text_value(&self, name: &str, width: usize, show_unit: bool) -> String {
        let size = width.max(MIN_TEXT_WIDTH);
        let width = if show_unit { size - UNIT_WIDTH } else { size };

        if !self.catalog.contains(name) {
            let _ = self.record(self.catalog.descriptor(name));
            return format!("{:<width$}", "Chan!");
        }

        let text = match self.read(name) {
            Err(_) => format!("{:>width$}", "Err!"),
            Ok(Value::Float(v)) => format!("{:>width$.2}", v),
            Ok(Value::Int(v)) => format!("{:>width$}", v),
            Ok(Value::Bool(on)) => {
                let label = match (name.contains("Alarm"), on) {
                    (true, true) => "Alarm",
                    (true, false) => "No Alarm",
                    (false, true) => "On",
                    (false, false) => "Off",
                };
                format!("{:>width$}", label)
            }
            Ok(Value::Text(s)) => format!("{:<width$}", s),
        };

        if show_unit {
            format!(
                "{}{:<unit_width$}",
                text,
                self.channel_unit(name),
                unit_width = UNIT_WIDTH
            )
        } else {
            text
        }
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        if self.session.is_some() {
            let _ = self.close();
        }
    }
}
