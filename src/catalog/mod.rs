//! Register catalog for the SymbCtrl mk2
//!
//! Immutable table mapping register names to their address, access mode and
//! wire type. Built once on first use and shared by every scanner instance.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::codec::{Space, WireType};
use crate::error::ScanError;

mod table;

pub use table::{CHANNELS, CHANNEL_NAMES, PROCESSES, UNITS};

/// Register access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn readable(self) -> bool {
        self != AccessMode::WriteOnly
    }

    pub fn writable(self) -> bool {
        self != AccessMode::ReadOnly
    }

    pub fn label(self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "r",
            AccessMode::WriteOnly => "w",
            AccessMode::ReadWrite => "rw",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a register's engineering unit comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitRef {
    /// Another register holding an index into [`UNITS`]
    Register(&'static str),
    /// A fixed unit string
    Literal(&'static str),
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Register {
    pub name: &'static str,
    pub address: u16,
    pub mode: AccessMode,
    pub wire: WireType,
    pub unit: Option<UnitRef>,
    pub validity: Option<&'static str>,
    pub description: &'static str,
}

impl Register {
    pub const fn new(
        name: &'static str,
        address: u16,
        mode: AccessMode,
        wire: WireType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            address,
            mode,
            wire,
            unit: None,
            validity: None,
            description,
        }
    }

    pub const fn unit_register(mut self, name: &'static str) -> Self {
        self.unit = Some(UnitRef::Register(name));
        self
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(UnitRef::Literal(unit));
        self
    }

    pub const fn validity(mut self, name: &'static str) -> Self {
        self.validity = Some(name);
        self
    }

    /// One past the last coil or holding register this entry occupies
    pub fn end(&self) -> u16 {
        self.address + self.wire.width()
    }
}

/// Name-indexed view over the register table
pub struct Catalog {
    registers: &'static [Register],
    index: HashMap<&'static str, usize>,
    coil_span: u16,
    holding_span: u16,
}

static SYMBCTRL: Lazy<Catalog> = Lazy::new(|| Catalog::new(table::REGISTERS));

impl Catalog {
    fn new(registers: &'static [Register]) -> Self {
        let index = registers
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name, i))
            .collect();

        let span = |space: Space| {
            registers
                .iter()
                .filter(|r| r.wire.space() == space)
                .map(Register::end)
                .max()
                .unwrap_or(0)
        };

        Self {
            registers,
            index,
            coil_span: span(Space::Coil),
            holding_span: span(Space::Holding),
        }
    }

    /// The SymbCtrl register map
    pub fn symbctrl() -> &'static Catalog {
        &SYMBCTRL
    }

    pub fn descriptor(&self, name: &str) -> Result<&Register, ScanError> {
        self.index
            .get(name)
            .map(|&i| &self.registers[i])
            .ok_or_else(|| ScanError::BadRegisterName(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn wire_type(&self, name: &str) -> Result<WireType, ScanError> {
        self.descriptor(name).map(|r| r.wire)
    }

    pub fn access_mode(&self, name: &str) -> Result<AccessMode, ScanError> {
        self.descriptor(name).map(|r| r.mode)
    }

    pub fn description(&self, name: &str) -> Result<&'static str, ScanError> {
        self.descriptor(name).map(|r| r.description)
    }

    pub fn unit_of(&self, name: &str) -> Result<Option<UnitRef>, ScanError> {
        self.descriptor(name).map(|r| r.unit)
    }

    pub fn validity_of(&self, name: &str) -> Result<Option<&'static str>, ScanError> {
        self.descriptor(name).map(|r| r.validity)
    }

    /// All register names in table order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registers.iter().map(|r| r.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Register> + '_ {
        self.registers.iter()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Number of coils read per scan
    pub fn coil_span(&self) -> u16 {
        self.coil_span
    }

    /// Number of holding registers read per scan
    pub fn holding_span(&self) -> u16 {
        self.holding_span
    }
}

/// Unit string for a unit code; code 0 means no unit
pub fn unit_name(code: i64) -> Option<&'static str> {
    if code == 0 {
        return Some("");
    }
    usize::try_from(code).ok().and_then(|i| UNITS.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup() {
        let catalog = Catalog::symbctrl();

        let reg = catalog.descriptor("WQSensor").unwrap();
        assert_eq!(reg.address, 20);
        assert_eq!(reg.wire, WireType::Float32);
        assert_eq!(reg.mode, AccessMode::ReadOnly);
        assert_eq!(reg.unit, Some(UnitRef::Register("WQSensorUnits")));
        assert_eq!(reg.validity, Some("WQSensorValid"));

        assert_eq!(catalog.wire_type("Counter").unwrap(), WireType::UInt32);
        assert_eq!(
            catalog.access_mode("SaveSettings").unwrap(),
            AccessMode::WriteOnly
        );
        assert_eq!(
            catalog.description("Status").unwrap(),
            "Current controller status, True=good"
        );
        assert_eq!(catalog.unit_of("Hour").unwrap(), Some(UnitRef::Literal("h")));
        assert_eq!(catalog.validity_of("ModelName").unwrap(), None);
    }

    #[test]
    fn test_unknown_name() {
        let catalog = Catalog::symbctrl();
        assert!(!catalog.contains("NoSuchReg"));
        assert!(matches!(
            catalog.descriptor("NoSuchReg"),
            Err(ScanError::BadRegisterName(name)) if name == "NoSuchReg"
        ));
        assert!(catalog.wire_type("NoSuchReg").is_err());
        assert!(catalog.access_mode("NoSuchReg").is_err());
        assert!(catalog.description("NoSuchReg").is_err());
        assert!(catalog.unit_of("NoSuchReg").is_err());
        assert!(catalog.validity_of("NoSuchReg").is_err());
    }

    #[test]
    fn test_names_are_unique_and_ordered() {
        let catalog = Catalog::symbctrl();
        let names: Vec<_> = catalog.names().collect();
        let unique: HashSet<_> = names.iter().collect();

        assert_eq!(names.len(), unique.len());
        assert_eq!(names.len(), catalog.len());
        assert_eq!(names.first(), Some(&"ModelName"));
        assert_eq!(names.last(), Some(&"TimeLimitedCmd"));
    }

    #[test]
    fn test_footprint() {
        let catalog = Catalog::symbctrl();
        // TimeLimitedCmd is the last coil, Control4Name the last holding block
        assert_eq!(catalog.coil_span(), 71);
        assert_eq!(catalog.holding_span(), 290);

        for reg in catalog.iter() {
            let span = match reg.wire.space() {
                Space::Coil => catalog.coil_span(),
                Space::Holding => catalog.holding_span(),
            };
            assert!(reg.end() <= span, "{} exceeds the scanned range", reg.name);
        }
    }

    #[test]
    fn test_references_resolve() {
        let catalog = Catalog::symbctrl();
        for reg in catalog.iter() {
            if let Some(UnitRef::Register(unit)) = reg.unit {
                let target = catalog.descriptor(unit).unwrap();
                assert_eq!(target.wire, WireType::UInt16, "{} unit", reg.name);
            }
            if let Some(validity) = reg.validity {
                let target = catalog.descriptor(validity).unwrap();
                assert_eq!(target.wire, WireType::Bool, "{} validity", reg.name);
            }
        }
    }

    #[test]
    fn test_unit_names() {
        assert_eq!(unit_name(0), Some(""));
        assert_eq!(unit_name(1), Some("°C"));
        assert_eq!(unit_name(3), Some("pH"));
        assert_eq!(unit_name(UNITS.len() as i64), None);
        assert_eq!(unit_name(-1), None);
    }

    #[test]
    fn test_channel_tables() {
        assert_eq!(CHANNELS.len(), CHANNEL_NAMES.len());
        assert_eq!(CHANNELS[1], "WQSensor");
        assert_eq!(PROCESSES[0], "Average");
    }

    #[test]
    fn test_access_mode_rules() {
        assert!(AccessMode::ReadOnly.readable());
        assert!(!AccessMode::ReadOnly.writable());
        assert!(!AccessMode::WriteOnly.readable());
        assert!(AccessMode::ReadWrite.readable() && AccessMode::ReadWrite.writable());
        assert_eq!(AccessMode::ReadWrite.to_string(), "rw");
    }
}
