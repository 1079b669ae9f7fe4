//! Modbus client link
//!
//! [`DeviceLink`] is the seam between the polling worker and the wire. The
//! production implementation is [`TcpLink`]; tests substitute a mock.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::timeout;
use tokio_modbus::client::Context;
use tokio_modbus::prelude::*;
use tracing::debug;

/// Error type for Modbus operations
#[derive(Debug, thiserror::Error)]
pub enum ModbusError {
    #[error("Modbus exception: {0:?}")]
    Exception(ExceptionCode),
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_modbus::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request timed out")]
    Timeout,
    #[error("No connection available")]
    NotConnected,
}

/// One device session: open, a handful of requests, close
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceLink: Send {
    async fn open(&mut self) -> Result<(), ModbusError>;

    async fn close(&mut self);

    async fn read_coils(&mut self, addr: u16, cnt: u16) -> Result<Vec<bool>, ModbusError>;

    async fn read_holding_registers(&mut self, addr: u16, cnt: u16)
        -> Result<Vec<u16>, ModbusError>;

    async fn write_single_coil(&mut self, addr: u16, value: bool) -> Result<(), ModbusError>;

    async fn write_multiple_registers(
        &mut self,
        addr: u16,
        words: Vec<u16>,
    ) -> Result<(), ModbusError>;
}

/// Modbus/TCP link to a single controller
pub struct TcpLink {
    target: SocketAddr,
    unit_id: u8,
    timeout: Duration,
    context: Option<Context>,
}

impl TcpLink {
    pub fn new(target: SocketAddr, unit_id: u8, timeout: Duration) -> Self {
        Self {
            target,
            unit_id,
            timeout,
            context: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.context.is_some()
    }

    fn context(&mut self) -> Result<&mut Context, ModbusError> {
        self.context.as_mut().ok_or(ModbusError::NotConnected)
    }
}

/// Bound a request by the link timeout and flatten the nested result
async fn bounded<T>(
    limit: Duration,
    request: impl std::future::Future<Output = tokio_modbus::Result<T>>,
) -> Result<T, ModbusError> {
    let result = timeout(limit, request)
        .await
        .map_err(|_| ModbusError::Timeout)??;
    result.map_err(ModbusError::Exception)
}

#[async_trait]
impl DeviceLink for TcpLink {
    async fn open(&mut self) -> Result<(), ModbusError> {
        if self.context.is_some() {
            return Ok(());
        }
        debug!("Connecting to Modbus TCP: {} (unit {})", self.target, self.unit_id);

        let ctx = timeout(self.timeout, tcp::connect_slave(self.target, Slave(self.unit_id)))
            .await
            .map_err(|_| ModbusError::Timeout)??;
        self.context = Some(ctx);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut ctx) = self.context.take() {
            if let Err(e) = ctx.disconnect().await {
                debug!("Disconnect from {} failed: {:?}", self.target, e);
            }
        }
    }

    async fn read_coils(&mut self, addr: u16, cnt: u16) -> Result<Vec<bool>, ModbusError> {
        let limit = self.timeout;
        let ctx = self.context()?;
        let mut coils = bounded(limit, ctx.read_coils(addr, cnt)).await?;
        // coil replies are padded to whole bytes
        coils.truncate(cnt as usize);
        Ok(coils)
    }

    async fn read_holding_registers(
        &mut self,
        addr: u16,
        cnt: u16,
    ) -> Result<Vec<u16>, ModbusError> {
        let limit = self.timeout;
        let ctx = self.context()?;
        bounded(limit, ctx.read_holding_registers(addr, cnt)).await
    }

    async fn write_single_coil(&mut self, addr: u16, value: bool) -> Result<(), ModbusError> {
        let limit = self.timeout;
        let ctx = self.context()?;
        bounded(limit, ctx.write_single_coil(addr, value)).await
    }

    async fn write_multiple_registers(
        &mut self,
        addr: u16,
        words: Vec<u16>,
    ) -> Result<(), ModbusError> {
        let limit = self.timeout;
        let ctx = self.context()?;
        bounded(limit, ctx.write_multiple_registers(addr, &words)).await
    }
}
