//! In-process SymbCtrl simulator for integration tests
//!
//! Serves the controller's coil and holding register image over Modbus/TCP on
//! a loopback port, from its own thread and runtime.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_modbus::prelude::*;
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};

use symbscan::codec::Encoded;
use symbscan::config::ScannerConfig;
use symbscan::{Catalog, Value, WireType};

#[derive(Default)]
struct Image {
    coils: Vec<bool>,
    holding: Vec<u16>,
    writes: usize,
}

struct SymbCtrlService {
    image: Arc<Mutex<Image>>,
}

fn slice<T: Clone>(data: &[T], addr: u16, cnt: u16) -> Result<Vec<T>, ExceptionCode> {
    let start = addr as usize;
    data.get(start..start + cnt as usize)
        .map(|s| s.to_vec())
        .ok_or(ExceptionCode::IllegalDataAddress)
}

impl tokio_modbus::server::Service for SymbCtrlService {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        let mut guard = self.image.lock();
        let image = &mut *guard;

        let res = match req {
            Request::ReadCoils(addr, cnt) => slice(&image.coils, addr, cnt).map(Response::ReadCoils),
            Request::ReadHoldingRegisters(addr, cnt) => {
                slice(&image.holding, addr, cnt).map(Response::ReadHoldingRegisters)
            }
            Request::WriteSingleCoil(addr, value) => match image.coils.get_mut(addr as usize) {
                Some(slot) => {
                    *slot = value;
                    image.writes += 1;
                    Ok(Response::WriteSingleCoil(addr, value))
                }
                None => Err(ExceptionCode::IllegalDataAddress),
            },
            Request::WriteMultipleRegisters(addr, values) => {
                let start = addr as usize;
                match image.holding.get_mut(start..start + values.len()) {
                    Some(slots) => {
                        slots.copy_from_slice(&values);
                        image.writes += 1;
                        Ok(Response::WriteMultipleRegisters(addr, values.len() as u16))
                    }
                    None => Err(ExceptionCode::IllegalDataAddress),
                }
            }
            _ => Err(ExceptionCode::IllegalFunction),
        };

        future::ready(res)
    }
}

/// A SymbCtrl controller listening on 127.0.0.1
pub struct Simulator {
    addr: SocketAddr,
    image: Arc<Mutex<Image>>,
    stop: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Simulator {
    pub fn start() -> Self {
        let catalog = Catalog::symbctrl();
        let image = Arc::new(Mutex::new(Image {
            coils: vec![false; catalog.coil_span() as usize],
            holding: vec![0; catalog.holding_span() as usize],
            writes: 0,
        }));

        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let served = image.clone();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();

                let server = Server::new(listener);
                let on_connected = move |stream, socket_addr| {
                    let image = served.clone();
                    async move {
                        accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                            Ok(Some(SymbCtrlService {
                                image: image.clone(),
                            }))
                        })
                    }
                };
                let on_process_error = |err| {
                    eprintln!("Simulator error: {}", err);
                };

                tokio::select! {
                    result = server.serve(&on_connected, on_process_error) => {
                        if let Err(e) = result {
                            eprintln!("Simulator stopped: {}", e);
                        }
                    }
                    _ = stop_rx => {}
                }
            });
        });

        let addr = addr_rx.recv().unwrap();
        Self {
            addr,
            image,
            stop: Some(stop_tx),
            thread: Some(thread),
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Store a value in the image by register name
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let reg = Catalog::symbctrl().descriptor(name).unwrap();
        let mut image = self.image.lock();
        match reg.wire.encode(&value.into()).unwrap() {
            Encoded::Coil(bit) => image.coils[reg.address as usize] = bit,
            Encoded::Words(words) => {
                let start = reg.address as usize;
                image.holding[start..start + words.len()].copy_from_slice(&words);
            }
        }
    }

    /// Current value of a register in the image
    pub fn get(&self, name: &str) -> Value {
        let reg = Catalog::symbctrl().descriptor(name).unwrap();
        let image = self.image.lock();
        match reg.wire {
            WireType::Bool => Value::Bool(image.coils[reg.address as usize]),
            wire => {
                let start = reg.address as usize;
                wire.decode(&image.holding[start..start + wire.width() as usize])
            }
        }
    }

    /// Number of write requests served
    pub fn writes(&self) -> usize {
        self.image.lock().writes
    }

    /// Stop listening; later connections are refused
    pub fn shutdown(mut self) {
        self.stop_server();
    }

    fn stop_server(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            thread.join().unwrap();
        }
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.stop_server();
    }
}

/// Fast scanner settings for a simulator on `port`
pub fn scanner_config(port: u16) -> ScannerConfig {
    ScannerConfig {
        port,
        scan_interval_secs: 1,
        data_expiry_ms: 1_500,
        timeout_ms: 1_000,
        idle_backoff_ms: 10,
        write_retry_delay_ms: 50,
        ..ScannerConfig::default()
    }
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
