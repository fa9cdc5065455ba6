//! In-memory stand-ins for the serial port, used by the tests.

use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, Read, Write},
    rc::Rc,
};

use crate::error::MonitorError;

use super::transport::{Connector, Transport};

#[derive(Default)]
struct State {
    input: VecDeque<u8>,
    written: Vec<u8>,
    clears: usize,
    fail_reads: bool,
    /// Number of upcoming writes that fail.
    failing_writes: usize,
}

/// Scripted transport. Clones share state so a test can keep a handle after
/// the connection takes ownership of its copy.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_input(&self, bytes: &[u8]) {
        self.state.borrow_mut().input.extend(bytes.iter().copied());
    }

    pub fn fail_reads(&self) {
        self.state.borrow_mut().fail_reads = true;
    }

    pub fn fail_writes(&self) {
        self.fail_next_writes(usize::MAX);
    }

    pub fn fail_next_writes(&self, count: usize) {
        self.state.borrow_mut().failing_writes = count;
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clears
    }

    /// True once every copy except this handle has been dropped.
    pub fn is_released(&self) -> bool {
        Rc::strong_count(&self.state) == 1
    }
}

impl Read for FakeTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.fail_reads {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        let count = buf.len().min(state.input.len());
        for (slot, byte) in buf.iter_mut().zip(state.input.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

impl Write for FakeTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write refused"));
        }
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for FakeTransport {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        Ok(state.input.len())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.input.clear();
        state.clears += 1;
        Ok(())
    }
}

/// Hands out queued transports in order; `open` fails once the queue is empty.
pub struct FakeConnector {
    path: Option<String>,
    transports: RefCell<VecDeque<FakeTransport>>,
    opens: RefCell<Vec<String>>,
}

impl FakeConnector {
    pub fn with_transport(path: &str, transport: FakeTransport) -> Self {
        Self::with_transports(path, vec![transport])
    }

    pub fn with_transports(path: &str, transports: Vec<FakeTransport>) -> Self {
        Self {
            path: Some(path.to_string()),
            transports: RefCell::new(transports.into()),
            opens: RefCell::new(Vec::new()),
        }
    }

    /// Finds a device but every open attempt fails.
    pub fn busy() -> Self {
        Self::with_transports("/dev/fake", Vec::new())
    }

    /// No device present.
    pub fn empty() -> Self {
        Self {
            path: None,
            transports: RefCell::new(VecDeque::new()),
            opens: RefCell::new(Vec::new()),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.borrow().len()
    }
}

impl Connector for FakeConnector {
    fn discover(&self) -> Option<String> {
        self.path.clone()
    }

    fn open(&self, path: &str) -> Result<Box<dyn Transport>, MonitorError> {
        self.opens.borrow_mut().push(path.to_string());
        match self.transports.borrow_mut().pop_front() {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(MonitorError::DeviceBusy {
                path: path.to_string(),
                reason: "resource busy".into(),
            }),
        }
    }
}

/// Lets a test keep inspecting a connector after handing it to a controller.
impl Connector for Rc<FakeConnector> {
    fn discover(&self) -> Option<String> {
        (**self).discover()
    }

    fn open(&self, path: &str) -> Result<Box<dyn Transport>, MonitorError> {
        (**self).open(path)
    }
}
