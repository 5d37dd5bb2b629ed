//! Host doubles shared by the unit tests

use std::collections::VecDeque;
use std::vec::Vec;

use nixlink_hal::{ByteTransport, TickClock, TransportError};

/// In-memory transport with a scripted receive side
#[derive(Default)]
pub struct MockTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    write_budget: Option<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rx(bytes: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.queue_rx(bytes);
        transport
    }

    pub fn queue_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Accept `count` more bytes, then time out every write
    pub fn fail_writes_after(&mut self, count: usize) {
        self.write_budget = Some(count);
    }
}

impl ByteTransport for MockTransport {
    type Error = TransportError;

    fn try_read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                return Err(TransportError::Timeout);
            }
            *budget -= 1;
        }
        self.tx.push(byte);
        Ok(())
    }
}

/// Clock that only moves when told to
#[derive(Default)]
pub struct ManualClock {
    now: std::cell::Cell<u32>,
}

impl ManualClock {
    pub fn advance(&self, ticks: u32) {
        self.now.set(self.now.get().wrapping_add(ticks));
    }
}

impl TickClock for ManualClock {
    fn now(&self) -> u32 {
        self.now.get()
    }
}
