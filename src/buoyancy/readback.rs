//! Asynchronous single-texel reads of the height field.
//!
//! A read is a single-slot cell shared by a [`ReadTicket`] (held by the
//! voxel) and a [`ReadCompleter`] (held by whoever services the request).
//! Neither side blocks; dropping the ticket abandons the read and a late
//! completion only touches the shared slot.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::ReadError;
use crate::ocean::{HeightField, Texel};

const PENDING: u8 = 0;
const DONE: u8 = 1;
const FAILED: u8 = 2;

#[derive(Debug)]
struct ReadSlot {
    state: AtomicU8,
    bits: AtomicU32,
}

/// Result of polling a ticket
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReadStatus {
    Pending,
    Ready(f32),
    Failed(ReadError),
}

/// Consumer handle of one in-flight read
#[derive(Debug)]
pub struct ReadTicket {
    slot: Arc<ReadSlot>,
    texel: Texel,
}

/// Producer handle of one in-flight read
#[derive(Debug)]
pub struct ReadCompleter {
    slot: Arc<ReadSlot>,
}

/// Create a linked ticket/completer pair for a read of `texel`
pub fn read_channel(texel: Texel) -> (ReadTicket, ReadCompleter) {
    let slot = Arc::new(ReadSlot {
        state: AtomicU8::new(PENDING),
        bits: AtomicU32::new(0),
    });
    (
        ReadTicket {
            slot: Arc::clone(&slot),
            texel,
        },
        ReadCompleter { slot },
    )
}

impl ReadTicket {
    pub fn texel(&self) -> Texel {
        self.texel
    }

    pub fn is_done(&self) -> bool {
        self.slot.state.load(Ordering::Acquire) != PENDING
    }

    pub fn has_error(&self) -> bool {
        self.slot.state.load(Ordering::Acquire) == FAILED
    }

    /// Decoded scalar, if the read completed successfully
    pub fn data(&self) -> Option<f32> {
        match self.poll() {
            ReadStatus::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Non-blocking status check
    pub fn poll(&self) -> ReadStatus {
        match self.slot.state.load(Ordering::Acquire) {
            PENDING => ReadStatus::Pending,
            DONE => ReadStatus::Ready(f32::from_bits(self.slot.bits.load(Ordering::Relaxed))),
            _ => ReadStatus::Failed(ReadError {
                x: self.texel.x,
                y: self.texel.y,
            }),
        }
    }
}

impl ReadCompleter {
    pub fn complete(self, value: f32) {
        self.slot.bits.store(value.to_bits(), Ordering::Relaxed);
        self.slot.state.store(DONE, Ordering::Release);
    }

    pub fn fail(self) {
        self.slot.state.store(FAILED, Ordering::Release);
    }

    /// True once the ticket side has been dropped
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.slot) == 1
    }
}

/// Source of asynchronous height reads (a GPU readback queue, a worker, ...)
pub trait FieldReadback {
    /// Fire-and-forget request for one texel of `field`
    fn request(&mut self, field: &HeightField, texel: Texel) -> ReadTicket;
}

struct QueuedRead {
    due_tick: u64,
    value: f32,
    fail: bool,
    completer: ReadCompleter,
}

/// In-process readback that snapshots the texel at request time and
/// completes it a fixed number of pumps later
pub struct QueuedReadback {
    latency_ticks: Option<u32>,
    queue: VecDeque<QueuedRead>,
    tick: u64,
    fail_budget: u32,
    discarded: u64,
}

impl QueuedReadback {
    /// Reads complete after `latency_ticks` pumps (at least one)
    pub fn new(latency_ticks: u32) -> Self {
        Self {
            latency_ticks: Some(latency_ticks.max(1)),
            queue: VecDeque::new(),
            tick: 0,
            fail_budget: 0,
            discarded: 0,
        }
    }

    /// A readback whose requests never complete
    pub fn stalled() -> Self {
        Self {
            latency_ticks: None,
            ..Self::new(1)
        }
    }

    /// Complete the next `count` requests with the error flag set
    pub fn fail_next(&mut self, count: u32) {
        self.fail_budget += count;
    }

    /// Requests issued but not yet completed
    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    /// Completions dropped because their ticket no longer existed
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Advance one tick and complete every read that is due
    pub fn pump(&mut self) {
        self.tick += 1;
        while self
            .queue
            .front()
            .is_some_and(|read| read.due_tick <= self.tick)
        {
            let Some(read) = self.queue.pop_front() else {
                break;
            };
            if read.completer.is_abandoned() {
                self.discarded += 1;
                debug!("Readback: discarding completion for dropped voxel");
                continue;
            }
            if read.fail {
                read.completer.fail();
            } else {
                read.completer.complete(read.value);
            }
        }
    }
}

impl FieldReadback for QueuedReadback {
    fn request(&mut self, field: &HeightField, texel: Texel) -> ReadTicket {
        let (ticket, completer) = read_channel(texel);
        let fail = self.fail_budget > 0;
        if fail {
            self.fail_budget -= 1;
        }
        self.queue.push_back(QueuedRead {
            due_tick: match self.latency_ticks {
                Some(latency) => self.tick + u64::from(latency),
                None => u64::MAX,
            },
            value: field.read(texel),
            fail,
            completer,
        });
        ticket
    }
}
