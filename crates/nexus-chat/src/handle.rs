//! A cloneable handle for observing sends from external code.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

use crate::error::{Error, Result};

/// Where the current send is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPhase {
    /// No send in flight, draft empty
    Idle,
    /// Draft has text or files
    Composing,
    /// Optimistic message merged, network call issued
    Sending,
    /// Reply chunks arriving
    Streaming,
}

impl SendPhase {
    fn to_u8(self) -> u8 {
        match self {
            SendPhase::Idle => 0,
            SendPhase::Composing => 1,
            SendPhase::Sending => 2,
            SendPhase::Streaming => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => SendPhase::Composing,
            2 => SendPhase::Sending,
            3 => SendPhase::Streaming,
            _ => SendPhase::Idle,
        }
    }
}

/// A cloneable handle for observing sends from external code.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct ChatHandle {
    pub(crate) sending: Arc<AtomicBool>,
    pub(crate) phase: Arc<AtomicU8>,
}

impl ChatHandle {
    pub(crate) fn new() -> Self {
        Self {
            sending: Arc::new(AtomicBool::new(false)),
            phase: Arc::new(AtomicU8::new(SendPhase::Idle.to_u8())),
        }
    }

    /// Claim the single send slot. Fails if another send is in flight.
    pub(crate) fn begin_send(&self) -> Result<SendGuard> {
        self.sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::SendInProgress)?;
        self.set_phase(SendPhase::Sending);
        Ok(SendGuard {
            handle: self.clone(),
        })
    }

    pub(crate) fn set_phase(&self, phase: SendPhase) {
        self.phase.store(phase.to_u8(), Ordering::Release);
    }

    /// Network-side phase: `Idle`, `Sending` or `Streaming`
    pub fn phase(&self) -> SendPhase {
        SendPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Whether a send is in flight
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }
}

/// Releases the send slot when dropped
pub(crate) struct SendGuard {
    handle: ChatHandle,
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.handle.set_phase(SendPhase::Idle);
        self.handle.sending.store(false, Ordering::Release);
    }
}
