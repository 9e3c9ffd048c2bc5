//! Channel lifecycle shared by all bindings

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{McpError, McpResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    AwaitingRequest,
    Processing,
    Closed,
}

#[derive(Debug)]
struct Inner {
    state: ChannelState,
    in_flight: usize,
}

/// One logical channel: `Idle -> AwaitingRequest <-> Processing -> Closed`
#[derive(Debug)]
pub struct Channel {
    id: String,
    binding: &'static str,
    inner: Mutex<Inner>,
}

impl Channel {
    pub fn new(binding: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            binding,
            inner: Mutex::new(Inner { state: ChannelState::Idle, in_flight: 0 }),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ChannelState {
        self.lock().state
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Accept invocations. Has no effect once closed.
    pub fn open(&self) {
        let mut inner = self.lock();
        if inner.state == ChannelState::Idle {
            inner.state = ChannelState::AwaitingRequest;
            info!(binding = self.binding, channel = %self.id, "channel opened");
        }
    }

    /// Admit one invocation; the returned guard marks it finished on drop
    pub fn begin(self: &Arc<Self>) -> McpResult<InvocationGuard> {
        let mut inner = self.lock();
        match inner.state {
            ChannelState::Closed => return Err(McpError::ChannelClosed),
            ChannelState::Idle => {
                return Err(McpError::Transport(format!("channel {} is not open", self.id)))
            }
            ChannelState::AwaitingRequest | ChannelState::Processing => {}
        }
        inner.state = ChannelState::Processing;
        inner.in_flight += 1;
        debug!(channel = %self.id, in_flight = inner.in_flight, "invocation admitted");
        Ok(InvocationGuard { channel: self.clone() })
    }

    /// Close the channel; returns how many invocations were still in flight
    pub fn close(&self) -> usize {
        let mut inner = self.lock();
        if inner.state != ChannelState::Closed {
            inner.state = ChannelState::Closed;
            info!(
                binding = self.binding,
                channel = %self.id,
                abandoned = inner.in_flight,
                "channel closed"
            );
        }
        inner.in_flight
    }

    fn finish(&self) {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        if inner.in_flight == 0 && inner.state == ChannelState::Processing {
            inner.state = ChannelState::AwaitingRequest;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Marks one admitted invocation; dropping it (completion or cancellation) releases it
#[derive(Debug)]
pub struct InvocationGuard {
    channel: Arc<Channel>,
}

impl Drop for InvocationGuard {
    fn drop(&mut self) {
        self.channel.finish();
    }
}
