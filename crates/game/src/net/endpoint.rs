use std::cell::RefCell;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rkyv::util::AlignedVec;

use super::protocol::{ClientMessage, PacketError, ServerMessage, WireMessage};
use super::simulator::Transport;
use super::stats::{LinkParams, LinkStats};
use crate::simulation::SharedClock;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("peer endpoint is no longer attached to the link")]
    Detached,
    #[error(transparent)]
    Packet(#[from] PacketError),
}

/// Typed view of one side of a [`Link`]: sends `S`, receives `R`.
///
/// The endpoint owns its inbound direction; the outbound direction belongs
/// to the peer, so sending after the peer endpoint was dropped fails with
/// [`LinkError::Detached`].
pub struct LinkEndpoint<S, R> {
    outbound: Weak<RefCell<Transport>>,
    inbound: Rc<RefCell<Transport>>,
    /// Delivered by the transport but not yet handed out.
    inbox: RefCell<VecDeque<AlignedVec>>,
    _marker: PhantomData<fn(S) -> R>,
}

pub type ClientEndpoint = LinkEndpoint<ClientMessage, ServerMessage>;
pub type ServerEndpoint = LinkEndpoint<ServerMessage, ClientMessage>;

impl<S: WireMessage, R: WireMessage> LinkEndpoint<S, R> {
    pub fn send(&self, message: &S) -> Result<(), LinkError> {
        let outbound = self.outbound.upgrade().ok_or(LinkError::Detached)?;
        let payload = message.encode()?;
        outbound.borrow_mut().send(payload);
        Ok(())
    }

    /// Returns every message delivered by now, in send order.
    ///
    /// A payload that fails to decode is reported on its own: messages
    /// ahead of it are returned first, and the error comes from the next
    /// call. Messages behind it stay queued.
    pub fn receive(&self) -> Result<Vec<R>, LinkError> {
        let mut inbox = self.inbox.borrow_mut();
        inbox.extend(self.inbound.borrow_mut().take_ready());

        let mut messages = Vec::with_capacity(inbox.len());
        while let Some(payload) = inbox.front() {
            match R::decode(payload) {
                Ok(message) => {
                    messages.push(message);
                    inbox.pop_front();
                }
                Err(err) if messages.is_empty() => {
                    inbox.pop_front();
                    return Err(err.into());
                }
                Err(_) => break,
            }
        }

        Ok(messages)
    }

    pub fn is_attached(&self) -> bool {
        self.outbound.strong_count() > 0
    }

    pub fn outbound_stats(&self) -> Option<LinkStats> {
        self.outbound.upgrade().map(|t| *t.borrow().stats())
    }

    pub fn inbound_stats(&self) -> LinkStats {
        *self.inbound.borrow().stats()
    }

    /// Messages addressed to this endpoint that have not been delivered yet.
    pub fn inbound_pending(&self) -> usize {
        self.inbound.borrow().pending() + self.inbox.borrow().len()
    }
}

/// A simulated bidirectional link between one client and the server.
pub struct Link {
    pub client: ClientEndpoint,
    pub server: ServerEndpoint,
}

impl Link {
    pub fn new(params: LinkParams, clock: SharedClock) -> Self {
        Self::with_rngs(
            params,
            clock,
            StdRng::from_entropy(),
            StdRng::from_entropy(),
        )
    }

    /// Reproducible link: both directions draw their delays from `seed`.
    pub fn seeded(params: LinkParams, clock: SharedClock, seed: u64) -> Self {
        Self::with_rngs(
            params,
            clock,
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        )
    }

    fn with_rngs(params: LinkParams, clock: SharedClock, uplink: StdRng, downlink: StdRng) -> Self {
        let to_server = Rc::new(RefCell::new(Transport::new(params, clock.clone(), uplink)));
        let to_client = Rc::new(RefCell::new(Transport::new(params, clock, downlink)));

        let client = LinkEndpoint {
            outbound: Rc::downgrade(&to_server),
            inbound: to_client.clone(),
            inbox: RefCell::default(),
            _marker: PhantomData,
        };
        let server = LinkEndpoint {
            outbound: Rc::downgrade(&to_client),
            inbound: to_server,
            inbox: RefCell::default(),
            _marker: PhantomData,
        };

        log::debug!(
            "link created: {} ms avg, {} ms spread",
            params.avg_delay_ms,
            params.spread_ms
        );

        Self { client, server }
    }

    pub fn into_parts(self) -> (ClientEndpoint, ServerEndpoint) {
        (self.client, self.server)
    }
}
