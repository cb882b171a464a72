//! Interceptor context: one instance per outgoing request stream.
//!
//! The interceptor owns the guard state and counters and borrows nothing from
//! the environment. Everything it needs from the outside world (proxy
//! introspection, listener dispatch, the real marshaling function) comes
//! through the [`Host`] it was constructed with.
//!
//! The state lock is held only while the state machine is consulted. It is
//! released before the host forwards a request or dispatches a client
//! callback, so a `repositioned` handler that issues new requests re-enters
//! [`Interceptor::intercept`] without deadlocking.

use std::fmt;

use parking_lot::Mutex;
use positioner_guard_membrane::{GuardAction, GuardMetrics, GuardMode, MetricsSnapshot};

use crate::call::{ArgKind, Arguments, ArgumentError};
use crate::classify::{CallKind, classify};
use crate::guard::{DeferredEvent, GuardState, Phase};

/// Outcome of dispatching a synthesized event to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The popup's `repositioned` handler ran.
    Delivered,
    /// The popup has no listener, or its listener has no `repositioned` entry.
    NoListener,
}

/// Environment the interceptor runs in.
pub trait Host {
    /// Handle of a protocol object.
    type Proxy: Copy + PartialEq + fmt::Debug + Send;
    /// One outgoing request, in whatever form the host receives it.
    type Call;

    fn target(&self, call: &Self::Call) -> Self::Proxy;

    fn opcode(&self, call: &Self::Call) -> u32;

    /// Interface name of `proxy`, read from the object itself.
    fn interface_name(&self, proxy: Self::Proxy) -> Option<&str>;

    /// Decode the leading arguments of `call` according to `shape`.
    ///
    /// Returns `None` when the request carries no argument array at all.
    fn arguments(&self, call: &Self::Call, shape: &[ArgKind]) -> Option<Arguments>;

    /// Hand `call` to the real marshaling function and return its result.
    fn forward(&self, call: Self::Call) -> Option<Self::Proxy>;

    /// Invoke the `repositioned` handler registered on `event.popup`.
    fn dispatch_repositioned(&self, event: &DeferredEvent<Self::Proxy>) -> Delivery;
}

pub struct Interceptor<H: Host> {
    host: H,
    mode: GuardMode,
    state: Mutex<GuardState<H::Proxy>>,
    metrics: GuardMetrics,
}

impl<H: Host> Interceptor<H> {
    /// Create an enforcing interceptor around `host`.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_mode(host, GuardMode::Enforce)
    }

    #[must_use]
    pub fn with_mode(host: H, mode: GuardMode) -> Self {
        Self {
            host,
            mode,
            state: Mutex::new(GuardState::new()),
            metrics: GuardMetrics::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    #[must_use]
    pub fn pending(&self) -> Option<DeferredEvent<H::Proxy>> {
        self.state.lock().pending().copied()
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Process one outgoing request.
    ///
    /// Returns the real result for forwarded requests and `None` for
    /// suppressed ones.
    pub fn intercept(&self, call: H::Call) -> Option<H::Proxy> {
        GuardMetrics::inc(&self.metrics.calls_intercepted);
        self.flush_deferred();

        let action = if self.mode.validation_enabled() {
            self.evaluate(&call)
        } else {
            GuardAction::None
        };
        self.metrics.record(&action);

        if action.suppresses_request() {
            return None;
        }
        GuardMetrics::inc(&self.metrics.calls_forwarded);
        self.host.forward(call)
    }

    /// Deliver the deferred `repositioned` event, if one is pending.
    ///
    /// Runs at the start of every [`Interceptor::intercept`]; exposed so a host
    /// can drain the slot at other quiescent points.
    pub fn flush_deferred(&self) -> Option<GuardAction> {
        let pending = self.state.lock().take_deferred();
        let event = pending?;

        let action = match self.host.dispatch_repositioned(&event) {
            Delivery::Delivered => GuardAction::SynthesizeRepositioned { token: event.token },
            Delivery::NoListener => GuardAction::DropRepositioned { token: event.token },
        };
        tracing::debug!(
            popup = ?event.popup,
            token = event.token,
            action = action.label(),
            "flushed deferred repositioned"
        );
        self.metrics.record(&action);
        Some(action)
    }

    fn evaluate(&self, call: &H::Call) -> GuardAction {
        let target = self.host.target(call);
        let opcode = self.host.opcode(call);
        let kind = classify(self.host.interface_name(target), opcode);
        if !kind.is_tracked() {
            return GuardAction::None;
        }

        let Some(args) = self.host.arguments(call, kind.shape()) else {
            return GuardAction::None;
        };

        let action = match kind {
            CallKind::SizeSet => match read_size(&args) {
                Ok((width, height)) => self.state.lock().on_set_size(width, height),
                Err(err) => return malformed(kind, opcode, err),
            },
            CallKind::DependentOp => match args.uint(1) {
                Ok(token) => self.state.lock().on_reposition(target, token),
                Err(err) => return malformed(kind, opcode, err),
            },
            CallKind::Other => GuardAction::None,
        };

        if action.is_heal() {
            tracing::debug!(proxy = ?target, ?kind, action = action.label(), detail = ?action, "suppressed request");
        }
        action
    }
}

fn read_size(args: &Arguments) -> Result<(i32, i32), ArgumentError> {
    Ok((args.int(0)?, args.int(1)?))
}

fn malformed(kind: CallKind, opcode: u32, err: ArgumentError) -> GuardAction {
    let action = GuardAction::ForwardMalformed;
    tracing::warn!(
        ?kind,
        opcode,
        action = action.label(),
        error = %err,
        "tracked request has unexpected arguments, forwarding"
    );
    action
}
