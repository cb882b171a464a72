//! In-memory [`Host`] that plays back a fixture case.
//!
//! Objects are numbered from 1 in name order; 0 is the null object. Nothing
//! is sent anywhere: forwarded requests are counted and synthesized events are
//! collected until the runner drains them.

use std::cell::{Cell, RefCell};

use positioner_guard_core::{ArgKind, Argument, Arguments, DeferredEvent, Delivery, Host, ObjectRef};

use crate::fixtures::{FixtureArg, FixtureCase, FixtureError, FixtureEvent};

/// Object handle inside a replay; 0 is null.
pub type ObjectId = usize;

/// One scripted request, resolved to object ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayCall {
    pub target: ObjectId,
    pub opcode: u32,
    pub args: Option<Vec<Argument>>,
}

pub struct ReplayHost {
    names: Vec<String>,
    interfaces: Vec<Option<String>>,
    listeners: Vec<bool>,
    delivered: RefCell<Vec<DeferredEvent<ObjectId>>>,
    forwarded: Cell<u64>,
}

impl ReplayHost {
    /// Build the object table for `case`.
    pub fn for_case(case: &FixtureCase) -> Result<Self, FixtureError> {
        let names: Vec<String> = case.objects.keys().cloned().collect();
        let interfaces = case.objects.values().cloned().collect();
        let mut listeners = vec![false; names.len()];
        for popup in &case.listeners {
            let Some(slot) = names.iter().position(|n| n == popup) else {
                return Err(FixtureError::UnknownListener {
                    case: case.name.clone(),
                    name: popup.clone(),
                });
            };
            listeners[slot] = true;
        }
        Ok(Self {
            names,
            interfaces,
            listeners,
            delivered: RefCell::new(Vec::new()),
            forwarded: Cell::new(0),
        })
    }

    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ObjectId> {
        self.names.iter().position(|n| n == name).map(|i| i + 1)
    }

    #[must_use]
    pub fn name_of(&self, id: ObjectId) -> Option<&str> {
        id.checked_sub(1)
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    /// Resolve one scripted step into a call.
    pub fn call(
        &self,
        case: &str,
        step: usize,
        target: &str,
        opcode: u32,
        args: Option<&[FixtureArg]>,
    ) -> Result<ReplayCall, FixtureError> {
        let resolve = |name: &str| {
            self.id_of(name).ok_or_else(|| FixtureError::UnknownObject {
                case: case.to_string(),
                step,
                name: name.to_string(),
            })
        };
        let target = resolve(target)?;
        let args = args
            .map(|args| {
                args.iter()
                    .map(|arg| {
                        Ok(match arg {
                            FixtureArg::Int(v) => Argument::Int(*v),
                            FixtureArg::Uint(v) => Argument::Uint(*v),
                            FixtureArg::Object(None) => Argument::Object(ObjectRef(0)),
                            FixtureArg::Object(Some(name)) => {
                                Argument::Object(ObjectRef(resolve(name)?))
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, FixtureError>>()
            })
            .transpose()?;
        Ok(ReplayCall {
            target,
            opcode,
            args,
        })
    }

    /// Events delivered since the last call, by popup name.
    pub fn take_delivered(&self) -> Vec<FixtureEvent> {
        self.delivered
            .take()
            .into_iter()
            .map(|event| FixtureEvent {
                popup: self.name_of(event.popup).unwrap_or("<null>").to_string(),
                token: event.token,
            })
            .collect()
    }

    #[must_use]
    pub fn forwarded(&self) -> u64 {
        self.forwarded.get()
    }
}

impl Host for ReplayHost {
    type Proxy = ObjectId;
    type Call = ReplayCall;

    fn target(&self, call: &ReplayCall) -> ObjectId {
        call.target
    }

    fn opcode(&self, call: &ReplayCall) -> u32 {
        call.opcode
    }

    fn interface_name(&self, proxy: ObjectId) -> Option<&str> {
        self.interfaces.get(proxy.checked_sub(1)?)?.as_deref()
    }

    // Scripted calls carry exactly the arguments the fixture lists; shape
    // mismatches surface through the typed accessors.
    fn arguments(&self, call: &ReplayCall, _shape: &[ArgKind]) -> Option<Arguments> {
        call.args.clone().map(Arguments::new)
    }

    fn forward(&self, call: ReplayCall) -> Option<ObjectId> {
        self.forwarded.set(self.forwarded.get() + 1);
        (call.target != 0).then_some(call.target)
    }

    fn dispatch_repositioned(&self, event: &DeferredEvent<ObjectId>) -> Delivery {
        let registered = event
            .popup
            .checked_sub(1)
            .and_then(|i| self.listeners.get(i))
            .copied()
            .unwrap_or(false);
        if !registered {
            return Delivery::NoListener;
        }
        self.delivered.borrow_mut().push(*event);
        Delivery::Delivered
    }
}
