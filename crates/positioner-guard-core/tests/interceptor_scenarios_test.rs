//! End-to-end request sequences through the interceptor with an in-memory host.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use positioner_guard_core::{
    ArgKind, Argument, Arguments, DeferredEvent, Delivery, GuardAction, Host, Interceptor,
    ObjectRef, Phase,
};
use proptest::prelude::*;

const POSITIONER: u32 = 10;
const POPUP: u32 = 20;
const BARE_POPUP: u32 = 21;
const SURFACE: u32 = 30;
const ANONYMOUS: u32 = 40;

#[derive(Debug, Clone)]
struct Req {
    target: u32,
    opcode: u32,
    args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Forwarded { target: u32, opcode: u32, args: Vec<Argument> },
    Repositioned { popup: u32, token: u32 },
}

#[derive(Default)]
struct RecordingHost {
    seen: RefCell<Vec<Seen>>,
    /// When set, the `repositioned` handler issues this request re-entrantly.
    reentry: RefCell<Option<(Weak<Interceptor<RecordingHost>>, Req)>>,
}

impl Host for RecordingHost {
    type Proxy = u32;
    type Call = Req;

    fn target(&self, call: &Req) -> u32 {
        call.target
    }

    fn opcode(&self, call: &Req) -> u32 {
        call.opcode
    }

    fn interface_name(&self, proxy: u32) -> Option<&str> {
        match proxy {
            POSITIONER => Some("xdg_positioner"),
            POPUP | BARE_POPUP => Some("xdg_popup"),
            SURFACE => Some("wl_surface"),
            _ => None,
        }
    }

    fn arguments(&self, call: &Req, _shape: &[ArgKind]) -> Option<Arguments> {
        Some(Arguments::new(call.args.clone()))
    }

    fn forward(&self, call: Req) -> Option<u32> {
        self.seen.borrow_mut().push(Seen::Forwarded {
            target: call.target,
            opcode: call.opcode,
            args: call.args,
        });
        Some(call.target + 1000)
    }

    fn dispatch_repositioned(&self, event: &DeferredEvent<u32>) -> Delivery {
        if event.popup == BARE_POPUP {
            return Delivery::NoListener;
        }
        self.seen.borrow_mut().push(Seen::Repositioned {
            popup: event.popup,
            token: event.token,
        });
        let reentry = self.reentry.borrow_mut().take();
        if let Some((guard, req)) = reentry {
            if let Some(guard) = guard.upgrade() {
                guard.intercept(req);
            }
        }
        Delivery::Delivered
    }
}

fn set_size(w: i32, h: i32) -> Req {
    Req {
        target: POSITIONER,
        opcode: 1,
        args: vec![Argument::Int(w), Argument::Int(h)],
    }
}

fn reposition_on(popup: u32, token: u32) -> Req {
    Req {
        target: popup,
        opcode: 2,
        args: vec![
            Argument::Object(ObjectRef(POSITIONER as usize)),
            Argument::Uint(token),
        ],
    }
}

fn reposition(token: u32) -> Req {
    reposition_on(POPUP, token)
}

fn attach() -> Req {
    Req {
        target: SURFACE,
        opcode: 1,
        args: vec![Argument::Object(ObjectRef(0xB0)), Argument::Int(0), Argument::Int(0)],
    }
}

fn seen(guard: &Interceptor<RecordingHost>) -> Vec<Seen> {
    guard.host().seen.borrow().clone()
}

fn forwarded(req: &Req) -> Seen {
    Seen::Forwarded {
        target: req.target,
        opcode: req.opcode,
        args: req.args.clone(),
    }
}

#[test]
fn scenario_a_rejected_size_then_reposition_then_any_request() {
    let guard = Interceptor::new(RecordingHost::default());

    assert_eq!(guard.intercept(set_size(0, 0)), None);
    assert_eq!(guard.phase(), Phase::Rejected);

    assert_eq!(guard.intercept(reposition(7)), None);
    assert_eq!(guard.phase(), Phase::DeferredPending);
    assert_eq!(
        guard.pending(),
        Some(DeferredEvent {
            popup: POPUP,
            token: 7
        })
    );
    assert!(seen(&guard).is_empty());

    let next = attach();
    assert_eq!(guard.intercept(next.clone()), Some(SURFACE + 1000));
    assert_eq!(
        seen(&guard),
        vec![
            Seen::Repositioned {
                popup: POPUP,
                token: 7
            },
            forwarded(&next),
        ]
    );
    assert_eq!(guard.phase(), Phase::Idle);

    let snap = guard.metrics();
    assert_eq!(snap.calls_intercepted, 3);
    assert_eq!(snap.calls_forwarded, 1);
    assert_eq!(snap.sizes_rejected, 1);
    assert_eq!(snap.repositions_suppressed, 1);
    assert_eq!(snap.events_synthesized, 1);
}

#[test]
fn scenario_b_valid_size_lets_reposition_through() {
    let guard = Interceptor::new(RecordingHost::default());

    let size = set_size(100, 200);
    assert_eq!(guard.intercept(size.clone()), Some(POSITIONER + 1000));
    let repo = reposition(3);
    assert_eq!(guard.intercept(repo.clone()), Some(POPUP + 1000));

    assert_eq!(guard.pending(), None);
    assert_eq!(seen(&guard), vec![forwarded(&size), forwarded(&repo)]);
    assert_eq!(guard.metrics().sizes_accepted, 1);
}

#[test]
fn scenario_c_second_size_overwrites_rejection() {
    let guard = Interceptor::new(RecordingHost::default());

    assert_eq!(guard.intercept(set_size(0, 50)), None);
    assert_eq!(guard.phase(), Phase::Rejected);

    let size = set_size(10, 10);
    assert_eq!(guard.intercept(size.clone()), Some(POSITIONER + 1000));
    assert_eq!(guard.phase(), Phase::Idle);

    let repo = reposition(5);
    assert_eq!(guard.intercept(repo.clone()), Some(POPUP + 1000));
    assert_eq!(seen(&guard), vec![forwarded(&size), forwarded(&repo)]);
}

#[test]
fn scenario_d_nameless_target_is_forwarded_while_rejected() {
    let guard = Interceptor::new(RecordingHost::default());
    guard.intercept(set_size(0, 0));

    let nameless_size = Req {
        target: ANONYMOUS,
        opcode: 1,
        args: vec![Argument::Int(0), Argument::Int(0)],
    };
    let nameless_repo = Req {
        target: ANONYMOUS,
        opcode: 2,
        args: vec![Argument::Object(ObjectRef(1)), Argument::Uint(9)],
    };
    assert_eq!(guard.intercept(nameless_size.clone()), Some(ANONYMOUS + 1000));
    assert_eq!(guard.intercept(nameless_repo.clone()), Some(ANONYMOUS + 1000));
    assert_eq!(guard.phase(), Phase::Rejected);
    assert_eq!(
        seen(&guard),
        vec![forwarded(&nameless_size), forwarded(&nameless_repo)]
    );
}

#[test]
fn deferred_event_fires_exactly_once() {
    let guard = Interceptor::new(RecordingHost::default());
    guard.intercept(set_size(0, 0));
    guard.intercept(reposition(7));
    guard.intercept(attach());
    guard.intercept(attach());
    guard.intercept(attach());

    let events = seen(&guard)
        .into_iter()
        .filter(|s| matches!(s, Seen::Repositioned { .. }))
        .count();
    assert_eq!(events, 1);
    assert_eq!(guard.metrics().events_synthesized, 1);
}

#[test]
fn deferred_event_precedes_a_following_set_size() {
    let guard = Interceptor::new(RecordingHost::default());
    guard.intercept(set_size(0, 0));
    guard.intercept(reposition(8));

    // The next positioning session starts with another bad size; the owed
    // event is still delivered first and the new rejection is tracked.
    assert_eq!(guard.intercept(set_size(0, 0)), None);
    assert_eq!(
        seen(&guard),
        vec![Seen::Repositioned {
            popup: POPUP,
            token: 8
        }]
    );
    assert_eq!(guard.phase(), Phase::Rejected);
    assert_eq!(guard.intercept(reposition(9)), None);
    assert_eq!(
        guard.pending(),
        Some(DeferredEvent {
            popup: POPUP,
            token: 9
        })
    );
}

#[test]
fn popup_without_handler_drops_the_event_silently() {
    let guard = Interceptor::new(RecordingHost::default());
    guard.intercept(set_size(0, 0));
    assert_eq!(guard.intercept(reposition_on(BARE_POPUP, 4)), None);

    let next = attach();
    assert_eq!(guard.intercept(next.clone()), Some(SURFACE + 1000));
    assert_eq!(seen(&guard), vec![forwarded(&next)]);
    assert_eq!(guard.phase(), Phase::Idle);

    let snap = guard.metrics();
    assert_eq!(snap.events_dropped, 1);
    assert_eq!(snap.events_synthesized, 0);
}

#[test]
fn handler_may_issue_requests_reentrantly() {
    let guard = Rc::new(Interceptor::new(RecordingHost::default()));
    let nested = attach();
    *guard.host().reentry.borrow_mut() = Some((Rc::downgrade(&guard), nested.clone()));

    guard.intercept(set_size(0, 0));
    guard.intercept(reposition(12));

    let trigger = Req {
        target: SURFACE,
        opcode: 6,
        args: Vec::new(),
    };
    assert_eq!(guard.intercept(trigger.clone()), Some(SURFACE + 1000));
    assert_eq!(
        seen(&guard),
        vec![
            Seen::Repositioned {
                popup: POPUP,
                token: 12
            },
            forwarded(&nested),
            forwarded(&trigger),
        ]
    );
    assert_eq!(guard.metrics().events_synthesized, 1);
}

#[test]
fn suppression_actions_are_visible_in_counters() {
    let guard = Interceptor::new(RecordingHost::default());
    guard.intercept(set_size(-5, 10));
    guard.intercept(reposition(1));
    assert_eq!(
        guard.flush_deferred(),
        Some(GuardAction::SynthesizeRepositioned { token: 1 })
    );
    assert_eq!(guard.metrics().suppressed_total(), 2);
}

proptest! {
    #[test]
    fn non_positive_sizes_are_never_forwarded(
        w in any::<i32>(),
        h in any::<i32>(),
    ) {
        prop_assume!(w <= 0 || h <= 0);
        let guard = Interceptor::new(RecordingHost::default());
        prop_assert_eq!(guard.intercept(set_size(w, h)), None);
        prop_assert_eq!(guard.phase(), Phase::Rejected);
        prop_assert!(seen(&guard).is_empty());
    }

    #[test]
    fn positive_sizes_are_forwarded_unmodified(
        w in 1..=i32::MAX,
        h in 1..=i32::MAX,
        previously_rejected in any::<bool>(),
    ) {
        let guard = Interceptor::new(RecordingHost::default());
        if previously_rejected {
            guard.intercept(set_size(0, 0));
        }
        let req = set_size(w, h);
        prop_assert_eq!(guard.intercept(req.clone()), Some(POSITIONER + 1000));
        prop_assert_eq!(guard.phase(), Phase::Idle);
        prop_assert_eq!(seen(&guard), vec![forwarded(&req)]);
    }

    #[test]
    fn suppressed_reposition_keeps_its_token(token in any::<u32>()) {
        let guard = Interceptor::new(RecordingHost::default());
        guard.intercept(set_size(0, 0));
        prop_assert_eq!(guard.intercept(reposition(token)), None);
        prop_assert_eq!(guard.pending(), Some(DeferredEvent { popup: POPUP, token }));
        guard.intercept(attach());
        prop_assert_eq!(
            seen(&guard).first().cloned(),
            Some(Seen::Repositioned { popup: POPUP, token })
        );
    }
}
