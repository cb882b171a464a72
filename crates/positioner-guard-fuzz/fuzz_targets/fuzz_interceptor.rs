#![no_main]
use std::cell::RefCell;

use libfuzzer_sys::fuzz_target;
use positioner_guard_core::{
    ArgKind, Argument, Arguments, DeferredEvent, Delivery, Host, Interceptor, ObjectRef,
};

const POSITIONER: usize = 1;
const POPUP: usize = 2;
const SURFACE: usize = 3;

struct Call {
    target: usize,
    opcode: u32,
    args: Option<Vec<Argument>>,
}

#[derive(Default)]
struct FuzzHost {
    delivered: RefCell<Vec<u32>>,
}

impl Host for FuzzHost {
    type Proxy = usize;
    type Call = Call;

    fn target(&self, call: &Call) -> usize {
        call.target
    }

    fn opcode(&self, call: &Call) -> u32 {
        call.opcode
    }

    fn interface_name(&self, proxy: usize) -> Option<&str> {
        match proxy {
            POSITIONER => Some("xdg_positioner"),
            POPUP => Some("xdg_popup"),
            SURFACE => Some("wl_surface"),
            _ => None,
        }
    }

    fn arguments(&self, call: &Call, _shape: &[ArgKind]) -> Option<Arguments> {
        call.args.clone().map(Arguments::new)
    }

    fn forward(&self, call: Call) -> Option<usize> {
        Some(call.target)
    }

    fn dispatch_repositioned(&self, event: &DeferredEvent<usize>) -> Delivery {
        assert_eq!(event.popup, POPUP);
        self.delivered.borrow_mut().push(event.token);
        Delivery::Delivered
    }
}

fn call(target: usize, opcode: u32, args: Option<Vec<Argument>>) -> Call {
    Call {
        target,
        opcode,
        args,
    }
}

/// One request per three input bytes; the size is returned for well-formed
/// `set_size` requests.
fn decode(op: u8, a: u8, b: u8) -> (Call, Option<(i32, i32)>) {
    match op % 6 {
        0 => {
            let (w, h) = (i32::from(a as i8), i32::from(b as i8));
            let args = vec![Argument::Int(w), Argument::Int(h)];
            (call(POSITIONER, 1, Some(args)), Some((w, h)))
        }
        1 => {
            let args = vec![
                Argument::Object(ObjectRef(POSITIONER)),
                Argument::Uint(u32::from_le_bytes([a, b, 0, 0])),
            ];
            (call(POPUP, 2, Some(args)), None)
        }
        2 => (call(SURFACE, u32::from(a), None), None),
        3 => {
            let args = vec![Argument::Uint(u32::from(a))];
            (call(POSITIONER, 1, Some(args)), None)
        }
        4 => (call(0, u32::from(a % 4), None), None),
        _ => (call(POPUP, u32::from(a % 4), Some(Vec::new())), None),
    }
}

fuzz_target!(|data: &[u8]| {
    let interceptor = Interceptor::new(FuzzHost::default());
    // Token of the one suppressed reposition still owed to the client.
    let mut owed: Option<u32> = None;
    // Whether the most recent well-formed set_size was rejected.
    let mut blocked = false;

    for chunk in data.chunks(3) {
        let [op, a, b] = match *chunk {
            [op, a, b] => [op, a, b],
            _ => break,
        };
        let (call, size) = decode(op, a, b);
        let is_reposition = call.target == POPUP
            && call.opcode == 2
            && call.args.as_ref().is_some_and(|args| args.len() == 2);
        let token = match call.args.as_deref() {
            Some([_, Argument::Uint(t)]) => Some(*t),
            _ => None,
        };

        let result = interceptor.intercept(call);

        // The owed event, and only it, was delivered before this request.
        let delivered = interceptor.host().delivered.take();
        assert_eq!(delivered, owed.take().into_iter().collect::<Vec<_>>());

        if let Some((w, h)) = size {
            blocked = !(w > 0 && h > 0);
            assert_eq!(result.is_none(), blocked);
        } else if is_reposition && blocked {
            assert!(result.is_none());
            blocked = false;
            owed = token;
        } else {
            assert!(result.is_some());
        }
        assert!(interceptor.pending().map(|e| e.token) == owed);
    }

    let m = interceptor.metrics();
    assert_eq!(
        m.events_synthesized + u64::from(owed.is_some()),
        m.repositions_suppressed
    );
});
