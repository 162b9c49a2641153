//! Property tests: the command queue behaves like a bounded FIFO and the
//! dispatcher never leaves a consistent state whatever it is fed.

use std::collections::VecDeque;

use proptest::prelude::*;

use rover_dispatch::hal::MockActuator;
use rover_dispatch::queue::MAX_COMMAND_LEN;
use rover_dispatch::{CommandQueue, Dispatcher, QueueError, SubmitStatus};

const CAPACITY: usize = 5;

#[derive(Clone, Debug)]
enum Op {
    Enqueue(String),
    Dequeue,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => "[a-z0-9-]{0,70}".prop_map(Op::Enqueue),
        3 => Just(Op::Dequeue),
        1 => Just(Op::Clear),
    ]
}

fn submission() -> impl Strategy<Value = String> {
    prop_oneof![
        "(forward|back|left|right|stop)(-[0-9]{1,3}){0,2}",
        "!(forward|back|left|right|stop)(-[0-9]{1,3}){0,2}",
        Just("*c".to_string()),
        Just("*n".to_string()),
        Just("*x".to_string()),
        "[ -~]{0,80}",
    ]
}

proptest! {
    #[test]
    fn queue_matches_bounded_fifo_model(ops in prop::collection::vec(op(), 0..200)) {
        let mut queue: CommandQueue<CAPACITY> = CommandQueue::new();
        let mut model: VecDeque<String> = VecDeque::new();

        for op in ops {
            match op {
                Op::Enqueue(raw) => {
                    let result = queue.enqueue(&raw);
                    if model.len() == CAPACITY {
                        prop_assert_eq!(result, Err(QueueError::Full));
                    } else if raw.len() > MAX_COMMAND_LEN {
                        prop_assert_eq!(result, Err(QueueError::CommandTooLong));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.push_back(raw);
                    }
                }
                Op::Dequeue => {
                    let got = queue.dequeue().map(|entry| entry.as_str().to_string());
                    prop_assert_eq!(got, model.pop_front());
                }
                Op::Clear => {
                    queue.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(queue.len(), model.len());
            prop_assert!(queue.len() <= CAPACITY);
            prop_assert_eq!(queue.is_full(), model.len() == CAPACITY);
            prop_assert_eq!(queue.peek(), model.front().map(String::as_str));
            prop_assert!(queue.iter().eq(model.iter().map(String::as_str)));
        }
    }

    #[test]
    fn dispatcher_state_stays_consistent(
        steps in prop::collection::vec((submission(), 0u64..3000), 0..100)
    ) {
        let mut d: Dispatcher<MockActuator> = Dispatcher::new(MockActuator::new());
        let mut now_ms = 0u64;

        for (raw, advance) in steps {
            let status = d.submit(&raw, now_ms).unwrap();
            prop_assert!((-4..=2).contains(&status.code()));
            if status == SubmitStatus::Queued {
                prop_assert!(d.is_running());
            }

            now_ms += advance;
            d.tick(now_ms).unwrap();

            let state = d.state(now_ms);
            prop_assert!(state.pending <= state.capacity);
            prop_assert_eq!(state.pending, d.pending().count());
            if !state.running {
                prop_assert!(state.current.is_none());
                prop_assert!(!state.driving);
                prop_assert!(d.actuator().is_stopped());
            }
            if state.driving {
                prop_assert!(!d.actuator().is_stopped());
            }
        }
    }
}
