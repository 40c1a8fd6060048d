use proptest::prelude::*;

use monohook::engine::{admission_queue, Admission};
use monohook::job::{header_env_key, HEADER_ENV_PREFIX};
use monohook_test_utils::builders::inert_job;

// A queue operation: `true` enqueues a job, `false` lets the worker take one.
fn ops_strategy() -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(any::<bool>(), 0..200)
}

proptest! {
    #[test]
    fn queue_never_holds_more_than_its_capacity(capacity in 1usize..16, ops in ops_strategy()) {
        let (queue, mut receiver) = admission_queue(capacity);
        let mut model: usize = 0;
        let mut next_seq: u64 = 1;
        let mut last_dequeued: u64 = 0;

        for enqueue in ops {
            if enqueue {
                let admission = queue.try_enqueue(inert_job());
                if model < capacity {
                    prop_assert_eq!(admission, Admission::Accepted(next_seq));
                    next_seq += 1;
                    model += 1;
                } else {
                    prop_assert_eq!(admission, Admission::Refused);
                }
            } else if let Some(queued) = receiver.try_dequeue() {
                // FIFO: sequence numbers leave in the order they were handed out.
                prop_assert_eq!(queued.seq, last_dequeued + 1);
                last_dequeued = queued.seq;
                model -= 1;
            } else {
                prop_assert_eq!(model, 0);
            }

            prop_assert!(receiver.len() <= capacity);
            prop_assert_eq!(receiver.len(), model);
        }
    }

    #[test]
    fn header_keys_are_prefixed_and_shell_friendly(name in "[A-Za-z0-9-]{1,32}") {
        let key = header_env_key(&name);

        prop_assert!(key.starts_with(HEADER_ENV_PREFIX));
        let suffix = &key[HEADER_ENV_PREFIX.len()..];
        prop_assert_eq!(suffix.len(), name.len());
        prop_assert!(!suffix.contains('-'));
        prop_assert!(!suffix.chars().any(|c| c.is_ascii_lowercase()));
        prop_assert_eq!(suffix, name.to_ascii_uppercase().replace('-', "_"));
    }
}
