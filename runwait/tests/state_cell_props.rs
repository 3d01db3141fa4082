use proptest::prelude::*;
use runwait::sync::{StateCell, TriState, UNSET_VALUE};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    Write(TriState),
    SetTrue,
    SetFalse,
    Unset,
    Replace(TriState),
}

fn tri_state() -> impl Strategy<Value = TriState> {
    prop_oneof![
        Just(TriState::Unset),
        Just(TriState::False),
        Just(TriState::True),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        tri_state().prop_map(Op::Write),
        Just(Op::SetTrue),
        Just(Op::SetFalse),
        Just(Op::Unset),
        tri_state().prop_map(Op::Replace),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn last_write_wins(ops in prop::collection::vec(op(), 0..64)) {
        let cell = StateCell::new();
        let mut model = TriState::Unset;

        for op in ops {
            match op {
                Op::Write(state) => {
                    cell.write(state);
                    model = state;
                }
                Op::SetTrue => {
                    cell.set_true();
                    model = TriState::True;
                }
                Op::SetFalse => {
                    cell.set_false();
                    model = TriState::False;
                }
                Op::Unset => {
                    cell.unset();
                    model = TriState::Unset;
                }
                Op::Replace(state) => {
                    prop_assert_eq!(cell.replace(state), model);
                    model = state;
                }
            }

            prop_assert_eq!(cell.read(), model);
        }
    }

    #[test]
    fn exactly_one_predicate_holds(state in tri_state()) {
        let cell = StateCell::with_state(state);
        let flags = [cell.is_unset(), cell.is_false(), cell.is_true()];

        prop_assert_eq!(flags.iter().filter(|f| **f).count(), 1);
    }

    #[test]
    fn raw_encoding_round_trips(state in tri_state()) {
        prop_assert_eq!(TriState::from_raw(state.to_raw()), Some(state));
    }

    #[test]
    fn unknown_raw_values_are_rejected(raw in any::<i32>()) {
        prop_assume!(raw != UNSET_VALUE && raw != 0 && raw != 1);
        prop_assert_eq!(TriState::from_raw(raw), None);
    }

    #[test]
    fn concurrent_writers_leave_a_written_state(
        writes in prop::collection::vec(tri_state(), 1..8),
    ) {
        let cell = Arc::new(StateCell::new());

        let writers: Vec<_> = writes
            .iter()
            .copied()
            .map(|state| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        cell.write(state);
                        let _ = cell.read();
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }

        prop_assert!(writes.contains(&cell.read()));
    }
}

#[test]
fn fresh_cell_is_unset() {
    let cell = StateCell::default();

    assert_eq!(cell.read(), TriState::Unset);
    assert!(!cell.is_true());
    assert!(!cell.is_false());
}
