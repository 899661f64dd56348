//! Every container must behave like `Vec` used as a stack.

use nexus_stack::workload::{Command, replay};
use nexus_stack::{
    Amortized, Array, Cursor, DoublyList, DoublyTailList, Exact, ExactGrow, FnPolicy,
    SinglyList, SinglyTailList, Stack,
};
use proptest::prelude::*;

fn command() -> impl Strategy<Value = Command<i32>> {
    prop_oneof![
        (-100_000..=100_000i32).prop_map(Command::Push),
        Just(Command::Pop),
    ]
}

fn contents<S: Stack<Item = i32>>(stack: &S) -> Vec<i32> {
    let mut out = Vec::new();
    let mut cursor = stack.cursor();
    while cursor.has_value() {
        out.push(*cursor.value());
        cursor.advance();
    }
    out
}

fn apply<S: Stack<Item = i32>>(stack: &mut S, command: Command<i32>) {
    match command {
        Command::Push(value) => stack.push(value),
        Command::Pop => {
            stack.pop();
        }
    }
}

proptest! {
    #[test]
    fn containers_match_reference(commands in prop::collection::vec(command(), 0..400)) {
        replay(&mut Array::<i32, Exact>::new(), commands.clone()).unwrap();
        replay(&mut Array::<i32, ExactGrow>::new(), commands.clone()).unwrap();
        replay(&mut Array::<i32, Amortized>::new(), commands.clone()).unwrap();
        replay(&mut SinglyList::new(), commands.clone()).unwrap();
        replay(&mut SinglyTailList::new(), commands.clone()).unwrap();
        replay(&mut DoublyList::new(), commands.clone()).unwrap();
        replay(&mut DoublyTailList::new(), commands).unwrap();
    }

    #[test]
    fn list_matches_array_at_every_step(commands in prop::collection::vec(command(), 0..400)) {
        let mut array: Array<i32> = Array::new();
        let mut singly = SinglyTailList::new();
        let mut doubly = DoublyList::new();

        for command in commands {
            apply(&mut array, command);
            apply(&mut singly, command);
            apply(&mut doubly, command);

            let expected = contents(&array);
            prop_assert_eq!(&contents(&singly), &expected);
            prop_assert_eq!(&contents(&doubly), &expected);
        }
    }

    #[test]
    fn capacity_bounds_len(commands in prop::collection::vec(command(), 0..400)) {
        let mut exact: Array<i32, Exact> = Array::new();
        let mut exact_grow: Array<i32, ExactGrow> = Array::new();
        let mut amortized: Array<i32, Amortized> = Array::new();
        let quarter = FnPolicy::new(|requested: usize, current: usize| requested + current / 4);
        let mut custom: Array<i32, _> = Array::with_policy(quarter);
        let mut high_water = 0;

        for command in commands {
            apply(&mut exact, command);
            apply(&mut exact_grow, command);
            apply(&mut amortized, command);
            match command {
                Command::Push(value) => {
                    custom.emplace_back(value);
                }
                Command::Pop => {
                    custom.pop_back();
                }
            }

            prop_assert_eq!(exact.capacity(), exact.len());
            prop_assert!(exact_grow.capacity() >= exact_grow.len());
            prop_assert!(amortized.capacity() >= amortized.len());
            prop_assert!(custom.capacity() >= custom.len());
            prop_assert!(amortized.capacity() >= high_water);
            high_water = amortized.capacity();
        }
    }
}

#[test]
fn custom_policy_drives_array_growth() {
    let doubling = FnPolicy::new(|requested: usize, current: usize| requested.max(current * 2));
    let mut array: Array<i32, _> = Array::with_policy(doubling);
    let mut capacities = Vec::new();
    for i in 0..9 {
        array.emplace_back(i);
        capacities.push(array.capacity());
    }
    assert_eq!(capacities, vec![1, 2, 4, 4, 8, 8, 8, 8, 16]);
    assert_eq!(array.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn round_trip_sizes() {
    fn check<S: Stack<Item = i32>>() {
        for n in [0, 1, 1000] {
            let mut stack = S::default();
            for i in 0..n {
                stack.push(i);
            }
            assert_eq!(stack.len(), n as usize, "{}", S::NAME);
            for i in (0..n).rev() {
                assert_eq!(stack.pop(), Some(i), "{}", S::NAME);
            }
            assert!(stack.is_empty());
            assert!(!stack.cursor().has_value());
            assert_eq!(stack.pop(), None);
        }
    }

    check::<Array<i32, Exact>>();
    check::<Array<i32, ExactGrow>>();
    check::<Array<i32, Amortized>>();
    check::<SinglyList<i32>>();
    check::<SinglyTailList<i32>>();
    check::<DoublyList<i32>>();
    check::<DoublyTailList<i32>>();
}
