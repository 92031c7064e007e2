//! Property-based tests for the emulator engine.
//!
//! Sessions are generated from a small vocabulary of realistic lines mixed
//! with arbitrary text, so both the happy paths and the error paths of
//! dispatch get exercised.

use lineterm_core::{CommandTable, EmulatorState, VirtualFs, complete};
use proptest::prelude::*;

fn base_state() -> EmulatorState {
    let fs = VirtualFs::from_entries([
        ("/README.txt", Some("hello\nworld".to_string())),
        ("/.hidden", Some(String::new())),
        ("/etc", None),
        ("/etc/hosts", Some("Niv\nAvishai".to_string())),
        ("/etc/hostname", Some("sudovisudo.wtf".to_string())),
        ("/my docs", None),
    ])
    .expect("filesystem literal");
    EmulatorState::new(fs, CommandTable::with_defaults())
}

// ════════════════════════════════════════════════════════════
// Strategies
// ════════════════════════════════════════════════════════════

fn known_line() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "ls", "ls -la /etc", "cd etc", "cd ..", "cd /nope", "pwd", "cat README.txt",
        "cat /etc/hosts etc", "mkdir tmp", "mkdir -p a/b/c", "touch notes", "rm README.txt",
        "rm -r etc", "rmdir tmp", "cp -r etc backup", "echo $PWD", "head -n 1 /etc/hosts",
        "grep -i niv /etc/hosts", "export X=1", "unset X", "history", "help", "clear",
        "frobnicate", "", "   ", "ls -z", "head -n", "cat",
    ])
    .prop_map(str::to_string)
}

fn any_line() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => known_line(),
        1 => "[a-z $./'\"-]{0,16}",
    ]
}

#[derive(Clone, Debug)]
enum Op {
    Execute(String),
    Previous,
    Next,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => any_line().prop_map(Op::Execute),
        1 => Just(Op::Previous),
        1 => Just(Op::Next),
    ]
}

fn run(ops: &[Op]) -> EmulatorState {
    ops.iter().fold(base_state(), |state, op| match op {
        Op::Execute(line) => state.execute(line),
        Op::Previous => state.recall_previous().0,
        Op::Next => state.recall_next().0,
    })
}

// ════════════════════════════════════════════════════════════
// Execute
// ════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Same session, same result
    #[test]
    fn execute_is_deterministic(ops in prop::collection::vec(op(), 0..20)) {
        prop_assert_eq!(run(&ops), run(&ops));
    }

    /// History is exactly the executed lines, whatever navigation happened
    #[test]
    fn history_records_every_line(ops in prop::collection::vec(op(), 0..20)) {
        let expected: Vec<String> = ops
            .iter()
            .filter_map(|op| match op {
                Op::Execute(line) => Some(line.clone()),
                _ => None,
            })
            .collect();

        let state = run(&ops);
        prop_assert_eq!(state.history().entries(), expected.as_slice());
        prop_assert!(state.history().cursor() <= state.history().len());
    }

    /// Every execute starts its output with a header for the line
    #[test]
    fn outputs_start_with_header(line in any_line()) {
        let state = base_state().execute(&line);
        prop_assert_eq!(
            &state.outputs()[0],
            &lineterm_core::OutputRecord::header(line.as_str())
        );
    }

    /// Executing never modifies the state it was given
    #[test]
    fn execute_leaves_input_untouched(ops in prop::collection::vec(op(), 0..10), line in any_line()) {
        let before = run(&ops);
        let snapshot = before.clone();
        let _ = before.execute(&line);
        prop_assert_eq!(before, snapshot);
    }
}

// ════════════════════════════════════════════════════════════
// History navigation
// ════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// N x previous then N x next lands back on the empty input line
    #[test]
    fn navigation_round_trip(lines in prop::collection::vec(known_line(), 0..12)) {
        let mut state = lines.iter().fold(base_state(), |s, line| s.execute(line));
        let n = lines.len();

        for _ in 0..n {
            let (next, _) = state.recall_previous();
            prop_assert!(next.history().cursor() <= n);
            state = next;
        }
        if n > 0 {
            prop_assert_eq!(state.history().cursor(), 0);
        }

        let mut last = String::new();
        for _ in 0..n {
            let (next, line) = state.recall_next();
            prop_assert!(next.history().cursor() <= n);
            state = next;
            last = line;
        }
        prop_assert_eq!(last, "");
        prop_assert!(state.history().at_end());
    }

    /// Over-navigating clamps instead of wrapping
    #[test]
    fn navigation_clamps(lines in prop::collection::vec(known_line(), 1..6), extra in 0usize..5) {
        let mut state = lines.iter().fold(base_state(), |s, line| s.execute(line));

        let mut oldest = String::new();
        for _ in 0..lines.len() + extra {
            let (next, line) = state.recall_previous();
            state = next;
            oldest = line;
        }
        prop_assert_eq!(&oldest, &lines[0]);

        for _ in 0..lines.len() + extra {
            state = state.recall_next().0;
        }
        prop_assert!(state.history().at_end());
    }
}

// ════════════════════════════════════════════════════════════
// Autocomplete
// ════════════════════════════════════════════════════════════

fn partial_line() -> impl Strategy<Value = String> {
    let prefix = prop::sample::select(vec![
        "", "cat ", "ls ", "cd ", "grep x ", "head -n 2 ", "echo ", "cat $HOME/", "cd '",
    ]);
    (prefix, "[a-zA-Z/. ]{0,10}").prop_map(|(p, rest)| format!("{}{}", p, rest))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Completing a completed line changes nothing
    #[test]
    fn complete_is_idempotent(partial in partial_line()) {
        let state = base_state();
        let once = complete(&state, &partial);
        prop_assert_eq!(complete(&state, &once), once.clone());
    }

    /// Completion only ever extends the word under the cursor
    #[test]
    fn complete_keeps_unquoted_prefix(partial in "(cat |ls |cd )?[a-zA-Z/.]{0,10}") {
        let state = base_state();
        let completed = complete(&state, &partial);
        prop_assert!(completed.starts_with(partial.as_str()) || completed.contains('"'));
    }
}
