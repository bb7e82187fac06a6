//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use std::path::Path;

use walltone::error::CommitError;
use walltone::services::{CommitOutcome, CommitReport, CommitState};

use super::fixtures::temp_files;

/// Assert the commit finished with the expected UI outcome
pub fn assert_outcome(result: &Result<CommitReport, CommitError>, expected: CommitOutcome) {
    assert_eq!(
        CommitOutcome::of(result),
        expected,
        "Unexpected commit result: {result:?}"
    );
}

/// Assert no `wallpaper_*` temp files survived in `dir`
pub fn assert_no_temp_files(dir: &Path) {
    let leftovers = temp_files(dir);
    assert!(
        leftovers.is_empty(),
        "Temporary files left behind: {leftovers:?}"
    );
}

/// Assert `expected` appears in `states` in order (other states may interleave)
pub fn assert_states_in_order(states: &[CommitState], expected: &[CommitState]) {
    let mut remaining = expected.iter().peekable();
    for state in states {
        if remaining.peek() == Some(&state) {
            remaining.next();
        }
    }
    let missing: Vec<_> = remaining.collect();
    assert!(
        missing.is_empty(),
        "States {missing:?} not found in order within {states:?}"
    );
}
