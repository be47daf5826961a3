//! # Exit Codes
//!
//! Process exit codes for the `algoscope` binary.

use crate::core::{ErrorKind, Outcome};

/// Analysis succeeded
pub const EXIT_SUCCESS: i32 = 0;

/// Source text was blank
pub const EXIT_EMPTY_INPUT: i32 = 1;

/// Invalid arguments: usage errors, unreadable input, invalid config
pub const EXIT_INVALID_ARGS: i32 = 2;

/// Unexpected failure inside the analysis pipeline
pub const EXIT_INTERNAL_ERROR: i32 = 3;

pub fn for_outcome(outcome: &Outcome) -> i32 {
    match outcome {
        Ok(_) => EXIT_SUCCESS,
        Err(error) => match error.kind {
            ErrorKind::EmptyInput => EXIT_EMPTY_INPUT,
            ErrorKind::InternalError => EXIT_INTERNAL_ERROR,
        },
    }
}
