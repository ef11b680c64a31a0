//! Rule-based helpers shared across the pipeline.

pub mod numeric;
pub mod patterns;

pub use numeric::{
    is_year_like, locate_sequence_run, split_runs, strip_year_tokens, Run, RunKind, SequenceRun,
};
