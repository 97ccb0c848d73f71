pub(super) use harness::{Expectation, LintCase, run_cases};

mod locations;
