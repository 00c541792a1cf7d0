//! Result consolidation.

use std::fmt::Write;

use crate::result::{OverallStatus, StepResult};

/// Returned by [`consolidate`] when no step succeeded.
pub const NO_SUCCESSFUL_RESULTS: &str = "No successful results were produced.";

/// Aggregate status of a set of step results.
///
/// An empty set has nothing that succeeded, so it is `Failed`.
pub fn overall_status(results: &[StepResult]) -> OverallStatus {
  let succeeded = results.iter().filter(|r| r.is_success()).count();
  if succeeded == 0 {
    OverallStatus::Failed
  } else if succeeded == results.len() {
    OverallStatus::Completed
  } else {
    OverallStatus::Partial
  }
}

/// Summarize step results as text.
///
/// One section per successful step in the given order, then a count summary.
/// With no successful step the fixed [`NO_SUCCESSFUL_RESULTS`] message leads
/// instead; for an empty input it is the whole output.
pub fn consolidate(results: &[StepResult]) -> String {
  if results.is_empty() {
    return NO_SUCCESSFUL_RESULTS.to_string();
  }

  let mut out = String::new();
  let mut succeeded = 0;

  for result in results.iter().filter(|r| r.is_success()) {
    succeeded += 1;
    // Writing to a String cannot fail
    let _ = writeln!(out, "## Step {}: {}\n", result.step_id, result.role);
    let _ = writeln!(out, "{}\n", result.output.trim_end());
  }

  if succeeded == 0 {
    out.push_str(NO_SUCCESSFUL_RESULTS);
    out.push_str("\n\n");
  }

  let _ = write!(
    out,
    "Total: {} | Succeeded: {} | Failed: {}",
    results.len(),
    succeeded,
    results.len() - succeeded
  );

  out
}
