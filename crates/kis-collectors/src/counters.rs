/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-dot-]browne[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Shared job counters. Workers take the mutex briefly at the end of each
//! unit to increment; the driver snapshots them for Task-row refreshes.

/// Per-job counter map
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
  pub processed: u32,
  pub success: u32,
  pub failed: u32,
  pub skipped: u32,
  pub incremental: u32,
  pub full: u32,
  pub records: u64,
}

impl Counters {
  pub fn record_skip(&mut self) {
    self.skipped += 1;
    self.success += 1;
    self.processed += 1;
  }

  pub fn record_success(&mut self, records_saved: u32) {
    self.success += 1;
    self.records += records_saved as u64;
    self.processed += 1;
  }

  pub fn record_failure(&mut self) {
    self.failed += 1;
    self.processed += 1;
  }

  pub fn progress_message(&self, total: usize) -> String {
    format!(
      "{}/{} stocks processed (skipped: {}, incremental: {}, full: {})",
      self.processed, total, self.skipped, self.incremental, self.full
    )
  }

  pub fn summary_message(&self, total: usize) -> String {
    format!(
      "Collection complete: {}/{} stocks (skipped: {}, incremental: {}, full: {}), {} records saved",
      self.success, total, self.skipped, self.incremental, self.full, self.records
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_record_skip_counts_as_success() {
    let mut counters = Counters::default();
    counters.record_skip();

    assert_eq!(counters.skipped, 1);
    assert_eq!(counters.success, 1);
    assert_eq!(counters.processed, 1);
    assert_eq!(counters.failed, 0);
  }

  #[test]
  fn test_record_success_accumulates_records() {
    let mut counters = Counters::default();
    counters.record_success(100);
    counters.record_success(3);

    assert_eq!(counters.success, 2);
    assert_eq!(counters.processed, 2);
    assert_eq!(counters.records, 103);
  }

  #[test]
  fn test_record_failure() {
    let mut counters = Counters::default();
    counters.record_failure();

    assert_eq!(counters.failed, 1);
    assert_eq!(counters.processed, 1);
    assert_eq!(counters.success, 0);
  }

  #[test]
  fn test_messages_include_breakdown() {
    let mut counters = Counters::default();
    counters.incremental = 2;
    counters.full = 1;
    counters.record_skip();
    counters.record_success(42);
    counters.record_success(8);

    let progress = counters.progress_message(10);
    assert!(progress.contains("3/10"));
    assert!(progress.contains("incremental: 2"));

    let summary = counters.summary_message(10);
    assert!(summary.contains("3/10"));
    assert!(summary.contains("50 records saved"));
  }
}
