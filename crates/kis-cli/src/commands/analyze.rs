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

use anyhow::Result;
use clap::Args;
use tracing::info;

use kis_collectors::{AnalysisKind, AnalyzeOptions, JobSpec, UniverseSelector};
use kis_core::{CollectionMode, Config};

use super::{AppContext, watch_task};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
  /// Universe selection: tagged, all, or top
  #[arg(short, long)]
  pub mode: Option<CollectionMode>,

  /// Look-back window in calendar days
  #[arg(short, long)]
  pub days: Option<u32>,

  /// Universe size in top mode
  #[arg(short, long)]
  pub limit: Option<u32>,

  /// Ignore the delta filter and re-scan the full universe
  #[arg(long)]
  pub force_full: bool,

  /// Launch and return the task id without waiting for completion
  #[arg(long)]
  pub no_wait: bool,
}

pub async fn execute(args: AnalyzeArgs, config: Config, moving_average: bool) -> Result<()> {
  let ctx = AppContext::init(&config).await?;

  let kind = if moving_average { AnalysisKind::MovingAverage } else { AnalysisKind::Trendline };
  let mode = args.mode.unwrap_or(CollectionMode::All);
  let limit = args.limit.unwrap_or(config.history_collection_limit);

  let options = AnalyzeOptions {
    universe: UniverseSelector::from_mode(mode, limit),
    days: args.days.unwrap_or_else(|| kind.default_days()),
    force_full: args.force_full,
  };

  info!(
    "Launching {} signal analysis ({}, {} days, force_full: {})",
    if moving_average { "moving-average" } else { "trendline" },
    options.universe.label(),
    options.days,
    options.force_full
  );

  let spec = if moving_average {
    JobSpec::MaAnalysis(options)
  } else {
    JobSpec::TrendlineAnalysis(options)
  };

  let task_id = ctx.runner.launch(spec).await?;
  println!("task_id: {}", task_id);

  if args.no_wait {
    return Ok(());
  }

  watch_task(&ctx.runner, task_id).await
}
