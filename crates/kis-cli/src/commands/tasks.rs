/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
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
use clap::Subcommand;
use uuid::Uuid;

use kis_core::Config;

use super::{AppContext, watch_task};

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
  /// List tasks currently running
  List,

  /// Show one task's progress
  Show {
    task_id: Uuid,
  },

  /// Request cooperative cancellation of a running task
  Cancel {
    task_id: Uuid,
  },

  /// Re-launch a task's type with default parameters
  Restart {
    task_id: Uuid,
  },

  /// Collect again only the stocks that failed in a prior run
  RetryFailed {
    task_id: Uuid,

    /// Look-back window for the retry, in calendar days
    #[arg(short, long, default_value = "120")]
    days: u32,
  },
}

pub async fn execute(cmd: TaskCommands, config: Config) -> Result<()> {
  let ctx = AppContext::init(&config).await?;

  match cmd {
    TaskCommands::List => {
      let tasks = ctx.runner.list_running().await?;
      if tasks.is_empty() {
        println!("No running tasks");
        return Ok(());
      }
      for task in tasks {
        println!(
          "{}  {}  {}/{}  {}",
          task.task_id,
          task.task_type,
          task.current_item,
          task.total_items,
          task.message.unwrap_or_default()
        );
      }
    }

    TaskCommands::Show { task_id } => {
      let task = ctx.runner.get(task_id).await?;
      println!("task_id:    {}", task.task_id);
      println!("type:       {}", task.task_type);
      println!("status:     {}", task.status);
      println!("progress:   {}/{}", task.current_item, task.total_items);
      println!("success:    {}", task.success_count);
      println!("failed:     {}", task.failed_count);
      if let Some(name) = task.current_stock_name {
        println!("current:    {}", name);
      }
      if let Some(message) = task.message {
        println!("message:    {}", message);
      }
      if let Some(error) = task.error_message {
        println!("error:      {}", error);
      }
    }

    TaskCommands::Cancel { task_id } => {
      if ctx.runner.cancel(task_id).await? {
        println!("Cancellation requested for {}", task_id);
      } else {
        println!("Task {} is not running", task_id);
      }
    }

    TaskCommands::Restart { task_id } => {
      let new_task_id = ctx.runner.restart(task_id).await?;
      println!("task_id: {}", new_task_id);
      watch_task(&ctx.runner, new_task_id).await?;
    }

    TaskCommands::RetryFailed { task_id, days } => {
      let new_task_id = ctx.runner.retry_failed(task_id, days).await?;
      println!("task_id: {}", new_task_id);
      watch_task(&ctx.runner, new_task_id).await?;
    }
  }

  Ok(())
}

pub async fn sweep(config: Config) -> Result<()> {
  let ctx = AppContext::init(&config).await?;
  // AppContext::init already sweeps; report the second pass explicitly
  let swept = ctx.runner.sweep_stale().await?;
  println!("Reconciled {} stale tasks", swept);
  Ok(())
}
