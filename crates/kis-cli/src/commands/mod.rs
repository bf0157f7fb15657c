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

pub mod analyze;
pub mod collect;
pub mod tasks;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use kis_client::KisClient;
use kis_collectors::{PgTokenCacheStore, TaskRunner};
use kis_core::Config;
use kis_database_postgres::establish_pool;
use kis_database_postgres::models::status;

/// Process-root composition: pool, authenticated client, task runner
pub struct AppContext {
  pub runner: TaskRunner,
}

impl AppContext {
  pub async fn init(config: &Config) -> Result<Self> {
    // Room for the largest allowed worker pool plus the driver's own sessions
    let pool_size = (kis_core::MAX_WORKERS + 4) as u32;
    let pool = establish_pool(&config.database_url, pool_size)
      .await
      .context("Failed to connect to the database")?;

    let client = Arc::new(
      KisClient::new(config)
        .context("Failed to create KIS client")?
        .with_token_store(Box::new(PgTokenCacheStore::new(pool.clone()))),
    );

    let runner = TaskRunner::new(pool, client, config.clone());

    // Reconcile tasks orphaned by a previous crash before taking new work
    runner.sweep_stale().await?;

    Ok(Self { runner })
  }
}

/// Poll a task to completion, rendering its progress bar
pub async fn watch_task(runner: &TaskRunner, task_id: Uuid) -> Result<()> {
  let pb = ProgressBar::new(0);
  pb.set_style(
    ProgressStyle::default_bar()
      .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
      .unwrap()
      .progress_chars("##-"),
  );

  loop {
    let task = runner.get(task_id).await?;

    pb.set_length(task.total_items.max(0) as u64);
    pb.set_position(task.current_item.max(0) as u64);
    if let Some(message) = &task.message {
      pb.set_message(message.clone());
    }

    match task.status.as_str() {
      status::RUNNING => {}
      status::COMPLETED => {
        pb.finish_with_message(task.message.unwrap_or_else(|| "completed".to_string()));
        println!(
          "Task {} completed: {} succeeded, {} failed",
          task_id, task.success_count, task.failed_count
        );
        return Ok(());
      }
      status::CANCELLED => {
        pb.abandon_with_message("cancelled");
        println!("Task {} cancelled", task_id);
        return Ok(());
      }
      _ => {
        pb.abandon_with_message("failed");
        anyhow::bail!(
          "Task {} failed: {}",
          task_id,
          task.error_message.unwrap_or_else(|| "unknown error".to_string())
        );
      }
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
  }
}
