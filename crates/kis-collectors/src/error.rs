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

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CollectorError {
  #[error("API error: {0}")]
  ApiError(String),

  #[error("Database error: {0}")]
  DatabaseError(String),

  #[error("Configuration error: {0}")]
  ConfigurationError(String),

  #[error("Invalid data: {0}")]
  InvalidData(String),

  #[error("Task not found: {0}")]
  TaskNotFound(Uuid),

  #[error("Serialization error: {0}")]
  SerializationError(String),

  #[error("Task cancelled")]
  Cancelled,

  #[error("Soft time limit exceeded (59 minutes)")]
  TimeLimit,
}

impl From<kis_core::Error> for CollectorError {
  fn from(err: kis_core::Error) -> Self {
    match err {
      kis_core::Error::MissingCredentials(msg) => CollectorError::ConfigurationError(msg),
      kis_core::Error::Config(msg) => CollectorError::ConfigurationError(msg),
      other => CollectorError::ApiError(other.to_string()),
    }
  }
}

impl From<diesel::result::Error> for CollectorError {
  fn from(err: diesel::result::Error) -> Self {
    CollectorError::DatabaseError(err.to_string())
  }
}

impl From<diesel::ConnectionError> for CollectorError {
  fn from(err: diesel::ConnectionError) -> Self {
    CollectorError::DatabaseError(err.to_string())
  }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for CollectorError {
  fn from(err: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
    CollectorError::DatabaseError(err.to_string())
  }
}

impl From<serde_json::Error> for CollectorError {
  fn from(err: serde_json::Error) -> Self {
    CollectorError::SerializationError(err.to_string())
  }
}

pub type CollectorResult<T> = Result<T, CollectorError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display_api() {
    let err = CollectorError::ApiError("connection refused".to_string());
    assert_eq!(err.to_string(), "API error: connection refused");
  }

  #[test]
  fn test_error_display_database() {
    let err = CollectorError::DatabaseError("deadlock".to_string());
    assert_eq!(err.to_string(), "Database error: deadlock");
  }

  #[test]
  fn test_error_display_time_limit() {
    assert_eq!(
      CollectorError::TimeLimit.to_string(),
      "Soft time limit exceeded (59 minutes)"
    );
  }

  #[test]
  fn test_missing_credentials_maps_to_configuration() {
    let err = CollectorError::from(kis_core::Error::MissingCredentials("no key".to_string()));
    assert!(matches!(err, CollectorError::ConfigurationError(_)));
  }

  #[test]
  fn test_http_error_maps_to_api() {
    let err = CollectorError::from(kis_core::Error::Http("timeout".to_string()));
    assert!(matches!(err, CollectorError::ApiError(_)));
  }
}
