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

use serde::{Deserialize, Serialize};

/// Response of the client-credentials token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,

  /// Validity in seconds; the broker issues 24-hour tokens
  #[serde(default = "default_expires_in")]
  pub expires_in: i64,
}

fn default_expires_in() -> i64 {
  86_400
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_token_response_deserialize() {
    let json = r#"{"access_token":"abc123","expires_in":86400}"#;
    let token: TokenResponse = serde_json::from_str(json).unwrap();
    assert_eq!(token.access_token, "abc123");
    assert_eq!(token.expires_in, 86_400);
  }

  #[test]
  fn test_token_response_defaults_expires_in() {
    let json = r#"{"access_token":"abc123"}"#;
    let token: TokenResponse = serde_json::from_str(json).unwrap();
    assert_eq!(token.expires_in, 86_400);
  }
}
