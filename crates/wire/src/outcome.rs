// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps a tool's success shape or a flat `{"error": "..."}` object.
//!
//! `Err` is tried first during deserialization: none of the success
//! shapes in this crate carry an `error` field, so the two cases never
//! collide.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Err { error: String },
    Ok(T),
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Outcome::Ok(value)
    }

    pub fn err(message: impl Into<String>) -> Self {
        Outcome::Err { error: message.into() }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Outcome::Ok(value) => Ok(value),
            Outcome::Err { error } => Err(error),
        }
    }
}

impl<T, E: ToString> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(e) => Outcome::Err { error: e.to_string() },
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
