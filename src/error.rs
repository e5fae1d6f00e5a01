// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Defines `JaggedError` for representing failures in jagged-array operations.

use std::error::Error;
use std::fmt;

/// Many different operations in the `jagged` crate return this error type.
#[derive(Debug, Clone, PartialEq)]
pub enum JaggedError {
    /// A structural invariant of a layout was violated (non-monotonic
    /// offsets, offsets exceeding the content length, a parents vector of
    /// the wrong length). The message names the layout class and the
    /// offending index.
    StructuralError(String),
    /// An argument was rejected at the operation's entry point.
    InvalidArgumentError(String),
    /// An operation is not defined for the given layout or element type.
    ComputeError(String),
}

impl fmt::Display for JaggedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JaggedError::StructuralError(desc) => {
                write!(f, "Structural error: {}", desc)
            }
            JaggedError::InvalidArgumentError(desc) => {
                write!(f, "Invalid argument error: {}", desc)
            }
            JaggedError::ComputeError(desc) => write!(f, "Compute error: {}", desc),
        }
    }
}

impl Error for JaggedError {}

pub type Result<T> = std::result::Result<T, JaggedError>;

/// Error record returned by kernels: a static message plus the offending
/// index, or -1 when no single index is at fault. Kernels never allocate,
/// so the message is attached to a layout class name only at the
/// orchestrator boundary (see [`handle_kernel_error`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelError {
    pub message: &'static str,
    pub index: i64,
}

impl KernelError {
    pub fn new(message: &'static str, index: i64) -> Self {
        Self { message, index }
    }
}

/// Converts a kernel error record into a [`JaggedError::StructuralError`]
/// naming the layout class it originated from.
pub fn handle_kernel_error(
    result: std::result::Result<(), KernelError>,
    classname: &str,
) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.index < 0 => Err(JaggedError::StructuralError(format!(
            "in {}: {}",
            classname, err.message
        ))),
        Err(err) => Err(JaggedError::StructuralError(format!(
            "in {}: {} at i={}",
            classname, err.message, err.index
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_error_attaches_classname_and_index() {
        let err = handle_kernel_error(
            Err(KernelError::new("offsets must be monotonically increasing", 3)),
            "ListOffsetArray64",
        )
        .unwrap_err();
        assert_eq!(
            err,
            JaggedError::StructuralError(
                "in ListOffsetArray64: offsets must be monotonically increasing at i=3"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_kernel_error_without_index() {
        let err = handle_kernel_error(
            Err(KernelError::new("array too large", -1)),
            "ListOffsetArray64",
        )
        .unwrap_err();
        assert_eq!(
            err,
            JaggedError::StructuralError("in ListOffsetArray64: array too large".to_string())
        );
    }
}
