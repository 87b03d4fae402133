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

//! Tokio-based file reading for fileshare.
//!
//! This crate provides `TokioFileRead`, an async file reader that implements
//! the `FileRead` trait from `fileshare_core` using Tokio's file system operations.
//!
//! ## Example
//!
//! ```no_run
//! use fileshare_core::{Context, OsEnv};
//! use fileshare_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("/path/to/report.pdf").await {
//!         Ok(content) => println!("Read {} bytes", content.len()),
//!         Err(e) => eprintln!("Failed to read file: {}", e),
//!     }
//! }
//! ```

use async_trait::async_trait;
use fileshare_core::{Error, FileRead, Result};
use log::debug;

/// Tokio-based implementation of the `FileRead` trait.
///
/// The whole file is loaded into memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| Error::file_read(format!("failed to read {path}")).with_source(e))?;

        debug!("read {} bytes from {path}", content.len());
        Ok(content)
    }
}
