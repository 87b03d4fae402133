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

//! Upload a local file to an Azure Files share in fixed-size ranges.
//!
//! The flow is always the same:
//!
//! 1. [`Session::connect`] builds the authenticated client from [`Settings`].
//! 2. [`create_file()`] reads the local file and creates the remote file with
//!    the same length.
//! 3. [`upload()`] writes the content range by range, one request at a time.
//!
//! ```no_run
//! use fileshare_core::{Context, OsEnv};
//! use fileshare_file_read_tokio::TokioFileRead;
//! use fileshare_http_send_reqwest::ReqwestHttpSend;
//! use fileshare_upload::{create_file, upload, Session, Settings};
//!
//! # async fn run() -> fileshare_core::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//!
//! let session = Session::connect(&ctx, &Settings::from_env(&ctx)?).await?;
//! let file = create_file(&session, "report.pdf").await?;
//! let summary = upload(&session, &file, "report.pdf").await?;
//! println!("sent {} bytes in {} ranges", summary.bytes, summary.ranges);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use std::time::Duration;

mod plan;
pub use plan::RangePlan;

mod settings;
pub use settings::{AuthMethod, Settings, AUTH_METHOD};

mod session;
pub use session::Session;

mod upload;
pub use upload::{create_file, upload, RemoteFile, UploadState, UploadSummary, Uploader};

/// Bytes written per range request.
pub const RANGE_SIZE: u64 = 4 * 1024 * 1024;

/// Share every upload goes to.
pub const SHARE_NAME: &str = "test-file-share";

/// Directory inside [`SHARE_NAME`] every upload goes to.
pub const DIRECTORY_NAME: &str = "test-folder";

/// Remote name of the uploaded file, whatever the local name is.
pub const FILE_NAME: &str = "test-file.pdf";

/// How long a generated account SAS stays valid.
pub const SAS_LIFETIME: Duration = Duration::from_secs(60 * 60);
