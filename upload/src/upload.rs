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

use bytes::Bytes;
use fileshare_azure_file::FileClient;
use fileshare_core::hash::base64_md5;
use fileshare_core::{Error, Result};
use log::{debug, error, info};

use crate::{RangePlan, Session, FILE_NAME, RANGE_SIZE};

/// The remote file created for an upload.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Client addressing the file.
    pub client: FileClient,
    /// Length the file was created with.
    pub size: u64,
}

/// Where an [`Uploader`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// No range was sent yet.
    NotStarted,
    /// The range at `offset` is being written.
    Uploading {
        /// Start of the range in flight.
        offset: u64,
    },
    /// Every range was written.
    Complete,
    /// Writing the range at `offset` failed. Later ranges were not sent.
    Failed {
        /// Start of the range that failed.
        offset: u64,
    },
}

/// Result of a finished upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Bytes written.
    pub bytes: u64,
    /// Range requests sent.
    pub ranges: usize,
}

/// Create the remote file for the local file at `path`.
///
/// The local file is read first, so a missing file never reaches the service.
/// The remote file is always `test-file-share/test-folder/test-file.pdf`.
pub async fn create_file(session: &Session, path: &str) -> Result<RemoteFile> {
    let content = session.context().file_read(path).await?;
    let size = content.len() as u64;

    let client = session.directory().create_file(FILE_NAME, size).await?;
    info!("File created");

    Ok(RemoteFile { client, size })
}

/// Upload the local file at `path` into `file`.
pub async fn upload(session: &Session, file: &RemoteFile, path: &str) -> Result<UploadSummary> {
    let content = session.context().file_read(path).await?;

    let mut uploader = Uploader::new(file);
    uploader.run(Bytes::from(content)).await
}

/// Writes content into a [`RemoteFile`] range by range.
///
/// Ranges are sent one after another, each awaited before the next. The
/// first failure ends the run; there is no retry and the partially written
/// remote file is left as is.
#[derive(Debug)]
pub struct Uploader<'a> {
    file: &'a RemoteFile,
    range_size: u64,
    state: UploadState,
}

impl<'a> Uploader<'a> {
    /// Create an uploader using [`RANGE_SIZE`] ranges.
    pub fn new(file: &'a RemoteFile) -> Self {
        Self {
            file,
            range_size: RANGE_SIZE,
            state: UploadState::NotStarted,
        }
    }

    /// Use a different range size.
    ///
    /// Put Range accepts at most [`RANGE_SIZE`] bytes, so a larger size makes
    /// [`Uploader::run`] fail with `ConfigInvalid` before anything is sent.
    pub fn with_range_size(mut self, range_size: u64) -> Self {
        self.range_size = range_size;
        self
    }

    /// Current state.
    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Write `content`, which must be exactly as long as the remote file.
    pub async fn run(&mut self, content: Bytes) -> Result<UploadSummary> {
        if self.state != UploadState::NotStarted {
            return Err(Error::request_invalid(format!(
                "uploader already ran and is {:?}",
                self.state
            )));
        }

        let plan = match self.check(&content) {
            Ok(plan) => plan,
            Err(err) => {
                self.state = UploadState::Failed { offset: 0 };
                return Err(err);
            }
        };

        let mut summary = UploadSummary::default();
        for range in plan.iter() {
            let offset = range.start;
            self.state = UploadState::Uploading { offset };

            let body = content.slice(range.start as usize..range.end as usize);
            let len = body.len() as u64;
            if let Err(err) = self.write_range(offset, body).await {
                error!("range at offset {offset} failed: {err}");
                self.state = UploadState::Failed { offset };
                return Err(err);
            }

            summary.bytes += len;
            summary.ranges += 1;
        }

        self.state = UploadState::Complete;
        info!("Upload complete");
        Ok(summary)
    }

    fn check(&self, content: &Bytes) -> Result<RangePlan> {
        if self.range_size > RANGE_SIZE {
            return Err(Error::config_invalid(format!(
                "range size {} exceeds the Put Range limit of {RANGE_SIZE} bytes",
                self.range_size
            )));
        }
        let size = content.len() as u64;
        if size != self.file.size {
            return Err(Error::request_invalid(format!(
                "local file is {size} bytes but {} was created with {} bytes",
                self.file.client.name(),
                self.file.size
            )));
        }
        RangePlan::new(size, self.range_size)
    }

    async fn write_range(&self, offset: u64, body: Bytes) -> Result<()> {
        info!("Uploading range starting from offset {offset}");

        let md5 = base64_md5(&body);
        let resp = self
            .file
            .client
            .upload_range(offset, body, Some(&md5))
            .await?;

        match resp.content_md5 {
            Some(remote) if remote != md5 => Err(Error::checksum_mismatch(format!(
                "range at offset {offset}: sent MD5 {md5}, service reported {remote}"
            ))),
            _ => {
                debug!(
                    "range at offset {offset} written, etag {}",
                    resp.etag.unwrap_or_default()
                );
                Ok(())
            }
        }
    }
}
