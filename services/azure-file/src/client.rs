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
use fileshare_core::{Error, Result, Signer};
use http::header::{CONTENT_LENGTH, ETAG, LAST_MODIFIED};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use log::{debug, info};
use percent_encoding::utf8_percent_encode;

use crate::constants::*;
use crate::service_error::parse_service_error;
use crate::Credential;

/// Client for a storage account's file service.
///
/// Every request is signed by the given signer and sent through its context.
#[derive(Clone, Debug)]
pub struct ShareServiceClient {
    endpoint: String,
    signer: Signer<Credential>,
}

impl ShareServiceClient {
    /// Create a client for `endpoint`, like `https://myaccount.file.core.windows.net`.
    pub fn new(endpoint: &str, signer: Signer<Credential>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            signer,
        }
    }

    /// The service endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The signer used for requests.
    pub fn signer(&self) -> &Signer<Credential> {
        &self.signer
    }

    /// Address a share.
    pub fn share_client(&self, share: &str) -> ShareClient {
        ShareClient {
            service: self.clone(),
            share: share.to_string(),
        }
    }
}

/// Client for one share.
#[derive(Clone, Debug)]
pub struct ShareClient {
    service: ShareServiceClient,
    share: String,
}

impl ShareClient {
    /// The share name.
    pub fn name(&self) -> &str {
        &self.share
    }

    /// Address a directory inside the share. Nested paths use `/`.
    pub fn directory_client(&self, path: &str) -> DirectoryClient {
        DirectoryClient {
            share: self.clone(),
            path: path.trim_matches('/').to_string(),
        }
    }
}

/// Client for one directory.
#[derive(Clone, Debug)]
pub struct DirectoryClient {
    share: ShareClient,
    path: String,
}

impl DirectoryClient {
    /// The directory path inside the share.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Address a file inside the directory without touching the service.
    pub fn file_client(&self, name: &str) -> FileClient {
        let mut segments = vec![self.share.share.as_str()];
        segments.extend(self.path.split('/').filter(|s| !s.is_empty()));
        segments.push(name);

        let path = segments
            .iter()
            .map(|s| utf8_percent_encode(s, &AZURE_QUERY_ENCODE_SET).to_string())
            .collect::<Vec<_>>()
            .join("/");

        FileClient {
            url: format!("{}/{}", self.share.service.endpoint, path),
            name: segments.join("/"),
            signer: self.share.service.signer.clone(),
        }
    }

    /// [Create File](https://learn.microsoft.com/en-us/rest/api/storageservices/create-file)
    ///
    /// Creates (or replaces) `name` with a length of `size` bytes. The content
    /// starts out zeroed until ranges are written.
    pub async fn create_file(&self, name: &str, size: u64) -> Result<FileClient> {
        let file = self.file_client(name);

        let req = Request::put(&file.url)
            .header(X_MS_VERSION, FILE_SERVICE_VERSION)
            .header(X_MS_TYPE, "file")
            .header(X_MS_CONTENT_LENGTH, size)
            .header(X_MS_FILE_ATTRIBUTES, "None")
            .header(X_MS_FILE_CREATION_TIME, "now")
            .header(X_MS_FILE_LAST_WRITE_TIME, "now")
            .header(X_MS_FILE_PERMISSION, "inherit")
            .header(CONTENT_LENGTH, 0)
            .body(Bytes::new())?;

        let resp = file.send(req).await?;
        info!(
            "created {} with length {size}, request id {}",
            file.name,
            header_string(resp.headers(), X_MS_REQUEST_ID).unwrap_or_default()
        );

        Ok(file)
    }
}

/// Client for one file.
#[derive(Clone, Debug)]
pub struct FileClient {
    url: String,
    name: String,
    signer: Signer<Credential>,
}

/// What the service reports after a range write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeUploadResponse {
    /// MD5 of the range as computed by the service, base64 encoded.
    pub content_md5: Option<String>,
    /// ETag of the file after the write.
    pub etag: Option<String>,
    /// Last modified time of the file after the write.
    pub last_modified: Option<String>,
    /// Request id assigned by the service.
    pub request_id: Option<String>,
}

impl FileClient {
    /// The unencoded path of the file, `share/dir/file`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The encoded URL of the file.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// [Put Range](https://learn.microsoft.com/en-us/rest/api/storageservices/put-range)
    ///
    /// Writes `body` at `offset`. `content_md5` is the base64 MD5 of `body`;
    /// the service rejects the write when it does not match.
    pub async fn upload_range(
        &self,
        offset: u64,
        body: Bytes,
        content_md5: Option<&str>,
    ) -> Result<RangeUploadResponse> {
        if body.is_empty() {
            return Err(Error::request_invalid(format!(
                "range at offset {offset} of {} is empty",
                self.name
            )));
        }
        let end = offset + body.len() as u64 - 1;

        let mut builder = Request::put(format!("{}?comp=range", self.url))
            .header(X_MS_VERSION, FILE_SERVICE_VERSION)
            .header(X_MS_RANGE, format!("bytes={offset}-{end}"))
            .header(X_MS_WRITE, "update")
            .header(CONTENT_LENGTH, body.len());
        if let Some(md5) = content_md5 {
            builder = builder.header(CONTENT_MD5, md5);
        }
        let req = builder.body(body)?;

        let resp = self.send(req).await?;
        let headers = resp.headers();
        Ok(RangeUploadResponse {
            content_md5: header_string(headers, CONTENT_MD5),
            etag: header_string(headers, ETAG.as_str()),
            last_modified: header_string(headers, LAST_MODIFIED.as_str()),
            request_id: header_string(headers, X_MS_REQUEST_ID),
        })
    }

    /// Sign and send, expecting `201 Created`.
    async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts, None).await?;
        let method: Method = parts.method.clone();
        let req = Request::from_parts(parts, body);

        let resp = self.signer.context().http_send(req).await?;
        debug!("{method} {} returned {}", self.name, resp.status());

        if resp.status() != StatusCode::CREATED {
            return Err(parse_service_error(resp.status(), resp.body()));
        }
        Ok(resp)
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
