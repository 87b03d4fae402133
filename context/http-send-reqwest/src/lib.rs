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

//! Reqwest-based HTTP sending for fileshare.
//!
//! `ReqwestHttpSend` implements the `HttpSend` trait from `fileshare_core`
//! on top of a shared `reqwest::Client`.
//!
//! ## Example
//!
//! ```no_run
//! use fileshare_core::Context;
//! use fileshare_http_send_reqwest::ReqwestHttpSend;
//! use reqwest::Client;
//!
//! let client = Client::builder()
//!     .user_agent("fileshare-upload")
//!     .build()
//!     .expect("client must build");
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use fileshare_core::utils::redact_signature;
use fileshare_core::{Error, HttpSend, Result};
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};

/// HttpSend implementation backed by reqwest.
///
/// No timeout is applied beyond what the given client enforces.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let method = req.method().clone();
        let uri = redact_signature(&req.uri().to_string()).into_owned();
        debug!("sending {method} {uri}");

        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| {
                Error::unexpected(format!("failed to send {method} {uri}")).with_source(e)
            })?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::unexpected("failed to read response body").with_source(e))?;

        debug!("{method} {uri} returned {}", parts.status);
        Ok(http::Response::from_parts(parts, bs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileshare_core::{Context, ErrorKind};

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let ctx = Context::new().with_http_send(ReqwestHttpSend::default());

        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let req = http::Request::put("http://127.0.0.1:9/share/dir/file?sv=1&sig=secret")
            .body(Bytes::new())
            .unwrap();
        let err = ctx.http_send(req).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(!err.message().contains("secret"));
    }
}
