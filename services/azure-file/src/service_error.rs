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
use fileshare_core::{Error, ErrorKind};
use http::StatusCode;
use quick_xml::de;
use serde::Deserialize;

/// Error body returned by the file service.
///
/// ```xml
/// <?xml version="1.0" encoding="utf-8"?>
/// <Error>
///   <Code>ShareNotFound</Code>
///   <Message>The specified share does not exist.</Message>
/// </Error>
/// ```
#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ServiceErrorBody {
    code: String,
    message: String,
}

/// Turn a failed response into an `Error` whose kind follows the status.
pub(crate) fn parse_service_error(status: StatusCode, body: &Bytes) -> Error {
    let kind = match status.as_u16() {
        401 => ErrorKind::CredentialInvalid,
        403 => ErrorKind::CredentialDenied,
        400 | 404 | 409 | 413 | 416 => ErrorKind::RequestInvalid,
        _ => ErrorKind::Unexpected,
    };

    // Responses start with a UTF-8 BOM.
    let text = String::from_utf8_lossy(body);
    let text = text.trim_start_matches('\u{feff}');

    let message = match de::from_str::<ServiceErrorBody>(text) {
        Ok(v) if !v.code.is_empty() => {
            format!(
                "file service returned {status}: {}: {}",
                v.code,
                v.message.lines().next().unwrap_or_default()
            )
        }
        _ if text.trim().is_empty() => format!("file service returned {status}"),
        _ => format!("file service returned {status}: {}", text.trim()),
    };

    Error::new(kind, message)
}
