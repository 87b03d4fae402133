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

use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use fileshare_core::hash::{base64_decode, base64_hmac_sha256};
use fileshare_core::time::{format_http_date, now, DateTime};
use fileshare_core::{Context, Error, Result, SignRequest, SigningMethod, SigningRequest};
use http::header::{self, HeaderName};
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use percent_encoding::percent_encode;

use crate::account_sas::AccountSharedAccessSignature;
use crate::constants::*;
use crate::Credential;

/// RequestSigner that implements Azure Storage Shared Key and SAS authorization
/// for the file service.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self { time: None }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::request_invalid("credential is required"));
        };

        let method = match expires_in {
            Some(d) => SigningMethod::Query(d),
            None => SigningMethod::Header,
        };

        let mut ctx = SigningRequest::build(req)?;

        match cred {
            Credential::SasToken { token, .. } => {
                ctx.query_append(token);
            }
            Credential::SharedKey {
                account_name,
                account_key,
            } => match method {
                SigningMethod::Query(d) => {
                    let expiry = now()
                        + chrono::TimeDelta::from_std(d).map_err(|e| {
                            Error::request_invalid("failed to convert duration").with_source(e)
                        })?;
                    let sas = AccountSharedAccessSignature::new(account_name, account_key, expiry);
                    for (k, v) in sas.token()? {
                        ctx.query_push(k, v);
                    }
                }
                SigningMethod::Header => {
                    let now_time = self.time.unwrap_or_else(now);
                    let string_to_sign = string_to_sign(&mut ctx, account_name, now_time)?;
                    let decode_content = base64_decode(account_key)?;
                    let signature = base64_hmac_sha256(&decode_content, string_to_sign.as_bytes());

                    let mut value: HeaderValue =
                        format!("SharedKey {account_name}:{signature}").parse()?;
                    value.set_sensitive(true);
                    ctx.headers.insert(header::AUTHORIZATION, value);
                }
            },
        }

        // Values pushed above are raw; appended SAS tokens are carried as
        // keys and stay untouched.
        for (_, v) in ctx.query.iter_mut() {
            *v = percent_encode(v.as_bytes(), &AZURE_QUERY_ENCODE_SET).to_string();
        }

        ctx.apply(req)
    }
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
fn string_to_sign(
    ctx: &mut SigningRequest,
    account_name: &str,
    now_time: DateTime,
) -> Result<String> {
    let mut s = String::with_capacity(256);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    for name in [header::CONTENT_ENCODING, header::CONTENT_LANGUAGE] {
        writeln!(&mut s, "{}", ctx.header_get_or_default(&name)?)?;
    }
    // A zero length is signed as an empty string since version 2015-02-21.
    let content_length = ctx.header_get_or_default(&header::CONTENT_LENGTH)?;
    writeln!(
        &mut s,
        "{}",
        if content_length == "0" {
            ""
        } else {
            content_length
        }
    )?;
    for name in [
        HeaderName::from_static(CONTENT_MD5),
        header::CONTENT_TYPE,
        header::DATE,
        header::IF_MODIFIED_SINCE,
        header::IF_MATCH,
        header::IF_NONE_MATCH,
        header::IF_UNMODIFIED_SINCE,
        header::RANGE,
    ] {
        writeln!(&mut s, "{}", ctx.header_get_or_default(&name)?)?;
    }
    writeln!(&mut s, "{}", canonicalize_header(ctx, now_time)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(ctx: &mut SigningRequest, now_time: DateTime) -> Result<String> {
    ctx.headers
        .insert(X_MS_DATE, format_http_date(now_time).parse()?);

    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    let query = ctx
        .query
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        SigningRequest::query_to_percent_decoded_string(query, ":", "\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const FILE_URL: &str =
        "https://myaccount.file.core.windows.net/test-file-share/test-folder/test-file.pdf";

    fn test_time() -> DateTime {
        DateTime::from_str("2022-03-01T08:12:34Z").unwrap()
    }

    fn key() -> String {
        fileshare_core::hash::base64_encode(b"key")
    }

    #[tokio::test]
    async fn test_sas_token() {
        let _ = env_logger::builder().is_test(true).try_init();

        let cred = Credential::with_sas_token("sv=2018-11-09&ss=f&srt=sco&sp=rwdlacup&se=2022-03-01T09%3A12%3A34Z&sig=MxtqqEdOSEtYMwtaZoMQZ%2FefI1Nm25YXiK4WS9Srl4s%3D");
        let (mut parts, _) = Request::put(format!("{FILE_URL}?comp=range"))
            .body(())
            .unwrap()
            .into_parts();

        RequestSigner::new()
            .sign_request(&Context::new(), &mut parts, Some(&cred), None)
            .await
            .unwrap();

        assert_eq!(
            parts.uri.to_string(),
            format!("{FILE_URL}?comp=range&sv=2018-11-09&ss=f&srt=sco&sp=rwdlacup&se=2022-03-01T09%3A12%3A34Z&sig=MxtqqEdOSEtYMwtaZoMQZ%2FefI1Nm25YXiK4WS9Srl4s%3D")
        );
        assert!(parts.headers.get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_shared_key_put_range() {
        let cred = Credential::with_shared_key("myaccount", &key());
        let (mut parts, _) = Request::put(format!("{FILE_URL}?comp=range"))
            .header(header::CONTENT_LENGTH, "11")
            .header(CONTENT_MD5, "XrY7u+Ae7tCTyyK7j1rNww==")
            .header(X_MS_RANGE, "bytes=0-10")
            .header(X_MS_VERSION, FILE_SERVICE_VERSION)
            .header(X_MS_WRITE, "update")
            .body(())
            .unwrap()
            .into_parts();

        RequestSigner::new()
            .with_time(test_time())
            .sign_request(&Context::new(), &mut parts, Some(&cred), None)
            .await
            .unwrap();

        assert_eq!(parts.headers[X_MS_DATE], "Tue, 01 Mar 2022 08:12:34 GMT");
        assert_eq!(
            parts.headers[header::AUTHORIZATION],
            "SharedKey myaccount:L/jutsC5hzNh0PlcwxP1PGsV1Kc+qG/RgEq9c+sVq+E="
        );
        assert!(parts.headers[header::AUTHORIZATION].is_sensitive());
        assert_eq!(parts.uri.to_string(), format!("{FILE_URL}?comp=range"));
    }

    #[tokio::test]
    async fn test_shared_key_zero_content_length() {
        let cred = Credential::with_shared_key("myaccount", &key());
        let (mut parts, _) = Request::put(FILE_URL)
            .header(header::CONTENT_LENGTH, "0")
            .header(X_MS_CONTENT_LENGTH, "11")
            .header(X_MS_TYPE, "file")
            .header(X_MS_VERSION, FILE_SERVICE_VERSION)
            .body(())
            .unwrap()
            .into_parts();

        RequestSigner::new()
            .with_time(test_time())
            .sign_request(&Context::new(), &mut parts, Some(&cred), None)
            .await
            .unwrap();

        assert_eq!(
            parts.headers[header::AUTHORIZATION],
            "SharedKey myaccount:9VOyXHdGX90hIwxeHdsfVZOleaB/MRzgR6iJhMfvujk="
        );
    }

    #[tokio::test]
    async fn test_shared_key_query_signing() {
        let cred = Credential::with_shared_key("myaccount", &key());
        let (mut parts, _) = Request::get(FILE_URL).body(()).unwrap().into_parts();

        RequestSigner::new()
            .sign_request(
                &Context::new(),
                &mut parts,
                Some(&cred),
                Some(Duration::from_secs(3600)),
            )
            .await
            .unwrap();

        let query = parts.uri.query().unwrap();
        assert!(query.starts_with("sv=2018-11-09&ss=f&srt=sco&se="));
        assert!(query.contains("&sp=rwdlacup&sig="));
        assert!(parts.headers.get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let (mut parts, _) = Request::get(FILE_URL).body(()).unwrap().into_parts();
        let err = RequestSigner::new()
            .sign_request(&Context::new(), &mut parts, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), fileshare_core::ErrorKind::RequestInvalid);
    }
}
