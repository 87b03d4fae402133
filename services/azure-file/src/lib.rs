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

//! Azure Files support for fileshare.
//!
//! This crate provides:
//!
//! - Shared Key and SAS authorization for the file service
//! - account SAS generation
//! - connection string parsing
//! - a small client for creating files and writing ranges
//!
//! # Example
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use fileshare_azure_file::{
//!     AccountSasCredentialProvider, Config, RequestSigner, ShareServiceClient,
//! };
//! use fileshare_core::{Context, OsEnv, Result, Signer};
//! use fileshare_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!     let config = Config::default().from_env(&ctx);
//!
//!     let signer = Signer::new(
//!         ctx.clone(),
//!         AccountSasCredentialProvider::new(config.clone()),
//!         RequestSigner::new(),
//!     );
//!     let client = ShareServiceClient::new(&config.service_endpoint()?, signer);
//!
//!     let file = client
//!         .share_client("myshare")
//!         .directory_client("mydir")
//!         .create_file("hello.txt", 5)
//!         .await?;
//!     file.upload_range(0, Bytes::from("hello"), None).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod account_sas;
pub use account_sas::{
    AccountSasPermissions, AccountSasResourceTypes, AccountSasServices,
    AccountSharedAccessSignature, SasProtocol,
};

mod constants;
pub use constants::{
    ACCOUNT_KEY, ACCOUNT_NAME, AZURE_STORAGE_FILE_ENDPOINT, CONNECTION_STRING,
    FILE_SERVICE_VERSION,
};

mod connection_string;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::RequestSigner;

mod service_error;

mod client;
pub use client::{DirectoryClient, FileClient, RangeUploadResponse, ShareClient, ShareServiceClient};
