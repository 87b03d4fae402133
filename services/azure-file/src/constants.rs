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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used by the file service.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_TYPE: &str = "x-ms-type";
pub const X_MS_CONTENT_LENGTH: &str = "x-ms-content-length";
pub const X_MS_RANGE: &str = "x-ms-range";
pub const X_MS_WRITE: &str = "x-ms-write";
pub const X_MS_FILE_ATTRIBUTES: &str = "x-ms-file-attributes";
pub const X_MS_FILE_CREATION_TIME: &str = "x-ms-file-creation-time";
pub const X_MS_FILE_LAST_WRITE_TIME: &str = "x-ms-file-last-write-time";
pub const X_MS_FILE_PERMISSION: &str = "x-ms-file-permission";
pub const X_MS_REQUEST_ID: &str = "x-ms-request-id";
pub const CONTENT_MD5: &str = "content-md5";

/// REST API version sent with every file service request.
pub const FILE_SERVICE_VERSION: &str = "2021-12-02";

/// Env holding the storage account name.
pub const ACCOUNT_NAME: &str = "ACCOUNT_NAME";
/// Env holding the base64 storage account key.
pub const ACCOUNT_KEY: &str = "ACCOUNT_KEY";
/// Env holding a full storage connection string.
pub const CONNECTION_STRING: &str = "CONNECTION_STRING";
/// Env overriding the file service endpoint.
pub const AZURE_STORAGE_FILE_ENDPOINT: &str = "AZURE_STORAGE_FILE_ENDPOINT";

/// AsciiSet for [Azure query and path encoding](https://learn.microsoft.com/en-us/rest/api/storageservices/naming-and-referencing-shares--directories--files--and-metadata)
pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
