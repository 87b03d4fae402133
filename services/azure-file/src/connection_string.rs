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

use std::collections::HashMap;

use fileshare_core::{Error, Result};

use crate::Config;

/// Parses an [Azure connection string][1] for the file service.
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    let mut config = Config {
        account_name: key_values.get("AccountName").cloned(),
        endpoint: collect_endpoint(&key_values)?,
        ..Default::default()
    };

    // A SAS wins over the account key when both are present.
    if let Some(token) = key_values.get("SharedAccessSignature") {
        config.sas_token = Some(token.clone());
    } else if let Some(account_key) = key_values.get("AccountKey") {
        config.account_key = Some(account_key.clone());
    }

    Ok(config)
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace(['\n', '\r'], "")
        .split(';')
        .filter(|field| !field.trim().is_empty())
        .map(|field| {
            let (key, value) = field.trim().split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {}",
                    field.trim()
                ))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// `FileEndpoint` if given, otherwise built from the account name and suffix.
fn collect_endpoint(key_values: &HashMap<String, String>) -> Result<Option<String>> {
    if let Some(endpoint) = key_values.get("FileEndpoint") {
        return Ok(Some(endpoint.clone()));
    }

    let (Some(account_name), Some(endpoint_suffix)) = (
        key_values.get("AccountName"),
        key_values.get("EndpointSuffix"),
    ) else {
        return Ok(None);
    };

    let protocol = key_values
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    if protocol != "http" && protocol != "https" {
        return Err(Error::config_invalid(format!(
            "invalid DefaultEndpointsProtocol: {protocol}"
        )));
    }

    Ok(Some(format!(
        "{protocol}://{account_name}.file.{endpoint_suffix}"
    )))
}
