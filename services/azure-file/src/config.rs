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

use std::fmt::{Debug, Formatter};

use fileshare_core::utils::Redact;
use fileshare_core::{Context, Error, Result};

use crate::connection_string;
use crate::constants::*;

/// Config carries all the configuration for the Azure file service.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ACCOUNT_NAME`]
    /// - `AccountName` of a connection string
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ACCOUNT_KEY`]
    /// - `AccountKey` of a connection string
    pub account_key: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - `SharedAccessSignature` of a connection string
    pub sas_token: Option<String>,
    /// `connection_string` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CONNECTION_STRING`]
    pub connection_string: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_FILE_ENDPOINT`]
    /// - `FileEndpoint` or `AccountName` + `EndpointSuffix` of a connection string
    ///
    /// Falls back to `https://{account_name}.file.core.windows.net`.
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_deref().map(Redact::from))
            .field("sas_token", &self.sas_token.as_deref().map(Redact::from))
            .field(
                "connection_string",
                &self.connection_string.as_deref().map(Redact::from),
            )
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields that are already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.account_name.is_none() {
            self.account_name = envs.get(ACCOUNT_NAME).cloned();
        }
        if self.account_key.is_none() {
            self.account_key = envs.get(ACCOUNT_KEY).cloned();
        }
        if self.connection_string.is_none() {
            self.connection_string = envs.get(CONNECTION_STRING).cloned();
        }
        if self.endpoint.is_none() {
            self.endpoint = envs.get(AZURE_STORAGE_FILE_ENDPOINT).cloned();
        }

        self
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// DefaultEndpointsProtocol=https;
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// EndpointSuffix=core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        let mut config = connection_string::parse(conn_str)?;
        config.connection_string = Some(conn_str.to_string());
        Ok(config)
    }

    /// The service endpoint without a trailing `/`.
    pub fn service_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }

        match &self.account_name {
            Some(account_name) if !account_name.is_empty() => {
                Ok(format!("https://{account_name}.file.core.windows.net"))
            }
            _ => Err(Error::config_invalid(
                "endpoint or account name is required to address the file service",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileshare_core::{ErrorKind, StaticEnv};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_env() {
        let ctx = Context::new().with_env(StaticEnv::from_pairs([
            (ACCOUNT_NAME, "myaccount"),
            (ACCOUNT_KEY, "bXlrZXk="),
            (CONNECTION_STRING, "AccountName=other"),
        ]));

        let config = Config {
            account_name: Some("explicit".to_string()),
            ..Default::default()
        }
        .from_env(&ctx);

        assert_eq!(config.account_name.as_deref(), Some("explicit"));
        assert_eq!(config.account_key.as_deref(), Some("bXlrZXk="));
        assert_eq!(
            config.connection_string.as_deref(),
            Some("AccountName=other")
        );
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_service_endpoint() {
        let config = Config {
            account_name: Some("myaccount".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.service_endpoint().unwrap(),
            "https://myaccount.file.core.windows.net"
        );

        let config = Config {
            account_name: Some("myaccount".to_string()),
            endpoint: Some("http://127.0.0.1:10004/devstoreaccount1/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.service_endpoint().unwrap(),
            "http://127.0.0.1:10004/devstoreaccount1"
        );

        let err = Config::default().service_endpoint().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            account_name: Some("myaccount".to_string()),
            account_key: Some("c2VjcmV0LWFjY291bnQta2V5".to_string()),
            ..Default::default()
        };

        let s = format!("{config:?}");
        assert!(s.contains("myaccount"));
        assert!(!s.contains("c2VjcmV0LWFjY291bnQta2V5"));
    }
}
