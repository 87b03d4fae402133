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

use async_trait::async_trait;
use fileshare_core::hash::base64_decode;
use fileshare_core::time::now;
use fileshare_core::{Context, Error, ProvideCredential, Result};

use crate::credential::Credential;
use crate::Config;

/// ConnectionStringCredentialProvider loads a credential from the
/// `SharedAccessSignature` or `AccountName` + `AccountKey` fields of a
/// connection string.
#[derive(Clone, Debug)]
pub struct ConnectionStringCredentialProvider {
    config: Config,
}

impl ConnectionStringCredentialProvider {
    /// Create a provider from config, using `connection_string`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Parse the connection string and pick its credential.
    ///
    /// An `AccountKey` that is not base64 fails with `ConfigInvalid`, and a
    /// `SharedAccessSignature` whose `se` has passed fails with
    /// `CredentialExpired`.
    pub fn parse(&self) -> Result<(Config, Credential)> {
        let Some(conn_str) = self.config.connection_string.as_deref() else {
            return Err(Error::config_invalid("connection string is not set"));
        };
        if conn_str.trim().is_empty() {
            return Err(Error::config_invalid("connection string is empty"));
        }

        let config = Config::try_from_connection_string(conn_str)?;
        let credential = match (&config.sas_token, &config.account_name, &config.account_key) {
            (Some(token), _, _) => {
                let cred = Credential::with_sas_token(token);
                if let Credential::SasToken {
                    expires_at: Some(expires_at),
                    ..
                } = &cred
                {
                    if *expires_at <= now() {
                        return Err(Error::credential_expired(format!(
                            "SharedAccessSignature expired at {expires_at}"
                        )));
                    }
                }
                cred
            }
            (None, Some(account_name), Some(account_key)) => {
                base64_decode(account_key).map_err(|e| {
                    Error::config_invalid("AccountKey is not valid base64").with_source(e)
                })?;
                Credential::with_shared_key(account_name, account_key)
            }
            _ => {
                return Err(Error::config_invalid(
                    "connection string carries neither SharedAccessSignature nor AccountName and AccountKey",
                ))
            }
        };

        Ok((config, credential))
    }
}

#[async_trait]
impl ProvideCredential for ConnectionStringCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        self.parse().map(|(_, cred)| Some(cred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileshare_core::ErrorKind;

    fn provider(conn_str: Option<&str>) -> ConnectionStringCredentialProvider {
        ConnectionStringCredentialProvider::new(Config {
            connection_string: conn_str.map(str::to_string),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_shared_key_from_connection_string() {
        let cred = provider(Some(
            "DefaultEndpointsProtocol=https;AccountName=myaccount;AccountKey=bXlrZXk=;EndpointSuffix=core.windows.net",
        ))
        .provide_credential(&Context::new())
        .await
        .unwrap();

        match cred {
            Some(Credential::SharedKey {
                account_name,
                account_key,
            }) => {
                assert_eq!(account_name, "myaccount");
                assert_eq!(account_key, "bXlrZXk=");
            }
            _ => panic!("Expected SharedKey credential"),
        }
    }

    #[tokio::test]
    async fn test_sas_from_connection_string() {
        let (config, cred) = provider(Some(
            "FileEndpoint=https://myaccount.file.core.windows.net;SharedAccessSignature=sv=2018-11-09&ss=f&sig=abc",
        ))
        .parse()
        .unwrap();

        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://myaccount.file.core.windows.net")
        );
        match cred {
            Credential::SasToken { token, .. } => {
                assert_eq!(token, "sv=2018-11-09&ss=f&sig=abc")
            }
            _ => panic!("Expected SasToken credential"),
        }
    }

    #[tokio::test]
    async fn test_invalid_connection_strings() {
        for conn_str in [
            None,
            Some(""),
            Some("AccountName=myaccount"),
            Some("AccountName=myaccount;AccountKey"),
            Some("AccountName=a;AccountKey=not base64!"),
        ] {
            let err = provider(conn_str)
                .provide_credential(&Context::new())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid, "{conn_str:?}");
        }
    }

    #[test]
    fn test_expired_sas_from_connection_string() {
        let err = provider(Some(
            "FileEndpoint=https://myaccount.file.core.windows.net;SharedAccessSignature=sv=2018-11-09&ss=f&se=2022-03-01T09%3A12%3A34Z&sig=abc",
        ))
        .parse()
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CredentialExpired);
    }
}
