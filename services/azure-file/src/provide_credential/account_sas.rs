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

use std::time::Duration;

use async_trait::async_trait;
use fileshare_core::time::now;
use fileshare_core::{Context, Error, ProvideCredential, Result};
use log::debug;

use crate::account_sas::AccountSharedAccessSignature;
use crate::credential::Credential;
use crate::Config;

/// AccountSasCredentialProvider signs a fresh account SAS from the account
/// name and key every time it is asked for a credential.
///
/// The SAS grants every permission on all resource types of the file
/// service for `lifetime` (one hour unless changed).
#[derive(Clone, Debug)]
pub struct AccountSasCredentialProvider {
    config: Config,
    lifetime: Duration,
}

impl AccountSasCredentialProvider {
    /// Create a provider from config, using `account_name` and `account_key`.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            lifetime: Duration::from_secs(3600),
        }
    }

    /// Set how long each generated SAS stays valid.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Generate the SAS credential.
    ///
    /// Only local work is done here, so configuration problems surface
    /// before any request is sent.
    pub fn generate(&self) -> Result<Credential> {
        let (Some(account_name), Some(account_key)) =
            (&self.config.account_name, &self.config.account_key)
        else {
            return Err(Error::config_invalid(
                "account name and account key are required to generate an account SAS",
            ));
        };
        if account_name.is_empty() || account_key.is_empty() {
            return Err(Error::config_invalid(
                "account name and account key must not be empty",
            ));
        }

        let lifetime = chrono::TimeDelta::from_std(self.lifetime)
            .map_err(|e| Error::config_invalid("SAS lifetime out of range").with_source(e))?;
        let sas =
            AccountSharedAccessSignature::new(account_name, account_key, now() + lifetime);
        let token = sas
            .query_string()
            .map_err(|e| Error::config_invalid("failed to generate account SAS").with_source(e))?;

        debug!(
            "generated account SAS for {account_name}, expires at {}",
            sas.expiry()
        );

        Ok(Credential::SasToken {
            token,
            expires_at: Some(sas.expiry()),
        })
    }
}

#[async_trait]
impl ProvideCredential for AccountSasCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        self.generate().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileshare_core::{ErrorKind, SigningCredential};

    fn config(name: &str, key: &str) -> Config {
        Config {
            account_name: Some(name.to_string()),
            account_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generates_one_hour_sas() {
        let before = now();
        let provider = AccountSasCredentialProvider::new(config("myaccount", "a2V5"));
        let cred = provider
            .provide_credential(&Context::new())
            .await
            .unwrap()
            .unwrap();
        assert!(cred.is_valid());

        match cred {
            Credential::SasToken { token, expires_at } => {
                assert!(token.starts_with("sv=2018-11-09&ss=f&srt=sco&se="));
                assert!(token.contains("&sp=rwdlacup&sig="));

                let lifetime = expires_at.unwrap() - before;
                assert!(lifetime >= chrono::TimeDelta::seconds(3600));
                assert!(lifetime < chrono::TimeDelta::seconds(3610));
            }
            _ => panic!("Expected SasToken credential"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let provider = AccountSasCredentialProvider::new(Config {
            account_name: Some("myaccount".to_string()),
            ..Default::default()
        });
        let err = provider
            .provide_credential(&Context::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_invalid_key_is_config_error() {
        let provider = AccountSasCredentialProvider::new(config("myaccount", "not base64!"));
        let err = provider.generate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
