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
use fileshare_core::{Context, ProvideCredential, Result};

use crate::credential::Credential;

/// StaticCredentialProvider returns the credential it was built with.
#[derive(Clone, Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a provider for a shared key.
    pub fn new_shared_key(account_name: &str, account_key: &str) -> Self {
        Self {
            credential: Credential::with_shared_key(account_name, account_key),
        }
    }

    /// Create a provider for an existing SAS token.
    pub fn new_sas_token(sas_token: &str) -> Self {
        Self {
            credential: Credential::with_sas_token(sas_token),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credential_provider_shared_key() {
        let provider = StaticCredentialProvider::new_shared_key("myaccount", "bXlrZXk=");
        let cred = provider.provide_credential(&Context::new()).await.unwrap();

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
    async fn test_static_credential_provider_sas_token() {
        let provider = StaticCredentialProvider::new_sas_token("?sv=2018-11-09&sig=abc");
        let cred = provider.provide_credential(&Context::new()).await.unwrap();

        match cred {
            Some(Credential::SasToken { token, expires_at }) => {
                assert_eq!(token, "sv=2018-11-09&sig=abc");
                assert_eq!(expires_at, None);
            }
            _ => panic!("Expected SasToken credential"),
        }
    }
}
