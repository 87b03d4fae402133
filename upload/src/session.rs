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

use fileshare_azure_file::{
    AccountSasCredentialProvider, Config, ConnectionStringCredentialProvider, Credential,
    DirectoryClient, RequestSigner, ShareServiceClient,
};
use fileshare_core::{Context, Result, Signer};
use log::info;

use crate::{AuthMethod, Settings, DIRECTORY_NAME, SAS_LIFETIME, SHARE_NAME};

/// An authenticated connection to the file service.
///
/// Built once and handed to both [`create_file`](crate::create_file) and
/// [`upload`](fn@crate::upload).
#[derive(Debug, Clone)]
pub struct Session {
    ctx: Context,
    auth_method: AuthMethod,
    client: ShareServiceClient,
}

impl Session {
    /// Build the session and load its credential.
    ///
    /// Nothing is sent over the network here: missing or malformed
    /// configuration fails with `ConfigInvalid` right away, and an expired
    /// connection string SAS with `CredentialExpired`.
    pub async fn connect(ctx: &Context, settings: &Settings) -> Result<Self> {
        let client = match settings.auth_method {
            AuthMethod::AccountSas => {
                let provider = AccountSasCredentialProvider::new(settings.config.clone())
                    .with_lifetime(SAS_LIFETIME);
                let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());
                // Name and key are validated before the endpoint is derived from them.
                let _: Credential = signer.credential().await?;

                let endpoint = settings.config.service_endpoint()?;
                ShareServiceClient::new(&endpoint, signer)
            }
            AuthMethod::ConnectionString => {
                let provider = ConnectionStringCredentialProvider::new(settings.config.clone());
                let (parsed, _) = provider.parse()?;

                let endpoint = Config {
                    endpoint: parsed.endpoint.or_else(|| settings.config.endpoint.clone()),
                    ..parsed
                }
                .service_endpoint()?;
                let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());
                // Loads and caches the credential the first request will use.
                let _: Credential = signer.credential().await?;
                ShareServiceClient::new(&endpoint, signer)
            }
        };

        info!(
            "session ready for {} using {}",
            client.endpoint(),
            settings.auth_method
        );

        Ok(Self {
            ctx: ctx.clone(),
            auth_method: settings.auth_method,
            client,
        })
    }

    /// The context used to read files and send requests.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The authentication method in use.
    pub fn auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    /// The service client.
    pub fn client(&self) -> &ShareServiceClient {
        &self.client
    }

    /// The fixed upload directory, `test-file-share/test-folder`.
    pub fn directory(&self) -> DirectoryClient {
        self.client
            .share_client(SHARE_NAME)
            .directory_client(DIRECTORY_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileshare_core::{ErrorKind, StaticEnv};

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let ctx = Context::new().with_env(StaticEnv::from_pairs(pairs.iter().copied()));
        Settings::from_env(&ctx).unwrap()
    }

    #[tokio::test]
    async fn test_account_sas_session() {
        let settings = settings(&[("ACCOUNT_NAME", "myaccount"), ("ACCOUNT_KEY", "a2V5")]);
        let session = Session::connect(&Context::new(), &settings).await.unwrap();

        assert_eq!(session.auth_method(), AuthMethod::AccountSas);
        assert_eq!(
            session.client().endpoint(),
            "https://myaccount.file.core.windows.net"
        );
        assert_eq!(session.directory().path(), "test-folder");
    }

    #[tokio::test]
    async fn test_account_sas_generated_once() {
        let settings = settings(&[("ACCOUNT_NAME", "myaccount"), ("ACCOUNT_KEY", "a2V5")]);
        let session = Session::connect(&Context::new(), &settings).await.unwrap();

        let signer = session.client().signer();
        let (Credential::SasToken { token: first, .. }, Credential::SasToken { token: second, .. }) =
            (signer.credential().await.unwrap(), signer.credential().await.unwrap())
        else {
            panic!("Expected SasToken credential");
        };
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_account_sas_requires_key() {
        let settings = settings(&[("ACCOUNT_NAME", "myaccount")]);
        let err = Session::connect(&Context::new(), &settings)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[tokio::test]
    async fn test_connection_string_session() {
        let settings = settings(&[
            ("AUTH_METHOD", "connection-string"),
            (
                "CONNECTION_STRING",
                "DefaultEndpointsProtocol=https;AccountName=myaccount;AccountKey=a2V5;EndpointSuffix=core.windows.net",
            ),
        ]);
        let session = Session::connect(&Context::new(), &settings).await.unwrap();

        assert_eq!(session.auth_method(), AuthMethod::ConnectionString);
        assert_eq!(
            session.client().endpoint(),
            "https://myaccount.file.core.windows.net"
        );
    }

    #[tokio::test]
    async fn test_connection_string_without_endpoint_uses_account() {
        let settings = settings(&[
            ("AUTH_METHOD", "connection_string"),
            ("CONNECTION_STRING", "AccountName=myaccount;AccountKey=a2V5"),
        ]);
        let session = Session::connect(&Context::new(), &settings).await.unwrap();
        assert_eq!(
            session.client().endpoint(),
            "https://myaccount.file.core.windows.net"
        );
    }

    #[tokio::test]
    async fn test_connection_string_unset() {
        let settings = settings(&[
            ("AUTH_METHOD", "connection-string"),
            ("ACCOUNT_NAME", "myaccount"),
            ("ACCOUNT_KEY", "a2V5"),
        ]);
        let err = Session::connect(&Context::new(), &settings)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[tokio::test]
    async fn test_connection_string_with_malformed_key() {
        let settings = settings(&[
            ("AUTH_METHOD", "connection-string"),
            (
                "CONNECTION_STRING",
                "AccountName=myaccount;AccountKey=not base64!",
            ),
        ]);
        let err = Session::connect(&Context::new(), &settings)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
