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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded lazily on the first call and cached; it is
/// reloaded once the cached value reports itself invalid (for example an
/// expired shared access signature).
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// The context this signer was built with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Load the credential without signing anything.
    ///
    /// Used to fail fast on configuration problems before any network call.
    pub async fn credential(&self) -> Result<K> {
        let cached = self.credential.lock().expect("lock poisoned").clone();
        if let Some(cred) = cached.filter(|c| c.is_valid()) {
            return Ok(cred);
        }

        debug!("cached credential missing or invalid, loading a new one");
        let loaded = self.loader.provide_credential(&self.ctx).await?;
        let Some(cred) = loaded.filter(|c| c.is_valid()) else {
            return Err(Error::credential_invalid(
                "no valid credential could be loaded",
            ));
        };

        *self.credential.lock().expect("lock poisoned") = Some(cred.clone());
        Ok(cred)
    }

    /// Signing request.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let cred = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, Some(&cred), expires_in)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct Token {
        value: String,
        valid: bool,
    }

    impl SigningCredential for Token {
        fn is_valid(&self) -> bool {
            self.valid && !self.value.is_empty()
        }
    }

    #[derive(Debug)]
    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        valid: bool,
    }

    #[async_trait]
    impl ProvideCredential for CountingLoader {
        type Credential = Token;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Token {
                value: format!("token-{n}"),
                valid: self.valid,
            }))
        }
    }

    #[derive(Debug)]
    struct HeaderSigner;

    #[async_trait]
    impl SignRequest for HeaderSigner {
        type Credential = Token;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            credential: Option<&Token>,
            _: Option<Duration>,
        ) -> Result<()> {
            let token = credential.ok_or_else(|| Error::request_invalid("missing"))?;
            req.headers.insert("x-token", token.value.parse()?);
            Ok(())
        }
    }

    fn parts() -> http::request::Parts {
        http::Request::put("https://acc.file.core.windows.net/share/file")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_credential_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingLoader {
                calls: calls.clone(),
                valid: true,
            },
            HeaderSigner,
        );

        let mut first = parts();
        signer.sign(&mut first, None).await.unwrap();
        let mut second = parts();
        signer.sign(&mut second, None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.headers["x-token"], "token-0");
    }

    #[tokio::test]
    async fn test_invalid_credential_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingLoader {
                calls: calls.clone(),
                valid: false,
            },
            HeaderSigner,
        );

        let err = signer.sign(&mut parts(), None).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CredentialInvalid);

        // Nothing was cached, so the next attempt loads again.
        let _ = signer.credential().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
