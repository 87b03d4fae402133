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

use fileshare_core::time::{now, DateTime};
use fileshare_core::utils::Redact;
use fileshare_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential enum for the supported Azure Files authentication methods.
#[derive(Clone)]
pub enum Credential {
    /// Shared Key authentication with account name and key
    SharedKey {
        /// Azure storage account name.
        account_name: String,
        /// Azure storage account key, base64 encoded.
        account_key: String,
    },
    /// SAS (Shared Access Signature) token authentication
    SasToken {
        /// SAS token, already percent encoded, without leading `?`.
        token: String,
        /// Expiration time of the token, if known.
        expires_at: Option<DateTime>,
    },
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => f
                .debug_struct("Credential::SharedKey")
                .field("account_name", &account_name)
                .field("account_key", &Redact::from(account_key))
                .finish(),
            Credential::SasToken { token, expires_at } => f
                .debug_struct("Credential::SasToken")
                .field("token", &Redact::from(token))
                .field("expires_at", expires_at)
                .finish(),
        }
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => !account_name.is_empty() && !account_key.is_empty(),
            Credential::SasToken { token, expires_at } => {
                if token.is_empty() {
                    return false;
                }
                // Take 20s as buffer to avoid edge cases.
                match expires_at {
                    Some(expires) => {
                        *expires > now() + chrono::TimeDelta::try_seconds(20).expect("in bounds")
                    }
                    None => true,
                }
            }
        }
    }
}

impl Credential {
    /// Create a new credential with shared key authentication.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Self {
        Self::SharedKey {
            account_name: account_name.to_string(),
            account_key: account_key.to_string(),
        }
    }

    /// Create a new credential with SAS token authentication.
    ///
    /// The expiry is read from the token's `se` parameter when present.
    pub fn with_sas_token(sas_token: &str) -> Self {
        let token = sas_token.trim_start_matches('?');
        Self::SasToken {
            token: token.to_string(),
            expires_at: sas_expiry(token),
        }
    }
}

/// Extract the signed expiry (`se`) from a SAS token.
fn sas_expiry(token: &str) -> Option<DateTime> {
    form_urlencoded::parse(token.as_bytes())
        .find(|(k, _)| k == "se")
        .and_then(|(_, v)| chrono::DateTime::parse_from_rfc3339(&v).ok())
        .map(|v| v.with_timezone(&chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sas_expiry_is_parsed() {
        let cred = Credential::with_sas_token(
            "?sv=2018-11-09&ss=f&srt=sco&se=2022-03-01T09%3A12%3A34Z&sp=rwdlacup&sig=abc",
        );

        match cred {
            Credential::SasToken { token, expires_at } => {
                assert!(token.starts_with("sv="));
                assert_eq!(
                    expires_at,
                    Some(chrono::Utc.with_ymd_and_hms(2022, 3, 1, 9, 12, 34).unwrap())
                );
            }
            _ => panic!("Expected SasToken credential"),
        }
    }

    #[test]
    fn test_expired_sas_is_invalid() {
        let cred = Credential::with_sas_token("sv=2018-11-09&se=2022-03-01T09%3A12%3A34Z&sig=abc");
        assert!(!cred.is_valid());

        let cred = Credential::with_sas_token("sv=2018-11-09&sig=abc");
        assert!(cred.is_valid());
    }

    #[test]
    fn test_shared_key_validity() {
        assert!(Credential::with_shared_key("account", "a2V5").is_valid());
        assert!(!Credential::with_shared_key("", "a2V5").is_valid());
        assert!(!Credential::with_shared_key("account", "").is_valid());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential::with_shared_key("account", "c2VjcmV0LWFjY291bnQta2V5");
        let s = format!("{cred:?}");
        assert!(s.contains("account"));
        assert!(!s.contains("c2VjcmV0LWFjY291bnQta2V5"));
    }
}
