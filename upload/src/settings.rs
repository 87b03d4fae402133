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

use std::fmt;
use std::str::FromStr;

use fileshare_azure_file::Config;
use fileshare_core::{Context, Error, Result};

/// Env selecting how the session authenticates.
pub const AUTH_METHOD: &str = "AUTH_METHOD";

/// How the session authenticates against the file service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// Generate a one-hour account SAS from `ACCOUNT_NAME` and `ACCOUNT_KEY`.
    #[default]
    AccountSas,
    /// Use `CONNECTION_STRING` as is.
    ConnectionString,
}

impl FromStr for AuthMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "sas" | "account-sas" | "account_sas" => Ok(AuthMethod::AccountSas),
            "connection-string" | "connection_string" => Ok(AuthMethod::ConnectionString),
            v => Err(Error::config_invalid(format!(
                "unknown {AUTH_METHOD} {v:?}, expected sas or connection-string"
            ))),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::AccountSas => write!(f, "sas"),
            AuthMethod::ConnectionString => write!(f, "connection-string"),
        }
    }
}

/// Everything needed to open a [`Session`](crate::Session).
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Selected authentication method.
    pub auth_method: AuthMethod,
    /// File service configuration.
    pub config: Config,
}

impl Settings {
    /// Load settings from the context's environment.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let auth_method = match ctx.env_var(AUTH_METHOD) {
            Some(v) => v.parse()?,
            None => AuthMethod::default(),
        };

        Ok(Self {
            auth_method,
            config: Config::default().from_env(ctx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileshare_core::{ErrorKind, StaticEnv};
    use test_case::test_case;

    #[test_case("sas", AuthMethod::AccountSas)]
    #[test_case("SAS", AuthMethod::AccountSas)]
    #[test_case("", AuthMethod::AccountSas)]
    #[test_case("connection-string", AuthMethod::ConnectionString)]
    #[test_case("connection_string", AuthMethod::ConnectionString)]
    fn test_parse_auth_method(input: &str, expected: AuthMethod) {
        assert_eq!(input.parse::<AuthMethod>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_auth_method() {
        let err = "oauth".parse::<AuthMethod>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_from_env() {
        let ctx = Context::new().with_env(StaticEnv::from_pairs([
            ("AUTH_METHOD", "connection-string"),
            ("CONNECTION_STRING", "AccountName=a;AccountKey=a2V5"),
        ]));
        let settings = Settings::from_env(&ctx).unwrap();

        assert_eq!(settings.auth_method, AuthMethod::ConnectionString);
        assert_eq!(
            settings.config.connection_string.as_deref(),
            Some("AccountName=a;AccountKey=a2V5")
        );

        let settings = Settings::from_env(&Context::new()).unwrap();
        assert_eq!(settings.auth_method, AuthMethod::AccountSas);
    }
}
