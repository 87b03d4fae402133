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

use fileshare_core::hash;
use fileshare_core::time;
use fileshare_core::time::DateTime;
use fileshare_core::Result;

/// The signed version that fixes the string-to-sign layout below.
///
/// - [Create an account SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-account-sas#specify-the-account-sas-parameters)
const ACCOUNT_SAS_VERSION: &str = "2018-11-09";

/// Permissions granted by an account SAS (`sp`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccountSasPermissions {
    /// `r`
    pub read: bool,
    /// `w`
    pub write: bool,
    /// `d`
    pub delete: bool,
    /// `l`
    pub list: bool,
    /// `a`
    pub add: bool,
    /// `c`
    pub create: bool,
    /// `u`
    pub update: bool,
    /// `p`
    pub process: bool,
}

impl AccountSasPermissions {
    /// Every permission an account SAS can carry for the file service.
    pub fn all() -> Self {
        Self {
            read: true,
            write: true,
            delete: true,
            list: true,
            add: true,
            create: true,
            update: true,
            process: true,
        }
    }
}

impl fmt::Display for AccountSasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The service requires this exact order.
        let flags = [
            (self.read, 'r'),
            (self.write, 'w'),
            (self.delete, 'd'),
            (self.list, 'l'),
            (self.add, 'a'),
            (self.create, 'c'),
            (self.update, 'u'),
            (self.process, 'p'),
        ];
        for (enabled, c) in flags {
            if enabled {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Services reachable with an account SAS (`ss`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccountSasServices {
    /// `b`
    pub blob: bool,
    /// `q`
    pub queue: bool,
    /// `t`
    pub table: bool,
    /// `f`
    pub file: bool,
}

impl AccountSasServices {
    /// Only the file service.
    pub fn file() -> Self {
        Self {
            file: true,
            ..Default::default()
        }
    }
}

impl fmt::Display for AccountSasServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (enabled, c) in [
            (self.blob, 'b'),
            (self.queue, 'q'),
            (self.table, 't'),
            (self.file, 'f'),
        ] {
            if enabled {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Resource types reachable with an account SAS (`srt`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccountSasResourceTypes {
    /// `s`: service level APIs.
    pub service: bool,
    /// `c`: shares and directories.
    pub container: bool,
    /// `o`: files.
    pub object: bool,
}

impl AccountSasResourceTypes {
    /// Service, container and object.
    pub fn all() -> Self {
        Self {
            service: true,
            container: true,
            object: true,
        }
    }
}

impl fmt::Display for AccountSasResourceTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (enabled, c) in [
            (self.service, 's'),
            (self.container, 'c'),
            (self.object, 'o'),
        ] {
            if enabled {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Protocol permitted for a request made with the SAS (`spr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SasProtocol {
    /// `https`
    Https,
    /// `https,http`
    HttpsAndHttp,
}

impl fmt::Display for SasProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SasProtocol::Https => write!(f, "https"),
            SasProtocol::HttpsAndHttp => write!(f, "https,http"),
        }
    }
}

/// Generator for an account shared access signature.
#[derive(Debug, Clone)]
pub struct AccountSharedAccessSignature {
    account: String,
    key: String,
    services: AccountSasServices,
    resource_types: AccountSasResourceTypes,
    permissions: AccountSasPermissions,
    expiry: DateTime,
    start: Option<DateTime>,
    ip: Option<String>,
    protocol: Option<SasProtocol>,
}

impl AccountSharedAccessSignature {
    /// Create a SAS generator granting every permission on all resource
    /// types of the file service until `expiry`.
    pub fn new(account: impl Into<String>, key: impl Into<String>, expiry: DateTime) -> Self {
        Self {
            account: account.into(),
            key: key.into(),
            services: AccountSasServices::file(),
            resource_types: AccountSasResourceTypes::all(),
            permissions: AccountSasPermissions::all(),
            expiry,
            start: None,
            ip: None,
            protocol: None,
        }
    }

    /// Set the services.
    pub fn with_services(mut self, services: AccountSasServices) -> Self {
        self.services = services;
        self
    }

    /// Set the resource types.
    pub fn with_resource_types(mut self, resource_types: AccountSasResourceTypes) -> Self {
        self.resource_types = resource_types;
        self
    }

    /// Set the permissions.
    pub fn with_permissions(mut self, permissions: AccountSasPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set the start time.
    pub fn with_start(mut self, start: DateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Restrict to an IP address or range such as `168.1.5.60-168.1.5.70`.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Restrict the allowed protocol.
    pub fn with_protocol(mut self, protocol: SasProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// The expiry this SAS is signed with.
    pub fn expiry(&self) -> DateTime {
        self.expiry
    }

    /// [Construct the signature string](https://learn.microsoft.com/en-us/rest/api/storageservices/create-account-sas#construct-the-signature-string)
    fn signature(&self) -> Result<String> {
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            self.account,
            self.permissions,
            self.services,
            self.resource_types,
            self.start.map(time::format_rfc3339).unwrap_or_default(),
            time::format_rfc3339(self.expiry),
            self.ip.clone().unwrap_or_default(),
            self.protocol.map(|v| v.to_string()).unwrap_or_default(),
            ACCOUNT_SAS_VERSION,
        );

        let decode_content = hash::base64_decode(&self.key)?;

        Ok(hash::base64_hmac_sha256(
            &decode_content,
            string_to_sign.as_bytes(),
        ))
    }

    /// SAS parameters as decoded `(key, value)` pairs, in the order they are sent.
    pub fn token(&self) -> Result<Vec<(String, String)>> {
        let mut elements: Vec<(String, String)> = vec![
            ("sv".to_string(), ACCOUNT_SAS_VERSION.to_string()),
            ("ss".to_string(), self.services.to_string()),
            ("srt".to_string(), self.resource_types.to_string()),
            ("se".to_string(), time::format_rfc3339(self.expiry)),
            ("sp".to_string(), self.permissions.to_string()),
        ];

        if let Some(start) = &self.start {
            elements.push(("st".to_string(), time::format_rfc3339(*start)))
        }
        if let Some(ip) = &self.ip {
            elements.push(("sip".to_string(), ip.to_string()))
        }
        if let Some(protocol) = &self.protocol {
            elements.push(("spr".to_string(), protocol.to_string()))
        }

        elements.push(("sig".to_string(), self.signature()?));

        Ok(elements)
    }

    /// SAS as an encoded query string, ready to be appended to a URL.
    pub fn query_string(&self) -> Result<String> {
        Ok(self
            .token()?
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, urlencoded(&v)))
            .collect::<Vec<_>>()
            .join("&"))
    }
}

fn urlencoded(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn test_time() -> DateTime {
        DateTime::from_str("2022-03-01T08:12:34Z").unwrap()
    }

    #[test]
    fn test_can_generate_sas_token() {
        let key = hash::base64_encode("key".as_bytes());
        let expiry = test_time() + chrono::Duration::minutes(5);
        let sign = AccountSharedAccessSignature::new("account", key, expiry)
            .with_services(AccountSasServices {
                blob: true,
                queue: true,
                table: true,
                file: true,
            })
            .with_permissions(AccountSasPermissions {
                process: false,
                ..AccountSasPermissions::all()
            });

        assert_eq!(
            sign.query_string().unwrap(),
            "sv=2018-11-09&ss=bqtf&srt=sco&se=2022-03-01T08%3A17%3A34Z&sp=rwdlacu&sig=jgK9nDUT0ntH%2Fp28LPs0jzwxsk91W6hePLPlfrElv4k%3D"
        );
    }

    #[test]
    fn test_file_service_full_grant() {
        let key = hash::base64_encode("key".as_bytes());
        let expiry = test_time() + chrono::Duration::hours(1);
        let sign = AccountSharedAccessSignature::new("account", key, expiry);

        assert_eq!(
            sign.query_string().unwrap(),
            "sv=2018-11-09&ss=f&srt=sco&se=2022-03-01T09%3A12%3A34Z&sp=rwdlacup&sig=MxtqqEdOSEtYMwtaZoMQZ%2FefI1Nm25YXiK4WS9Srl4s%3D"
        );
    }

    #[test]
    fn test_optional_parameters() {
        let key = hash::base64_encode("key".as_bytes());
        let sign = AccountSharedAccessSignature::new(
            "account",
            key,
            test_time() + chrono::Duration::hours(1),
        )
        .with_permissions(AccountSasPermissions {
            read: true,
            ..Default::default()
        })
        .with_resource_types(AccountSasResourceTypes {
            object: true,
            ..Default::default()
        })
        .with_start(test_time())
        .with_protocol(SasProtocol::Https);

        let token = sign.token().unwrap();
        let keys: Vec<&str> = token.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["sv", "ss", "srt", "se", "sp", "st", "spr", "sig"]);
        assert_eq!(
            token.last().unwrap().1,
            "4R4Dr4PkG94yle6x+yFP+yCu5YyCdGbQVdBIZZOLuMg="
        );
    }

    #[test]
    fn test_invalid_key() {
        let sign = AccountSharedAccessSignature::new("account", "not base64!", test_time());
        assert!(sign.token().is_err());
    }

    #[test]
    fn test_flag_rendering() {
        assert_eq!(AccountSasPermissions::all().to_string(), "rwdlacup");
        assert_eq!(AccountSasServices::file().to_string(), "f");
        assert_eq!(AccountSasResourceTypes::all().to_string(), "sco");
        assert_eq!(AccountSasPermissions::default().to_string(), "");
    }
}
