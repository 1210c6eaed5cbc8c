use std::{
    fmt::{Debug, Formatter},
    fs,
    path::Path,
};

use serde::Deserialize;

use crate::prelude::*;

/// EPTR username and password, passed to the platform as is.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(alias = "EPTR_USERNAME")]
    pub username: String,

    #[serde(alias = "EPTR_PASSWORD")]
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Read the `[eptr_credentials]` section of a TOML secrets file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_secrets_file(path: &Path) -> Result<Self> {
        #[derive(Deserialize)]
        struct Secrets {
            eptr_credentials: SecretCredentials,
        }

        #[derive(Deserialize)]
        struct SecretCredentials {
            #[serde(rename = "EPTR_USERNAME")]
            username: String,

            #[serde(rename = "EPTR_PASSWORD")]
            password: String,
        }

        let load = || -> Result<Self> {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            let secrets: Secrets = toml::from_str(&contents)
                .with_context(|| format!("failed to parse `{}`", path.display()))?;
            Self {
                username: secrets.eptr_credentials.username,
                password: secrets.eptr_credentials.password,
            }
            .ensure_present()
        };
        load().context("EPTR2 credentials not found in secrets")
    }

    /// Read a JSON file with `username` and `password` fields.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("credentials file `{}` is not readable", path.display()))?;
        serde_json::from_str::<Self>(&contents)
            .with_context(|| format!("credentials file `{}` is malformed", path.display()))?
            .ensure_present()
            .with_context(|| format!("credentials file `{}` is incomplete", path.display()))
    }

    fn ensure_present(self) -> Result<Self> {
        ensure!(!self.username.is_empty(), "the username is empty");
        ensure!(!self.password.is_empty(), "the password is empty");
        Ok(self)
    }
}
