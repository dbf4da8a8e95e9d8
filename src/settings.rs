use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::proxmox::config::{AuthMethod, ConnectionConfig, DEFAULT_PORT};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub auth_method: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: Option<bool>,
}

impl Settings {
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut s = Config::builder();

        // Config file is optional unless the caller named one explicitly.
        if let Some(path) = config_path {
            s = s.add_source(File::with_name(path).required(true));
        } else {
            s = s.add_source(File::with_name("config").required(false));
        }

        // Environment variables: PROXMOX_HOST, PROXMOX_AUTH_METHOD, ...
        s = s.add_source(Environment::with_prefix("PROXMOX").try_parsing(true));

        s.build()?.try_deserialize()
    }

    pub fn auth_method(&self) -> Result<AuthMethod, String> {
        match self.auth_method.as_deref() {
            None => Ok(AuthMethod::Token),
            Some(s) => s.parse(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.host.as_deref().unwrap_or("").is_empty() {
            return Err("Host is required".to_string());
        }
        match self.auth_method()? {
            AuthMethod::Token => {
                if self.token.as_deref().unwrap_or("").is_empty() {
                    return Err("Token is required for token auth".to_string());
                }
            }
            AuthMethod::Password => {
                if self.username.as_deref().unwrap_or("").is_empty()
                    || self.password.as_deref().unwrap_or("").is_empty()
                {
                    return Err("Username and password are required for password auth".to_string());
                }
            }
        }
        Ok(())
    }

    pub fn connection(&self) -> Result<ConnectionConfig, String> {
        self.validate()?;
        Ok(ConnectionConfig {
            // validate() guarantees the host is present
            host: self.host.clone().unwrap_or_default(),
            port: self.port.unwrap_or(DEFAULT_PORT),
            auth_method: self.auth_method()?,
            token: self.token.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            verify_ssl: self.verify_ssl.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_from_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "host = '1.2.3.4'\nauth_method = 'password'\nusername = 'testuser'\npassword = 'pw'\nverify_ssl = false"
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let settings = Settings::new(Some(path)).unwrap();

        assert_eq!(settings.host, Some("1.2.3.4".to_string()));
        assert_eq!(settings.username, Some("testuser".to_string()));
        assert_eq!(settings.password, Some("pw".to_string()));
        assert_eq!(settings.verify_ssl, Some(false));

        let conn = settings.connection().unwrap();
        assert_eq!(conn.port, DEFAULT_PORT);
        assert_eq!(conn.auth_method, AuthMethod::Password);
        assert!(!conn.verify_ssl);
    }

    #[test]
    fn test_validation_missing_host() {
        let s = Settings {
            token: Some("t".into()),
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validation_token_mode() {
        let s = Settings {
            host: Some("pve.local".into()),
            auth_method: Some("token".into()),
            ..Default::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            host: Some("pve.local".into()),
            token: Some("user@pam!mcp=uuid".into()),
            ..Default::default()
        };
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validation_password_mode() {
        let s = Settings {
            host: Some("pve.local".into()),
            auth_method: Some("password".into()),
            username: Some("root@pam".into()),
            ..Default::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            password: Some("pw".into()),
            ..s
        };
        assert!(s.validate().is_ok());
    }
}
