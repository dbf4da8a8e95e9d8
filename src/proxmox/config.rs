use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8006;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Token,
    Password,
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(AuthMethod::Token),
            "password" => Ok(AuthMethod::Password),
            other => Err(format!("unknown auth method '{}'", other)),
        }
    }
}

/// Connection settings for one Proxmox endpoint. Immutable once built;
/// the session client only ever reads from it.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub auth_method: AuthMethod,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: bool,
}

impl ConnectionConfig {
    pub fn token(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            auth_method: AuthMethod::Token,
            token: Some(token.into()),
            username: None,
            password: None,
            verify_ssl: true,
        }
    }

    pub fn password(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            auth_method: AuthMethod::Password,
            token: None,
            username: Some(username.into()),
            password: Some(password.into()),
            verify_ssl: true,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_parse() {
        assert_eq!("token".parse::<AuthMethod>().unwrap(), AuthMethod::Token);
        assert_eq!(
            "password".parse::<AuthMethod>().unwrap(),
            AuthMethod::Password
        );
        assert!("oidc".parse::<AuthMethod>().is_err());
    }

    #[test]
    fn test_constructors() {
        let c = ConnectionConfig::token("pve.local", "user@pam!mcp=uuid");
        assert_eq!(c.port, DEFAULT_PORT);
        assert_eq!(c.auth_method, AuthMethod::Token);
        assert!(c.username.is_none());

        let c = ConnectionConfig::password("pve.local", "root@pam", "secret")
            .with_port(8007)
            .with_verify_ssl(false);
        assert_eq!(c.port, 8007);
        assert!(!c.verify_ssl);
        assert_eq!(c.auth_method, AuthMethod::Password);
    }
}
