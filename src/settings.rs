use serde::{Deserialize, Serialize};

use crate::errors::TurnstileError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub upstream: Upstream,
    pub routes: Routes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upstream {
    /// Base URL of the backend API that serves the effective permission
    /// list, e.g. http://127.0.0.1:8081
    pub base_url: String,
    /// Path of the current-subject permissions endpoint.
    pub permissions_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routes {
    /// Where unauthenticated visitors are sent. The attempted path is
    /// preserved in the `redirect` search parameter.
    pub login_path: String,
    /// Safe landing route for authenticated-but-unauthorized visitors.
    pub default_redirect: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
        }
    }
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            permissions_path: "/api/v1/me/permissions".to_string(),
        }
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            default_redirect: "/".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, TurnstileError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", Server::default().host)?
            .set_default("server.port", Server::default().port)?
            .set_default("upstream.base_url", Upstream::default().base_url)?
            .set_default("upstream.permissions_path", Upstream::default().permissions_path)?
            .set_default("routes.login_path", Routes::default().login_path)?
            .set_default("routes.default_redirect", Routes::default().default_redirect)?;

        // Optional file
        if std::path::Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: TURNSTILE__SERVER__PORT=9090, etc.
        builder =
            builder.add_source(config::Environment::with_prefix("TURNSTILE").separator("__"));

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }
}
