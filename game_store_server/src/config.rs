use std::{env, time::Duration};

use game_store_engine::{payment_provider::DEFAULT_SNAP_URL, SnapConfig};
use gsp_common::{parse_boolean_flag, Secret};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

const DEFAULT_GSP_HOST: &str = "127.0.0.1";
const DEFAULT_GSP_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/game_store.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_millis(2000);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    /// The payment provider's endpoint and credentials. The server key also verifies notification signatures.
    pub payment: SnapConfig,
    /// Upper bound on a catalog price lookup when adding to the cart
    pub catalog_timeout: Duration,
    pub webhook: WebhookConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GSP_HOST.to_string(),
            port: DEFAULT_GSP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            payment: SnapConfig::default(),
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
            webhook: WebhookConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GSP_HOST").ok().unwrap_or_else(|| DEFAULT_GSP_HOST.into());
        let port = env::var("GSP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for GSP_PORT. {e} Using the default, {DEFAULT_GSP_PORT}, instead."
                    );
                    DEFAULT_GSP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_GSP_PORT);
        let database_url = env::var("GSP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ GSP_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections = env::var("GSP_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for GSP_DB_MAX_CONNECTIONS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let auth = AuthConfig::from_env_or_default();
        let payment = payment_config_from_env();
        let catalog_timeout = env::var("GSP_CATALOG_TIMEOUT_MS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for GSP_CATALOG_TIMEOUT_MS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_CATALOG_TIMEOUT);
        let webhook = WebhookConfig::from_env_or_default();
        let use_x_forwarded_for = parse_boolean_flag(env::var("GSP_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("GSP_USE_FORWARDED").ok(), false);
        Self {
            host,
            port,
            database_url,
            db_max_connections,
            auth,
            payment,
            catalog_timeout,
            webhook,
            use_x_forwarded_for,
            use_forwarded,
        }
    }
}

fn payment_config_from_env() -> SnapConfig {
    let server_key = env::var("GSP_PAYMENT_SERVER_KEY").ok().unwrap_or_else(|| {
        error!(
            "🪛️ GSP_PAYMENT_SERVER_KEY is not set. Payment sessions cannot be opened and every payment notification \
             will be rejected."
        );
        String::default()
    });
    let api_url = env::var("GSP_PAYMENT_API_URL").ok().unwrap_or_else(|| {
        info!("🪛️ GSP_PAYMENT_API_URL is not set. Using the sandbox endpoint, {DEFAULT_SNAP_URL}.");
        DEFAULT_SNAP_URL.to_string()
    });
    let timeout = env::var("GSP_PAYMENT_TIMEOUT_SECS")
        .map_err(|_| {
            info!(
                "🪛️ GSP_PAYMENT_TIMEOUT_SECS is not set. Using the default value of {}s.",
                DEFAULT_PAYMENT_TIMEOUT.as_secs()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| warn!("🪛️ Invalid configuration value for GSP_PAYMENT_TIMEOUT_SECS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_PAYMENT_TIMEOUT);
    SnapConfig { api_url, server_key: Secret::new(server_key), timeout }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider that issues bearer tokens
    pub jwt_secret: Secret<String>,
    /// Lifetime of tokens issued by [`crate::auth::TokenIssuer`]
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens issued \
             elsewhere will not be accepted, and tokens issued now will be invalid after a restart. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), token_lifetime: DEFAULT_TOKEN_LIFETIME }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: &str) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.to_string()), token_lifetime: DEFAULT_TOKEN_LIFETIME }
    }

    pub fn from_env_or_default() -> Self {
        match env::var("GSP_JWT_SECRET") {
            Ok(s) if !s.trim().is_empty() => Self::new(s.trim()),
            _ => Self::default(),
        }
    }
}

//-------------------------------------------------  WebhookConfig  ----------------------------------------------------
/// The unsigned webhook channel. It is off unless explicitly enabled, and then requires an HMAC of the body.
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub hmac_secret: Secret<String>,
    pub hmac_checks: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { enabled: false, hmac_secret: Secret::default(), hmac_checks: true }
    }
}

impl WebhookConfig {
    pub fn from_env_or_default() -> Self {
        let enabled = parse_boolean_flag(env::var("GSP_ENABLE_UNSIGNED_WEBHOOK").ok(), false);
        let hmac_secret = Secret::new(env::var("GSP_WEBHOOK_HMAC_SECRET").ok().unwrap_or_default());
        let hmac_checks = parse_boolean_flag(env::var("GSP_WEBHOOK_HMAC_CHECKS").ok(), true);
        if enabled {
            match (hmac_checks, hmac_secret.is_empty()) {
                (false, _) => warn!(
                    "🚨️ The payment webhook is enabled WITHOUT HMAC checks. Anyone who can reach the server can mark \
                     orders as paid."
                ),
                (true, true) => error!(
                    "🪛️ The payment webhook is enabled but GSP_WEBHOOK_HMAC_SECRET is not set. Every webhook call will \
                     be rejected."
                ),
                (true, false) => info!("🪛️ The payment webhook is enabled, with HMAC checks."),
            }
        } else {
            info!("🪛️ The payment webhook is disabled. Only signed notifications are accepted.");
        }
        Self { enabled, hmac_secret, hmac_checks }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The non-secret subset of the configuration that handlers need.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
