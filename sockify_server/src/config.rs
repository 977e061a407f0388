use std::env;

use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sockify_common::{
    helpers::{non_empty, parse_boolean_flag},
    Secret,
    DEFAULT_CURRENCY_CODE,
};
use sockify_engine::checkout_objects::{CheckoutConfig, DEFAULT_SESSION_TTL};
use stripe_tools::StripeConfig;

const DEFAULT_SOCKIFY_HOST: &str = "127.0.0.1";
const DEFAULT_SOCKIFY_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/sockify.db";
const DEFAULT_WEB_CLIENT_URL: &str = "http://localhost:5173";
const DEFAULT_DEV_ADMIN_ID: i64 = 1;
pub const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com";
pub const DEFAULT_SENDER_ADDRESS: &str = "no-reply@sockify.shop";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The storefront. Payment success and cancel pages live here.
    pub web_client_url: String,
    /// ISO currency code for checkout sessions, lower case.
    pub currency: String,
    /// How long a customer has to complete a payment session.
    pub session_ttl: Duration,
    pub auth: AuthConfig,
    pub stripe: StripeConfig,
    pub email: EmailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SOCKIFY_HOST.to_string(),
            port: DEFAULT_SOCKIFY_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            web_client_url: DEFAULT_WEB_CLIENT_URL.to_string(),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
            auth: AuthConfig::default(),
            stripe: StripeConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SOCKIFY_HOST").ok().unwrap_or_else(|| DEFAULT_SOCKIFY_HOST.into());
        let port = env::var("SOCKIFY_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SOCKIFY_PORT. {e} Using the default, {DEFAULT_SOCKIFY_PORT}, \
                         instead."
                    );
                    DEFAULT_SOCKIFY_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SOCKIFY_PORT);
        let database_url = non_empty(env::var("SOCKIFY_DATABASE_URL").ok()).unwrap_or_else(|| {
            warn!("🪛️ SOCKIFY_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let web_client_url = non_empty(env::var("SOCKIFY_WEB_CLIENT_URL").ok()).unwrap_or_else(|| {
            info!("🪛️ SOCKIFY_WEB_CLIENT_URL is not set. Payment pages will redirect to {DEFAULT_WEB_CLIENT_URL}");
            DEFAULT_WEB_CLIENT_URL.to_string()
        });
        let currency = non_empty(env::var("SOCKIFY_CURRENCY").ok())
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
        let session_ttl = configure_session_ttl();
        let auth = AuthConfig::from_env_or_default();
        let stripe = StripeConfig::new_from_env_or_default();
        let email = EmailConfig::from_env_or_default();
        Self { host, port, database_url, web_client_url, currency, session_ttl, auth, stripe, email }
    }

    /// The settings the checkout workflow needs, derived from this configuration.
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig::for_web_client(&self.web_client_url)
            .with_currency(self.currency.as_str())
            .with_session_ttl(self.session_ttl)
    }
}

fn configure_session_ttl() -> Duration {
    env::var("SOCKIFY_CHECKOUT_SESSION_TTL")
        .map_err(|_| {
            info!(
                "🪛️ SOCKIFY_CHECKOUT_SESSION_TTL is not set. Using the default value of {} minutes.",
                DEFAULT_SESSION_TTL.num_minutes()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for SOCKIFY_CHECKOUT_SESSION_TTL. {e}"))
                .and_then(|m| {
                    if m > 0 {
                        Ok(Duration::minutes(m))
                    } else {
                        warn!("🪛️ SOCKIFY_CHECKOUT_SESSION_TTL must be a positive number of minutes. Ignoring {m}");
                        Err(())
                    }
                })
        })
        .ok()
        .unwrap_or(DEFAULT_SESSION_TTL)
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 secret that admin access tokens are signed with.
    pub jwt_secret: Secret<String>,
    /// Skips token validation altogether. **DANGER**. For local development only.
    pub disable_auth: bool,
    /// The admin that changes are attributed to when `disable_auth` is set.
    pub dev_admin_id: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens issued \
             elsewhere will not be accepted. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        Self { jwt_secret: Secret::new(random_secret()), disable_auth: false, dev_admin_id: DEFAULT_DEV_ADMIN_ID }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.into()), disable_auth: false, dev_admin_id: DEFAULT_DEV_ADMIN_ID }
    }

    pub fn from_env_or_default() -> Self {
        let mut config = match non_empty(env::var("SOCKIFY_JWT_SECRET").ok()) {
            Some(secret) => Self::new(secret),
            None => Self::default(),
        };
        config.disable_auth = parse_boolean_flag(env::var("SOCKIFY_DISABLE_AUTH").ok(), false);
        config.dev_admin_id = env::var("SOCKIFY_DEV_ADMIN_ID")
            .ok()
            .and_then(|s| {
                s.parse::<i64>().map_err(|e| warn!("🪛️ Invalid value for SOCKIFY_DEV_ADMIN_ID ({s}). {e}")).ok()
            })
            .unwrap_or(DEFAULT_DEV_ADMIN_ID);
        if config.disable_auth {
            warn!(
                "🚨️🚨️🚨️ Authentication is DISABLED. Every admin request is attributed to admin #{}. Never do this \
                 in production! 🚨️🚨️🚨️",
                config.dev_admin_id
            );
        }
        config
    }
}

fn random_secret() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect()
}

//-------------------------------------------------  EmailConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct EmailConfig {
    /// With no key, confirmations are only written to the log.
    pub sendgrid_api_key: Secret<String>,
    pub sendgrid_api_url: String,
    pub sender_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sendgrid_api_key: Secret::default(),
            sendgrid_api_url: DEFAULT_SENDGRID_API_URL.to_string(),
            sender_address: DEFAULT_SENDER_ADDRESS.to_string(),
        }
    }
}

impl EmailConfig {
    pub fn from_env_or_default() -> Self {
        let sendgrid_api_key = non_empty(env::var("SOCKIFY_SENDGRID_API_KEY").ok()).unwrap_or_else(|| {
            warn!("🪛️ SOCKIFY_SENDGRID_API_KEY is not set. Order confirmations will be logged, not e-mailed.");
            String::default()
        });
        let sendgrid_api_url = non_empty(env::var("SOCKIFY_SENDGRID_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_SENDGRID_API_URL.to_string());
        let sender_address = non_empty(env::var("SOCKIFY_EMAIL_SENDER_ADDRESS").ok())
            .unwrap_or_else(|| DEFAULT_SENDER_ADDRESS.to_string());
        Self { sendgrid_api_key: Secret::new(sendgrid_api_key), sendgrid_api_url, sender_address }
    }

    pub fn is_enabled(&self) -> bool {
        !self.sendgrid_api_key.is_unset()
    }
}
