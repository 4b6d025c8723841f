use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use crate::auth::{IdentityBridge, IdentityToolkitBridge, TokenCodec, TokenError};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{PaymentGateway, StripeGateway};

/// Everything a request handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenCodec>,
    pub bridge: Option<Arc<dyn IdentityBridge>>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State with no outbound integrations wired.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, TokenError> {
        let validity = Duration::hours(config.security.jwt_expiry_hours as i64);
        let tokens = TokenCodec::new(&config.security.jwt_secret, validity)?;

        Ok(Self {
            store,
            tokens: Arc::new(tokens),
            bridge: None,
            payments: None,
            config: Arc::new(config),
        })
    }

    /// State with the identity provider and payment processor wired from
    /// configuration. Either is left out when its key is missing.
    pub fn from_config(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, TokenError> {
        let client = reqwest::Client::new();
        let integrations = config.integrations.clone();
        let mut state = Self::new(config, store)?;

        match integrations.identity_api_key {
            Some(key) => {
                info!("Identity provider exchange enabled");
                state = state.with_bridge(Arc::new(IdentityToolkitBridge::new(
                    client.clone(),
                    integrations.identity_api_base,
                    key,
                )));
            }
            None => warn!("IDENTITY_API_KEY not set; external id tokens cannot be exchanged"),
        }

        match integrations.stripe_secret_key {
            Some(key) => {
                info!("Payment processor enabled");
                state = state.with_payments(Arc::new(StripeGateway::new(
                    client,
                    integrations.stripe_api_base,
                    key,
                )));
            }
            None => warn!("STRIPE_SECRET_KEY not set; payment intents are unavailable"),
        }

        Ok(state)
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn IdentityBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn with_payments(mut self, payments: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(payments);
        self
    }
}
