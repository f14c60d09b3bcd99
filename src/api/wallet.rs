//! Wallet API
//!
//! Partner wallet balance, statements and overdraft settings. These calls are
//! partner-scoped and carry no app token.

use std::sync::Arc;

use serde_json::Value;

use super::analytics::DateRange;
use super::{PartnerApi, PartnerContext};
use crate::error::GupshupError;
use crate::types::{Params, RequestSpec};
use crate::utils::encode_path_segment;

pub struct WalletApi {
    context: Arc<PartnerContext>,
}

impl WalletApi {
    pub fn new(context: Arc<PartnerContext>) -> Self {
        Self { context }
    }

    pub async fn balance(&self, wallet_id: &str) -> Result<Value, GupshupError> {
        self.fetch(wallet_id, "balance", Params::new()).await
    }

    pub async fn history(&self, wallet_id: &str, range: &DateRange) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("startDate", range.start_str())
            .with("endDate", range.end_str());
        self.fetch(wallet_id, "history", params).await
    }

    /// Monthly statement; `month` is passed through as given (e.g. `2024-05`).
    pub async fn statement(&self, wallet_id: &str, month: &str) -> Result<Value, GupshupError> {
        self.fetch(wallet_id, "statement", Params::new().with("month", month))
            .await
    }

    pub async fn overdraft(&self, wallet_id: &str) -> Result<Value, GupshupError> {
        self.fetch(wallet_id, "overdraft", Params::new()).await
    }

    pub async fn set_overdraft_limit(
        &self,
        wallet_id: &str,
        limit: f64,
    ) -> Result<Value, GupshupError> {
        if !limit.is_finite() {
            return Err(GupshupError::InvalidArgument(format!(
                "overdraft limit must be a finite number, got {}",
                limit
            )));
        }
        let spec = RequestSpec::post(wallet_path(wallet_id, "overdraft"))
            .params(Params::new().with("limit", limit.to_string()));
        self.context.partner_call(spec).await
    }

    /// Consumption over the last 90 days.
    pub async fn consumption_history(&self, wallet_id: &str) -> Result<Value, GupshupError> {
        self.fetch(wallet_id, "consumption", Params::new()).await
    }

    pub async fn commission(&self, wallet_id: &str) -> Result<Value, GupshupError> {
        self.fetch(wallet_id, "commission", Params::new()).await
    }

    pub async fn expired_credits(&self, wallet_id: &str) -> Result<Value, GupshupError> {
        self.fetch(wallet_id, "expired", Params::new()).await
    }

    async fn fetch(
        &self,
        wallet_id: &str,
        suffix: &str,
        params: Params,
    ) -> Result<Value, GupshupError> {
        let spec = RequestSpec::get(wallet_path(wallet_id, suffix)).params(params);
        self.context.partner_call(spec).await
    }
}

impl PartnerApi for WalletApi {
    fn context(&self) -> &PartnerContext {
        &self.context
    }
}

fn wallet_path(wallet_id: &str, suffix: &str) -> String {
    format!("/partner/wallet/{}/{}", encode_path_segment(wallet_id), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_path() {
        assert_eq!(wallet_path("w-1", "balance"), "/partner/wallet/w-1/balance");
        assert_eq!(wallet_path("w?1", "expired"), "/partner/wallet/w%3F1/expired");
    }
}
