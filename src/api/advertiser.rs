use super::client::TikTokHttpClient;
use super::{id_string, ACCOUNT_DETAIL_PATH, ADVERTISER_LIST_PATH};
use crate::Result;

const CONTEXT: &str = "Failed to get advertisers";

impl TikTokHttpClient {
    /// First advertiser authorized for the app (token auth).
    pub async fn first_advertiser_id(&self, app_id: &str, secret: &str) -> Result<Option<String>> {
        let reply = self
            .get(
                ADVERTISER_LIST_PATH,
                &[("app_id", app_id), ("secret", secret)],
                CONTEXT,
            )
            .await?;

        Ok(reply
            .data
            .get("list")
            .and_then(|list| list.get(0))
            .and_then(|advertiser| advertiser.get("advertiser_id"))
            .and_then(id_string))
    }

    /// Account behind the browser session (cookie auth).
    pub async fn session_account_id(&self) -> Result<Option<String>> {
        let reply = self.get(ACCOUNT_DETAIL_PATH, &[], CONTEXT).await?;

        Ok(reply
            .data
            .get("account")
            .and_then(|account| account.get("id"))
            .and_then(id_string))
    }
}
