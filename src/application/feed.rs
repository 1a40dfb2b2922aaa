use crate::application::query::{SnapshotFilter, MAX_PAGE_LIMIT};
use crate::application::wallet::Wallet;
use crate::domain::models::SnapshotView;
use crate::domain::WalletResult;

/// Page-by-page history of one asset, syncing each page before reading it.
///
/// The feed ends at the first page shorter than `limit`; from then on
/// [`SnapshotFeed::next_page`] returns nothing and makes no remote calls.
pub struct SnapshotFeed {
    wallet: Wallet,
    asset_id: String,
    limit: u64,
    cursor: Option<String>,
    has_next: bool,
}

impl SnapshotFeed {
    pub fn new(wallet: Wallet, asset_id: &str, limit: u64) -> Self {
        Self {
            wallet,
            asset_id: asset_id.to_string(),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            cursor: None,
            has_next: true,
        }
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Restart from the newest snapshot
    pub async fn first_page(&mut self) -> WalletResult<Vec<SnapshotView>> {
        self.cursor = None;
        self.has_next = true;
        self.load(None).await
    }

    pub async fn next_page(&mut self) -> WalletResult<Vec<SnapshotView>> {
        if !self.has_next {
            return Ok(Vec::new());
        }
        let cursor = self.cursor.clone();
        self.load(cursor).await
    }

    async fn load(&mut self, cursor: Option<String>) -> WalletResult<Vec<SnapshotView>> {
        let synced = self
            .wallet
            .sync()
            .sync_snapshot_page(&self.asset_id, cursor.as_deref(), self.limit)
            .await?;

        let page = self
            .wallet
            .query_snapshot_page(SnapshotFilter::asset(&self.asset_id), cursor, self.limit)
            .await?;

        self.has_next = !synced.is_last && page.len() as u64 >= self.limit;
        if let Some(last) = page.last() {
            self.cursor = Some(last.snapshot.created_at.clone());
        }
        Ok(page)
    }
}
