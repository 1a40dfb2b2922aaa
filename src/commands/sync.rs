use serde_json::json;

use super::print_json;
use crate::SyncTarget;
use wallet_sync::Wallet;

/// Execute a sync subcommand and print what it did
pub async fn execute(wallet: &Wallet, target: SyncTarget, default_limit: u64) -> anyhow::Result<()> {
    let engine = wallet.sync();

    match target {
        SyncTarget::Assets => {
            engine.sync_all_assets().await?;
            print_json(&json!({ "synced": "assets" }))
        }
        SyncTarget::Asset { asset_id } => {
            engine.sync_asset(&asset_id).await?;
            print_json(&json!({ "synced": "asset", "asset_id": asset_id }))
        }
        SyncTarget::Snapshots {
            asset_id,
            offset,
            limit,
        } => {
            let page = engine
                .sync_snapshot_page(&asset_id, offset.as_deref(), limit.unwrap_or(default_limit))
                .await?;
            print_json(&json!({
                "synced": "snapshots",
                "asset_id": asset_id,
                "fetched": page.fetched,
                "next_cursor": page.next_cursor,
                "is_last": page.is_last,
            }))
        }
        SyncTarget::Snapshot { snapshot_id } => {
            engine.sync_snapshot(&snapshot_id).await?;
            print_json(&json!({ "synced": "snapshot", "snapshot_id": snapshot_id }))
        }
        SyncTarget::Profile => {
            let profile = engine.sync_profile().await?;
            print_json(&profile)
        }
        SyncTarget::Top => {
            let ids = engine.sync_top_assets().await?;
            print_json(&json!({ "synced": "top", "asset_ids": ids }))
        }
        SyncTarget::Search { query } => {
            let found = engine.sync_search_assets(&query).await?;
            print_json(&json!({ "synced": "search", "query": query, "found": found }))
        }
    }
}
