use anyhow::Context;
use chrono::{DateTime, Utc};

use super::print_json;
use crate::SortArg;
use wallet_sync::{AssetFilter, AssetQuery, AssetSort, Wallet};

/// Load the profile so reads use the user's fiat currency
async fn load_profile(wallet: &Wallet) {
    if !wallet.session().is_authenticated() {
        return;
    }
    if let Err(e) = wallet.sync().sync_profile().await {
        tracing::warn!("Using default fiat currency: {}", e);
    }
}

pub async fn assets(
    wallet: &Wallet,
    hide_hidden: bool,
    hide_small: bool,
    sort: SortArg,
    limit: Option<u64>,
) -> anyhow::Result<()> {
    load_profile(wallet).await;

    let mut query = AssetQuery::new().sort(match sort {
        SortArg::Amount => AssetSort::Amount,
        SortArg::Increase => AssetSort::Increase,
        SortArg::Decrease => AssetSort::Decrease,
    });
    if hide_hidden {
        query = query.filter(AssetFilter::ExcludeHidden);
    }
    if hide_small {
        query = query.filter(AssetFilter::ExcludeDust);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    print_json(&wallet.query_assets(query).await?)
}

pub async fn asset(wallet: &Wallet, asset_id: &str) -> anyhow::Result<()> {
    load_profile(wallet).await;
    let view = wallet
        .query_asset(asset_id)
        .await?
        .with_context(|| format!("Asset {} is not stored locally", asset_id))?;
    print_json(&view)
}

pub async fn snapshots(wallet: &Wallet, asset_id: &str, pages: u32, limit: u64) -> anyhow::Result<()> {
    load_profile(wallet).await;

    let mut feed = wallet.snapshot_feed(asset_id, limit);
    let mut rows = feed.first_page().await?;
    for _ in 1..pages {
        if !feed.has_next() {
            break;
        }
        rows.extend(feed.next_page().await?);
    }

    print_json(&rows)
}

pub async fn snapshot(wallet: &Wallet, snapshot_id: &str) -> anyhow::Result<()> {
    load_profile(wallet).await;
    wallet.sync().sync_snapshot(snapshot_id).await?;
    let view = wallet
        .query_snapshot(snapshot_id)
        .await?
        .with_context(|| format!("Snapshot {} is not stored locally", snapshot_id))?;
    print_json(&view)
}

pub async fn search(wallet: &Wallet, query: &str) -> anyhow::Result<()> {
    load_profile(wallet).await;
    if let Err(e) = wallet.sync().sync_search_assets(query).await {
        tracing::warn!("Remote search failed, showing local matches: {}", e);
    }
    print_json(&wallet.query_search_assets(query).await?)
}

pub async fn top(wallet: &Wallet) -> anyhow::Result<()> {
    load_profile(wallet).await;
    wallet.sync().sync_top_assets().await?;
    print_json(&wallet.query_top_assets().await?)
}

pub async fn ticker(wallet: &Wallet, asset_id: &str, at: Option<String>) -> anyhow::Result<()> {
    let at = at
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .with_context(|| format!("Invalid time {}", s))
        })
        .transpose()?;
    print_json(&wallet.query_ticker(asset_id, at).await?)
}
