mod common;

use sea_orm::ConnectionTrait;
use std::time::Duration;

use common::{asset, fiat, setup, snapshot, user, FakeApi};
use wallet_sync::infrastructure::api::ApiClientError;
use wallet_sync::infrastructure::persistence::repositories::Repositories;
use wallet_sync::{QueryFamily, SnapshotFilter, Wallet};

fn repos(wallet: &Wallet) -> Repositories {
    Repositories::new(wallet.connection().clone())
}

async fn stored_balance(wallet: &Wallet, asset_id: &str) -> Option<String> {
    repos(wallet)
        .asset
        .find_by_id(asset_id)
        .await
        .unwrap()
        .map(|a| a.balance)
}

fn seed_held(api: &FakeApi) {
    api.set_held(vec![
        asset("btc", "btc", "BTC", "2", "10"),
        asset("usdt", "eth", "USDT", "1.50", "1"),
        asset("eth", "eth", "ETH", "0.3", "2000"),
    ]);
    api.set_fiats(vec![fiat("USD", "1"), fiat("EUR", "0.9")]);
}

#[tokio::test]
async fn test_sync_all_assets_is_idempotent() {
    let (wallet, api) = setup().await;
    seed_held(&api);

    wallet.sync().sync_all_assets().await.unwrap();
    let mut first = repos(&wallet).asset.find_all().await.unwrap();
    let first_fiats = repos(&wallet).fiat.find_all().await.unwrap();

    wallet.sync().sync_all_assets().await.unwrap();
    let mut second = repos(&wallet).asset.find_all().await.unwrap();
    let second_fiats = repos(&wallet).fiat.find_all().await.unwrap();

    first.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));
    second.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));
    assert_eq!(first, second);
    assert_eq!(first_fiats, second_fiats);
    assert_eq!(first.len(), 3);
    assert_eq!(api.calls("fetch_assets"), 2);
    assert_eq!(api.calls("fetch_exchange_rates"), 2);
}

#[tokio::test]
async fn test_balances_are_normalized_on_write() {
    let (wallet, api) = setup().await;
    seed_held(&api);

    wallet.sync().sync_all_assets().await.unwrap();

    assert_eq!(stored_balance(&wallet, "usdt").await.as_deref(), Some("1.5"));
}

#[tokio::test]
async fn test_full_sync_zeroes_vanished_assets_and_keeps_rows() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    api.set_held(vec![asset("btc", "btc", "BTC", "3", "10")]);
    wallet.sync().sync_all_assets().await.unwrap();

    assert_eq!(stored_balance(&wallet, "btc").await.as_deref(), Some("3"));
    assert_eq!(stored_balance(&wallet, "eth").await.as_deref(), Some("0"));
    assert_eq!(stored_balance(&wallet, "usdt").await.as_deref(), Some("0"));
    assert_eq!(repos(&wallet).asset.find_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_full_sync_rolls_back_zeroing_when_a_write_fails() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    wallet
        .connection()
        .execute_unprepared(
            "CREATE TRIGGER abort_boom BEFORE INSERT ON asset \
             WHEN NEW.asset_id = 'boom' \
             BEGIN SELECT RAISE(ABORT, 'forced failure'); END;",
        )
        .await
        .unwrap();

    api.set_held(vec![
        asset("btc", "btc", "BTC", "9", "10"),
        asset("boom", "boom", "BOOM", "1", "1"),
    ]);
    let result = wallet.sync().sync_all_assets().await;

    assert!(result.is_err());
    assert_eq!(stored_balance(&wallet, "btc").await.as_deref(), Some("2"));
    assert_eq!(stored_balance(&wallet, "eth").await.as_deref(), Some("0.3"));
    assert!(stored_balance(&wallet, "boom").await.is_none());
}

#[tokio::test]
async fn test_remote_failure_leaves_previous_data_intact() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    api.set_held(vec![]);
    api.fail(
        "fetch_exchange_rates",
        ApiClientError::HttpError("connection reset".into()),
    );
    let result = wallet.sync().sync_all_assets().await;

    assert!(result.is_err());
    assert_eq!(stored_balance(&wallet, "btc").await.as_deref(), Some("2"));
    assert_eq!(repos(&wallet).fiat.find_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_rate_list_keeps_stored_rates() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    api.set_fiats(vec![]);
    wallet.sync().sync_all_assets().await.unwrap();

    assert_eq!(repos(&wallet).fiat.find_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rates_are_replaced_on_full_sync() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    api.set_fiats(vec![fiat("USD", "1"), fiat("JPY", "110")]);
    wallet.sync().sync_all_assets().await.unwrap();

    let codes: Vec<String> = repos(&wallet)
        .fiat
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.code)
        .collect();
    assert_eq!(codes, vec!["JPY".to_string(), "USD".to_string()]);
    let yen = repos(&wallet).fiat.find_by_code("JPY").await.unwrap().unwrap();
    assert_eq!(yen.rate.to_string(), "110");
    assert!(repos(&wallet).fiat.find_by_code("EUR").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sync_asset_leaves_other_balances_alone() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    api.add_catalog(vec![asset("btc", "btc", "BTC", "5", "11")]);
    wallet.sync().sync_asset("btc").await.unwrap();

    assert_eq!(stored_balance(&wallet, "btc").await.as_deref(), Some("5"));
    assert_eq!(stored_balance(&wallet, "eth").await.as_deref(), Some("0.3"));
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_later_syncs_fail_fast() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    let mut token = wallet.session().subscribe_token();

    api.fail(
        "fetch_assets",
        ApiClientError::ApiError {
            code: 401,
            description: "Unauthorized, maybe invalid token.".into(),
        },
    );
    let err = wallet.sync().sync_all_assets().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(wallet.session().token().is_none());
    token.changed().await.unwrap();
    assert!(token.borrow().is_none());

    api.clear_failures();
    api.reset_calls();
    let err = wallet.sync().sync_asset("btc").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(api.total_calls(), 0);

    wallet.session().set_token("fresh-token");
    wallet.sync().sync_all_assets().await.unwrap();
    assert_eq!(api.calls("fetch_assets"), 1);
}

#[tokio::test]
async fn test_unauthorized_response_keeps_token_set_during_request() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    api.set_delay(Duration::from_millis(100));
    api.fail(
        "fetch_assets",
        ApiClientError::ApiError {
            code: 401,
            description: "Unauthorized, maybe invalid token.".into(),
        },
    );

    let (result, _) = tokio::join!(wallet.sync().sync_all_assets(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        wallet.session().set_token("fresh-token");
    });

    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(wallet.session().token().as_deref(), Some("fresh-token"));

    api.clear_failures();
    api.set_delay(Duration::ZERO);
    wallet.sync().sync_all_assets().await.unwrap();
}

#[tokio::test]
async fn test_snapshot_page_backfills_asset_chain_and_opponents() {
    let (wallet, api) = setup().await;
    api.set_fiats(vec![fiat("USD", "1")]);
    wallet.sync().sync_all_assets().await.unwrap();

    api.add_catalog(vec![
        asset("usdt", "eth", "USDT", "0", "1"),
        asset("eth", "eth", "ETH", "0", "2000"),
    ]);
    api.add_users(vec![user("alice"), user("bob")]);
    api.add_snapshots(vec![
        snapshot("s1", "usdt", Some("alice"), 10),
        snapshot("s2", "usdt", Some("bob"), 20),
        snapshot("s3", "usdt", Some("alice"), 30),
    ]);

    let page = wallet
        .sync()
        .sync_snapshot_page("usdt", None, 30)
        .await
        .unwrap();

    assert_eq!(page.fetched, 3);
    assert!(page.is_last);
    assert_eq!(api.calls("fetch_asset"), 2);
    assert_eq!(api.calls("fetch_users"), 1);

    let views = wallet
        .query_snapshot_page(SnapshotFilter::asset("usdt"), None, 30)
        .await
        .unwrap();
    assert_eq!(views.len(), 3);
    for view in &views {
        assert_eq!(view.asset.as_ref().unwrap().asset_id, "usdt");
        assert_eq!(view.chain.as_ref().unwrap().asset_id, "eth");
        assert!(view.opponent.is_some());
    }
    // The backfilled asset is stored without a balance of its own
    assert_eq!(stored_balance(&wallet, "usdt").await.as_deref(), Some("0"));
}

#[tokio::test]
async fn test_backfill_skips_remote_calls_when_everything_exists() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();
    api.add_users(vec![user("alice")]);
    api.add_snapshots(vec![
        snapshot("s1", "usdt", Some("alice"), 10),
        snapshot("s2", "usdt", Some("alice"), 20),
    ]);
    wallet
        .sync()
        .sync_snapshot_page("usdt", None, 30)
        .await
        .unwrap();

    api.reset_calls();
    let mut events = wallet.cache().subscribe();
    wallet
        .sync()
        .sync_snapshot_page("usdt", None, 30)
        .await
        .unwrap();

    assert_eq!(api.calls("fetch_snapshots"), 1);
    assert_eq!(api.calls("fetch_asset"), 0);
    assert_eq!(api.calls("fetch_users"), 0);
    assert_eq!(events.try_recv().unwrap(), QueryFamily::Snapshot);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_sync_snapshot_makes_unknown_opponent_queryable() {
    let (wallet, api) = setup().await;
    api.set_fiats(vec![fiat("USD", "1")]);
    wallet.sync().sync_all_assets().await.unwrap();

    api.add_catalog(vec![asset("xin", "eth", "XIN", "0", "150"), asset("eth", "eth", "ETH", "0", "2000")]);
    api.add_users(vec![user("carol")]);
    let mut incoming = snapshot("s9", "xin", Some("carol"), 99);
    incoming.user_id = Some("carol".into());
    api.add_snapshots(vec![incoming]);

    wallet.sync().sync_snapshot("s9").await.unwrap();

    let view = wallet.query_snapshot("s9").await.unwrap().unwrap();
    assert_eq!(view.opponent.unwrap().full_name, "User carol");
    assert_eq!(view.asset.unwrap().symbol, "XIN");
    assert_eq!(view.chain.unwrap().symbol, "ETH");
    assert!(wallet.query_user("carol").await.unwrap().is_some());
    assert_eq!(api.calls("fetch_users"), 1);
}

#[tokio::test]
async fn test_concurrent_identical_page_syncs_share_one_fetch() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();
    api.add_users(vec![user("alice")]);
    api.add_snapshots(vec![snapshot("s1", "btc", Some("alice"), 10)]);
    api.set_delay(Duration::from_millis(50));
    api.reset_calls();

    let engine = wallet.sync();
    let (a, b) = tokio::join!(
        engine.sync_snapshot_page("btc", None, 30),
        engine.sync_snapshot_page("btc", None, 30),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(api.calls("fetch_snapshots"), 1);
    assert_eq!(api.calls("fetch_users"), 1);
}

#[tokio::test]
async fn test_page_sync_reports_cursor_and_last_page() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();
    api.add_snapshots((0..5).map(|i| snapshot(&format!("s{}", i), "btc", None, i)).collect());

    let first = wallet.sync().sync_snapshot_page("btc", None, 3).await.unwrap();
    assert_eq!(first.fetched, 3);
    assert!(!first.is_last);
    assert_eq!(first.next_cursor, Some(common::timestamp(2)));

    let second = wallet
        .sync()
        .sync_snapshot_page("btc", first.next_cursor.as_deref(), 3)
        .await
        .unwrap();
    assert_eq!(second.fetched, 2);
    assert!(second.is_last);
}

#[tokio::test]
async fn test_hidden_flag_survives_resync() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    wallet.sync().set_asset_hidden("eth", true).await.unwrap();
    wallet.sync().sync_all_assets().await.unwrap();

    let view = wallet.query_asset("eth").await.unwrap().unwrap();
    assert!(view.hidden);
    let extra = repos(&wallet).asset.find_extra("eth").await.unwrap().unwrap();
    assert!(extra.hidden);
    assert!(repos(&wallet).asset.find_extra("btc").await.unwrap().is_none());
}

#[tokio::test]
async fn test_top_assets_store_market_data_without_touching_balances() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();

    api.set_top(vec![
        asset("doge", "doge", "DOGE", "0", "0.1"),
        asset("btc", "btc", "BTC", "0", "12"),
    ]);
    let ids = wallet.sync().sync_top_assets().await.unwrap();
    assert_eq!(ids, vec!["doge".to_string(), "btc".to_string()]);

    let btc = repos(&wallet).asset.find_by_id("btc").await.unwrap().unwrap();
    assert_eq!(btc.balance, "2");
    assert_eq!(btc.price_usd, "12");
    assert_eq!(stored_balance(&wallet, "doge").await.as_deref(), Some("0"));

    let top: Vec<String> = wallet
        .query_top_assets()
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.asset.asset_id)
        .collect();
    assert_eq!(top, vec!["doge".to_string(), "btc".to_string()]);
}

#[tokio::test]
async fn test_profile_sync_sets_fiat_currency() {
    let (wallet, api) = setup().await;
    let mut me = user("me");
    me.fiat_currency = Some("EUR".into());
    *api.profile.lock().unwrap() = Some(me);

    let profile = wallet.sync().sync_profile().await.unwrap();

    assert_eq!(profile.user_id, "me");
    assert_eq!(wallet.session().fiat_currency(), "EUR");
    assert!(wallet.query_user("me").await.unwrap().is_some());
}

#[tokio::test]
async fn test_search_stores_results_and_blank_queries_stay_local() {
    let (wallet, api) = setup().await;
    seed_held(&api);
    wallet.sync().sync_all_assets().await.unwrap();
    api.add_catalog(vec![asset("doge", "doge", "DOGE", "0", "0.1")]);
    api.reset_calls();

    assert_eq!(wallet.sync().sync_search_assets("   ").await.unwrap(), 0);
    assert_eq!(api.calls("search_assets"), 0);

    let stored = wallet.sync().sync_search_assets("doge").await.unwrap();
    assert_eq!(stored, 1);

    let hits = wallet.query_search_assets("DOG").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].asset.asset_id, "doge");
    assert!(wallet.query_search_assets("").await.unwrap().is_empty());
}
