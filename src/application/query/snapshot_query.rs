use sea_orm::sea_query::{Alias, Expr, JoinType, Order, Query, SelectStatement};
use sea_orm::{ConnectionTrait, FromQueryResult, QueryResult};

use super::columns::{self, ASSET, CHAIN, FIAT, OPPONENT, SNAPSHOT};
use crate::domain::models::{Asset, Fiat, Snapshot, SnapshotView, User};
use crate::infrastructure::persistence::entities::{asset, fiat, snapshot, user};
use crate::infrastructure::persistence::error::DbError;

/// Upper bound of a single snapshot page
pub const MAX_PAGE_LIMIT: u64 = 500;

/// Which snapshots a history list shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SnapshotFilter {
    pub asset_id: Option<String>,
    pub opponent_id: Option<String>,
    pub snapshot_id: Option<String>,
}

impl SnapshotFilter {
    pub fn asset(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: Some(asset_id.into()),
            ..Default::default()
        }
    }

    pub fn opponent(opponent_id: impl Into<String>) -> Self {
        Self {
            opponent_id: Some(opponent_id.into()),
            ..Default::default()
        }
    }
}

/// Builds and runs snapshot view queries, newest first
pub struct SnapshotQueryComposer;

impl SnapshotQueryComposer {
    /// snapshot ⟕ asset ⟕ chain ⟕ opponent ⋈ fiat(currency)
    fn base(currency: &str) -> SelectStatement {
        let mut select = Query::select();
        select.from_as(snapshot::Entity, Alias::new(SNAPSHOT));

        columns::select_prefixed::<snapshot::Entity>(&mut select, SNAPSHOT);
        columns::select_prefixed::<asset::Entity>(&mut select, ASSET);
        columns::select_prefixed::<asset::Entity>(&mut select, CHAIN);
        columns::select_prefixed::<user::Entity>(&mut select, OPPONENT);
        columns::select_prefixed::<fiat::Entity>(&mut select, FIAT);

        select
            .join_as(
                JoinType::LeftJoin,
                asset::Entity,
                Alias::new(ASSET),
                Expr::col((Alias::new(ASSET), asset::Column::AssetId))
                    .equals((Alias::new(SNAPSHOT), snapshot::Column::AssetId)),
            )
            .join_as(
                JoinType::LeftJoin,
                asset::Entity,
                Alias::new(CHAIN),
                Expr::col((Alias::new(CHAIN), asset::Column::AssetId))
                    .equals((Alias::new(ASSET), asset::Column::ChainId)),
            )
            .join_as(
                JoinType::LeftJoin,
                user::Entity,
                Alias::new(OPPONENT),
                Expr::col((Alias::new(OPPONENT), user::Column::UserId))
                    .equals((Alias::new(SNAPSHOT), snapshot::Column::OpponentId)),
            )
            .join_as(
                JoinType::InnerJoin,
                fiat::Entity,
                Alias::new(FIAT),
                Expr::col((Alias::new(FIAT), fiat::Column::Code)).eq(currency),
            );

        select
    }

    /// Compile a page query; `cursor` keeps rows created strictly before it
    pub fn statement(
        currency: &str,
        filter: &SnapshotFilter,
        cursor: Option<&str>,
        limit: u64,
    ) -> SelectStatement {
        let col = |c: snapshot::Column| Expr::col((Alias::new(SNAPSHOT), c));
        let mut select = Self::base(currency);

        if let Some(asset_id) = &filter.asset_id {
            select.and_where(col(snapshot::Column::AssetId).eq(asset_id.as_str()));
        }
        if let Some(opponent_id) = &filter.opponent_id {
            select.and_where(col(snapshot::Column::OpponentId).eq(opponent_id.as_str()));
        }
        if let Some(snapshot_id) = &filter.snapshot_id {
            select.and_where(col(snapshot::Column::SnapshotId).eq(snapshot_id.as_str()));
        }
        if let Some(cursor) = cursor {
            select.and_where(col(snapshot::Column::CreatedAt).lt(cursor));
        }

        select
            .order_by((Alias::new(SNAPSHOT), snapshot::Column::CreatedAt), Order::Desc)
            .order_by((Alias::new(SNAPSHOT), snapshot::Column::SnapshotId), Order::Desc)
            .limit(limit.clamp(1, MAX_PAGE_LIMIT));

        select
    }

    fn map_row(row: &QueryResult) -> Result<SnapshotView, DbError> {
        let snapshot = snapshot::Model::from_query_result(row, &columns::prefix(SNAPSHOT))?;
        let asset = asset::Model::from_query_result_optional(row, &columns::prefix(ASSET))?;
        let chain = asset::Model::from_query_result_optional(row, &columns::prefix(CHAIN))?;
        let opponent = user::Model::from_query_result_optional(row, &columns::prefix(OPPONENT))?;
        let fiat = fiat::Model::from_query_result(row, &columns::prefix(FIAT))?;

        Ok(SnapshotView {
            snapshot: Snapshot::from(snapshot),
            asset: asset.map(Asset::from),
            chain: chain.map(Asset::from),
            opponent: opponent.map(User::from),
            fiat: Fiat::from(fiat),
        })
    }

    /// One page of history under `currency`
    pub async fn find_page<C: ConnectionTrait>(
        db: &C,
        currency: &str,
        filter: &SnapshotFilter,
        cursor: Option<&str>,
        limit: u64,
    ) -> Result<Vec<SnapshotView>, DbError> {
        let select = Self::statement(currency, filter, cursor, limit);
        let rows = db
            .query_all(db.get_database_backend().build(&select))
            .await?;
        rows.iter().map(Self::map_row).collect()
    }

    pub async fn find_one<C: ConnectionTrait>(
        db: &C,
        currency: &str,
        snapshot_id: &str,
    ) -> Result<Option<SnapshotView>, DbError> {
        let filter = SnapshotFilter {
            snapshot_id: Some(snapshot_id.to_string()),
            ..Default::default()
        };
        Ok(Self::find_page(db, currency, &filter, None, 1)
            .await?
            .into_iter()
            .next())
    }
}
