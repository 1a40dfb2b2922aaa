use sea_orm::sea_query::{
    Alias, Cond, Expr, Func, JoinType, LikeExpr, Order, Query, SelectStatement, SimpleExpr,
};
use sea_orm::{ConnectionTrait, FromQueryResult, QueryResult};

use super::columns::{self, ASSET, CHAIN, EXTRA, FIAT};
use super::{escape_like, LIKE_ESCAPE};
use crate::domain::models::{Asset, AssetView, Fiat};
use crate::infrastructure::persistence::entities::{asset, asset_extra, fiat};
use crate::infrastructure::persistence::error::DbError;

/// Composable asset list filters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetFilter {
    /// Drop assets the user marked hidden
    ExcludeHidden,
    /// Drop assets worth one USD or less
    ExcludeDust,
    Id(String),
    IdIn(Vec<String>),
    /// Case-insensitive substring match on symbol or name
    Text(String),
}

/// Asset list orderings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetSort {
    /// USD value descending, then balance descending
    Amount,
    /// 24h USD change descending
    Increase,
    /// 24h USD change ascending
    Decrease,
    /// Best match for the search text first
    Relevance(String),
    /// Keep the given id order; unknown ids sort last
    Explicit(Vec<String>),
}

/// A typed asset list query. Also the cache key of the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AssetQuery {
    pub filters: Vec<AssetFilter>,
    pub sort: Option<AssetSort>,
    pub limit: Option<u64>,
}

impl AssetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: AssetFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, sort: AssetSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Builds and runs asset view queries
pub struct AssetQueryComposer;

fn like(pattern: String) -> LikeExpr {
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

impl AssetQueryComposer {
    /// Base statement: asset ⟕ chain ⟕ extra ⋈ fiat(currency)
    fn base(currency: &str) -> SelectStatement {
        let mut select = Query::select();
        select.from_as(asset::Entity, Alias::new(ASSET));

        columns::select_prefixed::<asset::Entity>(&mut select, ASSET);
        columns::select_prefixed::<asset::Entity>(&mut select, CHAIN);
        columns::select_prefixed::<asset_extra::Entity>(&mut select, EXTRA);
        columns::select_prefixed::<fiat::Entity>(&mut select, FIAT);

        select
            .join_as(
                JoinType::LeftJoin,
                asset::Entity,
                Alias::new(CHAIN),
                Expr::col((Alias::new(CHAIN), asset::Column::AssetId))
                    .equals((Alias::new(ASSET), asset::Column::ChainId)),
            )
            .join_as(
                JoinType::LeftJoin,
                asset_extra::Entity,
                Alias::new(EXTRA),
                Expr::col((Alias::new(EXTRA), asset_extra::Column::AssetId))
                    .equals((Alias::new(ASSET), asset::Column::AssetId)),
            )
            .join_as(
                JoinType::InnerJoin,
                fiat::Entity,
                Alias::new(FIAT),
                Expr::col((Alias::new(FIAT), fiat::Column::Code)).eq(currency),
            );

        select
    }

    fn value_usd() -> SimpleExpr {
        Expr::expr(columns::numeric(ASSET, asset::Column::Balance))
            .mul(columns::numeric(ASSET, asset::Column::PriceUsd))
    }

    fn apply_filter(select: &mut SelectStatement, filter: &AssetFilter) {
        let col = |c: asset::Column| Expr::col((Alias::new(ASSET), c));

        match filter {
            AssetFilter::ExcludeHidden => {
                let hidden = || Expr::col((Alias::new(EXTRA), asset_extra::Column::Hidden));
                select.cond_where(
                    Cond::any()
                        .add(hidden().is_null())
                        .add(hidden().eq(false)),
                );
            }
            AssetFilter::ExcludeDust => {
                select.and_where(Expr::expr(Self::value_usd()).gt(1));
            }
            AssetFilter::Id(id) => {
                select.and_where(col(asset::Column::AssetId).eq(id.as_str()));
            }
            AssetFilter::IdIn(ids) => {
                select.and_where(col(asset::Column::AssetId).is_in(ids.iter().cloned()));
            }
            AssetFilter::Text(text) => {
                let pattern = format!("%{}%", escape_like(text.trim()));
                select.cond_where(
                    Cond::any()
                        .add(col(asset::Column::Symbol).like(like(pattern.clone())))
                        .add(col(asset::Column::Name).like(like(pattern))),
                );
            }
        }
    }

    fn apply_sort(select: &mut SelectStatement, sort: &AssetSort) {
        match sort {
            AssetSort::Amount => {
                select
                    .order_by_expr(Self::value_usd(), Order::Desc)
                    .order_by_expr(columns::numeric(ASSET, asset::Column::Balance), Order::Desc);
            }
            AssetSort::Increase => {
                select.order_by_expr(
                    columns::numeric(ASSET, asset::Column::ChangeUsd),
                    Order::Desc,
                );
            }
            AssetSort::Decrease => {
                select.order_by_expr(
                    columns::numeric(ASSET, asset::Column::ChangeUsd),
                    Order::Asc,
                );
            }
            AssetSort::Relevance(text) => {
                let text = text.trim();
                let escaped = escape_like(text);
                let col = |c: asset::Column| Expr::col((Alias::new(ASSET), c));
                let len = |c: asset::Column| Expr::expr(Func::char_length(col(c)));
                let symbol = asset::Column::Symbol;
                let name = asset::Column::Name;

                // exact > prefix > substring > suffix, shorter names first within a tier
                let rank = Expr::case(col(symbol).eq(text), 1)
                    .case(col(name).eq(text), 2)
                    .case(col(symbol).like(like(format!("{}%", escaped))), len(symbol).add(100))
                    .case(col(name).like(like(format!("{}%", escaped))), len(name).add(200))
                    .case(col(symbol).like(like(format!("%{}%", escaped))), len(symbol).add(300))
                    .case(col(name).like(like(format!("%{}%", escaped))), len(name).add(400))
                    .case(col(symbol).like(like(format!("%{}", escaped))), len(symbol).add(500))
                    .case(col(name).like(like(format!("%{}", escaped))), len(name).add(600))
                    .finally(1000);

                select
                    .order_by_expr(rank.into(), Order::Asc)
                    .order_by_expr(
                        Expr::expr(columns::numeric(ASSET, asset::Column::PriceUsd)).gt(0),
                        Order::Desc,
                    )
                    .order_by((Alias::new(ASSET), symbol), Order::Asc)
                    .order_by((Alias::new(ASSET), name), Order::Asc);
            }
            AssetSort::Explicit(ids) => {
                if ids.is_empty() {
                    return;
                }
                let mut cases = ids.iter().enumerate();
                if let Some((_, first)) = cases.next() {
                    let id_col = || Expr::col((Alias::new(ASSET), asset::Column::AssetId));
                    let mut case = Expr::case(id_col().eq(first.as_str()), 0i64);
                    for (index, id) in cases {
                        case = case.case(id_col().eq(id.as_str()), index as i64);
                    }
                    select.order_by_expr(case.finally(999_999i64).into(), Order::Asc);
                }
            }
        }
    }

    /// Compile a query into a statement; exposed for inspection in tests
    pub fn statement(currency: &str, query: &AssetQuery) -> SelectStatement {
        let mut select = Self::base(currency);
        for filter in &query.filters {
            Self::apply_filter(&mut select, filter);
        }
        if let Some(sort) = &query.sort {
            Self::apply_sort(&mut select, sort);
        }
        // Stable order among ties
        select.order_by((Alias::new(ASSET), asset::Column::AssetId), Order::Asc);
        if let Some(limit) = query.limit {
            select.limit(limit);
        }
        select
    }

    fn map_row(row: &QueryResult) -> Result<AssetView, DbError> {
        let asset = asset::Model::from_query_result(row, &columns::prefix(ASSET))?;
        let chain = asset::Model::from_query_result_optional(row, &columns::prefix(CHAIN))?;
        let extra = asset_extra::Model::from_query_result_optional(row, &columns::prefix(EXTRA))?;
        let fiat = fiat::Model::from_query_result(row, &columns::prefix(FIAT))?;

        Ok(AssetView {
            asset: Asset::from(asset),
            chain: chain.map(Asset::from),
            hidden: extra.map(|e| e.hidden).unwrap_or(false),
            fiat: Fiat::from(fiat),
        })
    }

    /// Run an asset list query under `currency`
    pub async fn find<C: ConnectionTrait>(
        db: &C,
        currency: &str,
        query: &AssetQuery,
    ) -> Result<Vec<AssetView>, DbError> {
        let select = Self::statement(currency, query);
        let rows = db
            .query_all(db.get_database_backend().build(&select))
            .await?;
        rows.iter().map(Self::map_row).collect()
    }

    /// Single asset view; `None` when unknown or when no rate for `currency` exists
    pub async fn find_one<C: ConnectionTrait>(
        db: &C,
        currency: &str,
        asset_id: &str,
    ) -> Result<Option<AssetView>, DbError> {
        let query = AssetQuery::new()
            .filter(AssetFilter::Id(asset_id.to_string()))
            .limit(1);
        Ok(Self::find(db, currency, &query).await?.into_iter().next())
    }
}
