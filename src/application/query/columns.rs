use sea_orm::sea_query::{Alias, Expr, Func, SelectStatement, SimpleExpr};
use sea_orm::{ColumnTrait, EntityTrait, IdenStatic, Iterable};

pub(crate) const ASSET: &str = "asset";
pub(crate) const CHAIN: &str = "chain";
pub(crate) const EXTRA: &str = "extra";
pub(crate) const FIAT: &str = "fiat";
pub(crate) const SNAPSHOT: &str = "snapshot";
pub(crate) const OPPONENT: &str = "opponent";

/// Result column prefix for a table alias, e.g. `chain_`
pub(crate) fn prefix(table: &str) -> String {
    format!("{}_", table)
}

/// Select every column of `E` under `table`, aliased as `{table}_{column}`
pub(crate) fn select_prefixed<E: EntityTrait>(select: &mut SelectStatement, table: &str) {
    for column in E::Column::iter() {
        select.expr_as(
            Expr::col((Alias::new(table), column)),
            Alias::new(format!("{}_{}", table, column.as_str())),
        );
    }
}

/// `CAST(table.column AS REAL)`; amounts are stored as decimal text
pub(crate) fn numeric<C: ColumnTrait>(table: &str, column: C) -> SimpleExpr {
    Func::cast_as(Expr::col((Alias::new(table), column)), Alias::new("REAL")).into()
}
