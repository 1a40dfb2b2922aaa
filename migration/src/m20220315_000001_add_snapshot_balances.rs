use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite only allows one column per ALTER TABLE
        if !manager.has_column("snapshot", "opening_balance").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Snapshot::Table)
                        .add_column(ColumnDef::new(Snapshot::OpeningBalance).string().null())
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("snapshot", "closing_balance").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Snapshot::Table)
                        .add_column(ColumnDef::new(Snapshot::ClosingBalance).string().null())
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("snapshot", "confirmations").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Snapshot::Table)
                        .add_column(ColumnDef::new(Snapshot::Confirmations).integer().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in [
            Snapshot::Confirmations,
            Snapshot::ClosingBalance,
            Snapshot::OpeningBalance,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Snapshot::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum Snapshot {
    Table,
    OpeningBalance,
    ClosingBalance,
    Confirmations,
}
