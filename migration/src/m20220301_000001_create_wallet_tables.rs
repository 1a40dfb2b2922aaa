use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_table("asset").await? {
            manager
                .create_table(
                    Table::create()
                        .table(Asset::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Asset::AssetId)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Asset::ChainId).string().not_null())
                        .col(ColumnDef::new(Asset::AssetKey).string().null())
                        .col(ColumnDef::new(Asset::MixinId).string().null())
                        .col(ColumnDef::new(Asset::Symbol).string().not_null())
                        .col(ColumnDef::new(Asset::Name).string().not_null())
                        .col(ColumnDef::new(Asset::IconUrl).string().not_null().default(""))
                        .col(ColumnDef::new(Asset::PriceBtc).string().not_null().default("0"))
                        .col(ColumnDef::new(Asset::ChangeBtc).string().not_null().default("0"))
                        .col(ColumnDef::new(Asset::PriceUsd).string().not_null().default("0"))
                        .col(ColumnDef::new(Asset::ChangeUsd).string().not_null().default("0"))
                        .col(ColumnDef::new(Asset::Balance).string().not_null().default("0"))
                        .col(ColumnDef::new(Asset::Destination).string().not_null().default(""))
                        .col(ColumnDef::new(Asset::Tag).string().not_null().default(""))
                        .col(
                            ColumnDef::new(Asset::Confirmations)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Asset::Reserve).string().null())
                        .to_owned(),
                )
                .await?;

            // Chain self-join and the value/price sorts
            manager
                .create_index(
                    Index::create()
                        .name("asset_chain_id")
                        .table(Asset::Table)
                        .col(Asset::ChainId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("asset_balance_price_usd")
                        .table(Asset::Table)
                        .col(Asset::Balance)
                        .col(Asset::PriceUsd)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("asset_price_usd")
                        .table(Asset::Table)
                        .col(Asset::PriceUsd)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("asset_extra").await? {
            manager
                .create_table(
                    Table::create()
                        .table(AssetExtra::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssetExtra::AssetId)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(AssetExtra::Hidden)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("fiat").await? {
            manager
                .create_table(
                    Table::create()
                        .table(Fiat::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Fiat::Code).string().not_null().primary_key())
                        .col(ColumnDef::new(Fiat::Rate).string().not_null())
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("snapshot").await? {
            manager
                .create_table(
                    Table::create()
                        .table(Snapshot::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Snapshot::SnapshotId)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Snapshot::Type).string().not_null())
                        .col(ColumnDef::new(Snapshot::AssetId).string().not_null())
                        .col(ColumnDef::new(Snapshot::OpponentId).string().null())
                        .col(ColumnDef::new(Snapshot::UserId).string().null())
                        .col(ColumnDef::new(Snapshot::Amount).string().not_null())
                        .col(ColumnDef::new(Snapshot::CreatedAt).string().not_null())
                        .col(ColumnDef::new(Snapshot::Memo).string().not_null().default(""))
                        .col(ColumnDef::new(Snapshot::TraceId).string().not_null().default(""))
                        .col(ColumnDef::new(Snapshot::Sender).string().null())
                        .col(ColumnDef::new(Snapshot::Receiver).string().null())
                        .col(ColumnDef::new(Snapshot::TransactionHash).string().null())
                        .to_owned(),
                )
                .await?;

            // Per-asset history pages walk (asset_id, created_at DESC)
            manager
                .create_index(
                    Index::create()
                        .name("snapshot_asset_created_at")
                        .table(Snapshot::Table)
                        .col(Snapshot::AssetId)
                        .col(Snapshot::CreatedAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("snapshot_opponent_id")
                        .table(Snapshot::Table)
                        .col(Snapshot::OpponentId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("snapshot_created_at")
                        .table(Snapshot::Table)
                        .col(Snapshot::CreatedAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("user").await? {
            manager
                .create_table(
                    Table::create()
                        .table(User::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(User::UserId).string().not_null().primary_key())
                        .col(
                            ColumnDef::new(User::IdentityNumber)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(User::FullName).string().not_null().default(""))
                        .col(ColumnDef::new(User::AvatarUrl).string().not_null().default(""))
                        .col(ColumnDef::new(User::Biography).string().not_null().default(""))
                        .col(
                            ColumnDef::new(User::Relationship)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(User::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(User::CreatedAt).string().not_null().default(""))
                        .col(ColumnDef::new(User::FiatCurrency).string().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Snapshot::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Fiat::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AssetExtra::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Asset::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Asset {
    Table,
    AssetId,
    ChainId,
    AssetKey,
    MixinId,
    Symbol,
    Name,
    IconUrl,
    PriceBtc,
    ChangeBtc,
    PriceUsd,
    ChangeUsd,
    Balance,
    Destination,
    Tag,
    Confirmations,
    Reserve,
}

#[derive(Iden)]
enum AssetExtra {
    Table,
    AssetId,
    Hidden,
}

#[derive(Iden)]
enum Fiat {
    Table,
    Code,
    Rate,
}

#[derive(Iden)]
enum Snapshot {
    Table,
    SnapshotId,
    Type,
    AssetId,
    OpponentId,
    UserId,
    Amount,
    CreatedAt,
    Memo,
    TraceId,
    Sender,
    Receiver,
    TransactionHash,
}

#[derive(Iden)]
enum User {
    Table,
    UserId,
    IdentityNumber,
    FullName,
    AvatarUrl,
    Biography,
    Relationship,
    IsVerified,
    CreatedAt,
    FiatCurrency,
}
