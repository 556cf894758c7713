use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FederatedIdentities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FederatedIdentities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FederatedIdentities::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(FederatedIdentities::Provider)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FederatedIdentities::ProviderSubject)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FederatedIdentities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FederatedIdentities::Table, FederatedIdentities::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A provider subject belongs to at most one account.
        manager
            .create_index(
                Index::create()
                    .table(FederatedIdentities::Table)
                    .col(FederatedIdentities::Provider)
                    .col(FederatedIdentities::ProviderSubject)
                    .name("uq_federated_identities_provider_subject")
                    .unique()
                    .to_owned(),
            )
            .await?;

        // An account holds at most one link per provider.
        manager
            .create_index(
                Index::create()
                    .table(FederatedIdentities::Table)
                    .col(FederatedIdentities::UserId)
                    .col(FederatedIdentities::Provider)
                    .name("uq_federated_identities_user_provider")
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FederatedIdentities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FederatedIdentities {
    Table,
    Id,
    UserId,
    Provider,
    ProviderSubject,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
