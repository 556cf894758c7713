use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpChallenges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpChallenges::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpChallenges::Channel).string_len(8).not_null())
                    .col(ColumnDef::new(OtpChallenges::Subject).string().not_null())
                    .col(ColumnDef::new(OtpChallenges::UserId).uuid())
                    .col(ColumnDef::new(OtpChallenges::Code).string_len(8).not_null())
                    .col(
                        ColumnDef::new(OtpChallenges::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpChallenges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpChallenges::Table, OtpChallenges::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: concurrent issuance may briefly leave two rows; the newest wins.
        manager
            .create_index(
                Index::create()
                    .table(OtpChallenges::Table)
                    .col(OtpChallenges::Channel)
                    .col(OtpChallenges::Subject)
                    .col(OtpChallenges::UserId)
                    .col(OtpChallenges::CreatedAt)
                    .name("idx_otp_challenges_subject_owner_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpChallenges::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpChallenges {
    Table,
    Id,
    Channel,
    Subject,
    UserId,
    Code,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
