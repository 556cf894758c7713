use sea_orm::entity::prelude::*;

/// Local account. `password_hash` is always set: social-only accounts hold the hash of a
/// random password nobody knows.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    /// `"email"` or `"social"`.
    pub method: String,
    pub phone_prefix: Option<String>,
    pub phone_number: Option<String>,
    pub phone_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::federated_identities::Entity")]
    FederatedIdentities,
    #[sea_orm(has_many = "super::otp_challenges::Entity")]
    OtpChallenges,
}

impl Related<super::federated_identities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FederatedIdentities.def()
    }
}

impl Related<super::otp_challenges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpChallenges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
