use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionError,
    TransactionTrait, sea_query::SimpleExpr,
};
use uuid::Uuid;

use homerent_auth_schema::{federated_identities, otp_challenges, users};
use homerent_domain::contact::{Email, PhoneNumber};
use homerent_domain::user::{AuthMethod, Provider};

use crate::domain::repository::{IdentityRepository, OtpRepository, UserRepository};
use crate::domain::types::{
    FederatedLink, NewUser, OtpChallenge, OtpChannel, Timestamps, UserRecord,
};
use crate::error::AuthServiceError;

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord, AuthServiceError> {
        insert_user(&self.db, user).await.map_err(|e| {
            if is_unique_violation(&e) {
                AuthServiceError::EmailTaken
            } else {
                anyhow::Error::new(e).context("create user").into()
            }
        })?;
        Ok(user.clone().into_record())
    }

    async fn phone_verified_elsewhere(
        &self,
        phone: &PhoneNumber,
        user_id: Uuid,
    ) -> Result<bool, AuthServiceError> {
        let count = users::Entity::find()
            .filter(users::Column::PhonePrefix.eq(phone.prefix()))
            .filter(users::Column::PhoneNumber.eq(phone.number()))
            .filter(users::Column::PhoneVerified.eq(true))
            .filter(users::Column::Id.ne(user_id))
            .count(&self.db)
            .await
            .context("count verified phone owners")?;
        Ok(count > 0)
    }

    async fn set_pending_phone(
        &self,
        user_id: Uuid,
        phone: Option<&PhoneNumber>,
    ) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user_id),
            phone_prefix: Set(phone.map(|p| p.prefix().to_owned())),
            phone_number: Set(phone.map(|p| p.number().to_owned())),
            phone_verified: Set(false),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set pending phone")?;
        Ok(())
    }

    async fn mark_phone_verified(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user_id),
            phone_verified: Set(true),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark phone verified")?;
        Ok(())
    }
}

async fn insert_user<C: ConnectionTrait>(conn: &C, user: &NewUser) -> Result<(), DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        name: Set(user.name.clone()),
        password_hash: Set(Some(user.password_hash.clone())),
        method: Set(user.method.as_str().to_owned()),
        phone_prefix: Set(None),
        phone_number: Set(None),
        phone_verified: Set(false),
        created_at: Set(user.timestamps.created_at),
        updated_at: Set(user.timestamps.updated_at),
    }
    .insert(conn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> anyhow::Result<UserRecord> {
    let method = model
        .method
        .parse::<AuthMethod>()
        .with_context(|| format!("user {} has an unknown auth method", model.id))?;
    let phone = match (model.phone_prefix.as_deref(), model.phone_number.as_deref()) {
        (Some(prefix), Some(number)) => Some(
            PhoneNumber::parse(prefix, number)
                .with_context(|| format!("user {} has a malformed phone", model.id))?,
        ),
        _ => None,
    };
    Ok(UserRecord {
        id: model.id,
        email: model.email,
        name: model.name,
        password_hash: model.password_hash,
        method,
        phone,
        phone_verified: model.phone_verified,
        timestamps: Timestamps {
            created_at: model.created_at,
            updated_at: model.updated_at,
        },
    })
}

// ── Federated identity repository ────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIdentityRepository {
    pub db: DatabaseConnection,
}

impl IdentityRepository for DbIdentityRepository {
    async fn find_by_subject(
        &self,
        provider: Provider,
        subject: &str,
    ) -> Result<Option<FederatedLink>, AuthServiceError> {
        let model = federated_identities::Entity::find()
            .filter(federated_identities::Column::Provider.eq(provider.as_str()))
            .filter(federated_identities::Column::ProviderSubject.eq(subject))
            .one(&self.db)
            .await
            .context("find federated identity by subject")?;
        Ok(model.map(link_from_model).transpose()?)
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<FederatedLink>, AuthServiceError> {
        let model = federated_identities::Entity::find()
            .filter(federated_identities::Column::UserId.eq(user_id))
            .filter(federated_identities::Column::Provider.eq(provider.as_str()))
            .one(&self.db)
            .await
            .context("find federated identity for user")?;
        Ok(model.map(link_from_model).transpose()?)
    }

    async fn attach(&self, link: &FederatedLink) -> Result<(), AuthServiceError> {
        insert_link(&self.db, link).await.map_err(|e| {
            if is_unique_violation(&e) {
                AuthServiceError::AccountConflict(link.provider)
            } else {
                anyhow::Error::new(e).context("attach federated identity").into()
            }
        })
    }

    async fn create_account_with_link(
        &self,
        user: &NewUser,
        link: &FederatedLink,
    ) -> Result<UserRecord, AuthServiceError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let user = user.clone();
                let link = link.clone();
                Box::pin(async move {
                    insert_user(txn, &user).await?;
                    insert_link(txn, &link).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(user.clone().into_record()),
            // Lost a race for the email or the subject.
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                Err(AuthServiceError::AccountConflict(link.provider))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("create account with federated identity")
                .into()),
        }
    }
}

async fn insert_link<C: ConnectionTrait>(conn: &C, link: &FederatedLink) -> Result<(), DbErr> {
    federated_identities::ActiveModel {
        id: Set(link.id),
        user_id: Set(link.user_id),
        provider: Set(link.provider.as_str().to_owned()),
        provider_subject: Set(link.subject.clone()),
        created_at: Set(link.created_at),
    }
    .insert(conn)
    .await?;
    Ok(())
}

fn link_from_model(model: federated_identities::Model) -> anyhow::Result<FederatedLink> {
    let provider = model
        .provider
        .parse::<Provider>()
        .with_context(|| format!("federated identity {} has an unknown provider", model.id))?;
    Ok(FederatedLink {
        id: model.id,
        user_id: model.user_id,
        provider,
        subject: model.provider_subject,
        created_at: model.created_at,
    })
}

// ── OTP repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn latest(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
    ) -> Result<Option<OtpChallenge>, AuthServiceError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::Channel.eq(channel.as_str()))
            .filter(otp_challenges::Column::Subject.eq(subject))
            .filter(owned_by(owner))
            .order_by_desc(otp_challenges::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp challenge")?;
        Ok(model.map(|m| challenge_from_model(m, channel)))
    }

    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let challenge = challenge.clone();
                Box::pin(async move {
                    otp_challenges::Entity::delete_many()
                        .filter(otp_challenges::Column::Channel.eq(challenge.channel.as_str()))
                        .filter(otp_challenges::Column::Subject.eq(challenge.subject.as_str()))
                        .filter(owned_by(challenge.user_id))
                        .exec(txn)
                        .await?;
                    otp_challenges::ActiveModel {
                        id: Set(challenge.id),
                        channel: Set(challenge.channel.as_str().to_owned()),
                        subject: Set(challenge.subject.clone()),
                        user_id: Set(challenge.user_id),
                        code: Set(challenge.code.clone()),
                        expires_at: Set(challenge.expires_at),
                        created_at: Set(challenge.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace otp challenge")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let result = otp_challenges::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete otp challenge")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_for_subject(
        &self,
        channel: OtpChannel,
        subject: &str,
        owner: Option<Uuid>,
    ) -> Result<(), AuthServiceError> {
        otp_challenges::Entity::delete_many()
            .filter(otp_challenges::Column::Channel.eq(channel.as_str()))
            .filter(otp_challenges::Column::Subject.eq(subject))
            .filter(owned_by(owner))
            .exec(&self.db)
            .await
            .context("delete otp challenges for subject")?;
        Ok(())
    }
}

fn owned_by(owner: Option<Uuid>) -> SimpleExpr {
    match owner {
        Some(user_id) => otp_challenges::Column::UserId.eq(user_id),
        None => otp_challenges::Column::UserId.is_null(),
    }
}

fn challenge_from_model(model: otp_challenges::Model, channel: OtpChannel) -> OtpChallenge {
    OtpChallenge {
        id: model.id,
        channel,
        subject: model.subject,
        user_id: model.user_id,
        code: model.code,
        expires_at: model.expires_at,
        created_at: model.created_at,
    }
}
