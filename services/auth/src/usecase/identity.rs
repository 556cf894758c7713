use anyhow::anyhow;
use uuid::Uuid;

use homerent_domain::contact::Email;
use homerent_domain::user::AuthMethod;

use crate::domain::repository::{IdentityRepository, UserRepository};
use crate::domain::types::{FederatedLink, IdentityAssertion, NewUser, Timestamps, UserRecord};
use crate::error::AuthServiceError;
use crate::usecase::password::{hash_password, random_password};

/// Outcome of resolving a provider assertion to a local account.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub user: UserRecord,
    pub created: bool,
}

/// Maps a provider assertion onto a local account, email first.
///
/// 1. An account with the asserted email is used, unless it already holds a different
///    subject for this provider (or holds none and `link_by_email` is off).
/// 2. Otherwise the account already linked to `(provider, subject)` is used.
/// 3. Otherwise a social account is created together with its link.
pub struct ResolveIdentityUseCase<U, I>
where
    U: UserRepository,
    I: IdentityRepository,
{
    pub users: U,
    pub identities: I,
    pub link_by_email: bool,
}

impl<U, I> ResolveIdentityUseCase<U, I>
where
    U: UserRepository,
    I: IdentityRepository,
{
    pub async fn execute(
        &self,
        assertion: IdentityAssertion,
    ) -> Result<Resolution, AuthServiceError> {
        let provider = assertion.provider;
        let email = assertion
            .email
            .as_deref()
            .and_then(|e| Email::parse(e).ok())
            .ok_or_else(|| {
                tracing::warn!(provider = %provider, "provider assertion has no usable email");
                AuthServiceError::AuthenticationFailed
            })?;

        if let Some(user) = self.users.find_by_email(&email).await? {
            match self.identities.find_for_user(user.id, provider).await? {
                Some(link) if link.subject != assertion.subject => {
                    return Err(AuthServiceError::AccountConflict(provider));
                }
                Some(_) => {}
                None if !self.link_by_email => {
                    return Err(AuthServiceError::AccountConflict(provider));
                }
                None => {
                    self.identities
                        .attach(&FederatedLink::new(user.id, provider, &assertion.subject))
                        .await?;
                    tracing::info!(user_id = %user.id, provider = %provider, "linked provider identity");
                }
            }
            return Ok(Resolution {
                user,
                created: false,
            });
        }

        if let Some(link) = self
            .identities
            .find_by_subject(provider, &assertion.subject)
            .await?
        {
            let user = self
                .users
                .find_by_id(link.user_id)
                .await?
                .ok_or_else(|| anyhow!("federated identity {} points at a missing user", link.id))?;
            return Ok(Resolution {
                user,
                created: false,
            });
        }

        let name = assertion
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.local_part())
            .to_owned();
        let user = NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name,
            password_hash: hash_password(&random_password())?,
            method: AuthMethod::Social,
            timestamps: Timestamps::now(),
        };
        let link = FederatedLink::new(user.id, provider, &assertion.subject);
        let user = self.identities.create_account_with_link(&user, &link).await?;
        tracing::info!(user_id = %user.id, provider = %provider, "created account from provider identity");

        Ok(Resolution {
            user,
            created: true,
        })
    }
}
