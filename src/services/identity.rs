//! Identity resolution service
//!
//! Maps a platform-specific identity (Telegram chat id or WhatsApp phone
//! number) to an internal user account, and binds identities to accounts in
//! the two-step connect flow: account creation happens out-of-band on the
//! web, platform connection happens via chat.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::repositories::UserRepository;
use crate::models::reminder::Platform;
use crate::models::user::User;
use crate::utils::errors::{RemindrError, Result};
use crate::utils::helpers::normalize_phone;

/// A platform identity, normalized at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformIdentity {
    Telegram { chat_id: String },
    Whatsapp { phone: String },
}

impl PlatformIdentity {
    /// Build an identity for the given platform, stripping all non-digit
    /// characters from WhatsApp phone numbers.
    pub fn new(platform: Platform, identity: &str) -> Self {
        match platform {
            Platform::Telegram => PlatformIdentity::Telegram {
                chat_id: identity.to_string(),
            },
            Platform::Whatsapp => PlatformIdentity::Whatsapp {
                phone: normalize_phone(identity),
            },
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            PlatformIdentity::Telegram { .. } => Platform::Telegram,
            PlatformIdentity::Whatsapp { .. } => Platform::Whatsapp,
        }
    }

    /// The normalized identity value
    pub fn value(&self) -> &str {
        match self {
            PlatformIdentity::Telegram { chat_id } => chat_id,
            PlatformIdentity::Whatsapp { phone } => phone,
        }
    }
}

/// Outcome of a connect attempt. "Already connected" is a success, not an
/// error, so repeated connect attempts stay harmless.
#[derive(Debug, Clone)]
pub enum ConnectOutcome {
    Connected(User),
    AlreadyConnected { user_id: Uuid },
    SignupRequired,
}

/// Identity resolution service
#[derive(Debug, Clone)]
pub struct IdentityService {
    users: UserRepository,
}

impl IdentityService {
    /// Create a new IdentityService instance
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Resolve a platform identity to its bound user, if any
    pub async fn resolve(&self, identity: &PlatformIdentity) -> Result<Option<User>> {
        match identity {
            PlatformIdentity::Telegram { chat_id } => {
                self.users.find_by_telegram_chat_id(chat_id).await
            }
            PlatformIdentity::Whatsapp { phone } => {
                self.users.find_by_whatsapp_phone(phone).await
            }
        }
    }

    /// Resolve a platform identity, erroring with `UserNotConnected` when no
    /// binding exists. Chat flows branch on this to prompt for connection.
    pub async fn resolve_required(&self, identity: &PlatformIdentity) -> Result<User> {
        self.resolve(identity)
            .await?
            .ok_or(RemindrError::UserNotConnected)
    }

    /// Look up a user by internal id, erroring when absent
    pub async fn find_user(&self, user_id: Uuid) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(RemindrError::UserNotFound { user_id })
    }

    /// Bind a platform identity to an account.
    ///
    /// Idempotent: an identity that is already bound (to any account)
    /// returns `AlreadyConnected` with the owning user's id. Without a
    /// target user there is nothing to bind to, so the caller is told to
    /// sign up on the web first.
    pub async fn connect(
        &self,
        identity: &PlatformIdentity,
        target_user: Option<Uuid>,
    ) -> Result<ConnectOutcome> {
        if let Some(existing) = self.resolve(identity).await? {
            debug!(
                user_id = %existing.id,
                platform = %identity.platform(),
                "Identity already bound"
            );
            return Ok(ConnectOutcome::AlreadyConnected {
                user_id: existing.id,
            });
        }

        let Some(user_id) = target_user else {
            return Ok(ConnectOutcome::SignupRequired);
        };

        let bound = match identity {
            PlatformIdentity::Telegram { chat_id } => {
                self.users.bind_telegram(user_id, chat_id).await
            }
            PlatformIdentity::Whatsapp { phone } => {
                self.users.bind_whatsapp(user_id, phone).await
            }
        };

        match bound {
            Ok(Some(user)) => {
                info!(
                    user_id = %user.id,
                    platform = %identity.platform(),
                    "Platform identity connected"
                );
                Ok(ConnectOutcome::Connected(user))
            }
            Ok(None) => Err(RemindrError::UserNotFound { user_id }),
            // A concurrent connect of the same identity trips the unique
            // index; report the winner's binding instead of failing.
            Err(RemindrError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                warn!(
                    platform = %identity.platform(),
                    "Concurrent connect raced on identity uniqueness"
                );
                match self.resolve(identity).await? {
                    Some(existing) => Ok(ConnectOutcome::AlreadyConnected {
                        user_id: existing.id,
                    }),
                    None => Err(RemindrError::Database(sqlx::Error::Database(db_err))),
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_identity_is_normalized() {
        let identity = PlatformIdentity::new(Platform::Whatsapp, "+91 98765-43210");
        assert_eq!(identity.value(), "919876543210");
        assert_eq!(identity.platform(), Platform::Whatsapp);
    }

    #[test]
    fn test_telegram_identity_is_kept_verbatim() {
        let identity = PlatformIdentity::new(Platform::Telegram, "123456789");
        assert_eq!(identity.value(), "123456789");
        assert_eq!(identity.platform(), Platform::Telegram);
    }

    #[test]
    fn test_equal_identities_compare_equal_after_normalization() {
        let a = PlatformIdentity::new(Platform::Whatsapp, "+1 (555) 123-4567");
        let b = PlatformIdentity::new(Platform::Whatsapp, "15551234567");
        assert_eq!(a, b);
    }
}
