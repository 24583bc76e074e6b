//! Login credentials checked on every request.
//!
//! The first request of a username registers its password; every later
//! request must present the same one. Only a salted SHA-256 digest is stored.

use sea_orm::{ActiveValue, ConnectionTrait, entity::prelude::*, sea_query::OnConflict};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "credentials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub salt: String,
    pub password_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn digest_bytes(salt: &str, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn digest(salt: &str, password: &str) -> String {
    hex::encode(digest_bytes(salt, password))
}

impl Model {
    /// Constant-time comparison of the stored digest with the digest of
    /// `password`. A stored hash that is not valid hex never matches.
    fn matches(&self, password: &str) -> bool {
        let Ok(stored) = hex::decode(&self.password_hash) else {
            return false;
        };
        let candidate = digest_bytes(&self.salt, password);
        bool::from(stored.as_slice().ct_eq(candidate.as_slice()))
    }
}

/// Check `password` against the stored credential of `username`, registering
/// it when the username is new.
///
/// Two first requests racing on the same username both end up checked
/// against whichever registration won the insert.
pub async fn verify_or_register<C>(db: &C, username: &str, password: &str) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(stored) = Entity::find_by_id(username.to_string()).one(db).await? {
        return Ok(stored.matches(password));
    }

    let salt = Uuid::new_v4().to_string();
    let fresh = ActiveModel {
        username: ActiveValue::Set(username.to_string()),
        password_hash: ActiveValue::Set(digest(&salt, password)),
        salt: ActiveValue::Set(salt),
    };
    let inserted = Entity::insert(fresh)
        .on_conflict(OnConflict::column(Column::Username).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    if inserted > 0 {
        tracing::info!(username, "credentials registered");
    }

    let stored = Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(username.to_string()))?;
    Ok(stored.matches(password))
}
