use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::{DaoLayerError, DaoResult};
use crate::auth::token::generate_login_token;
use crate::db::entities::{
    permission, prelude::*, user, user_info, user_permission,
};

/// A user row together with its profile and flattened permission ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: user::Model,
    pub info: Option<user_info::Model>,
    pub permissions: Vec<i32>,
}

impl UserRecord {
    pub fn has_admin_permission(&self) -> bool {
        self.permissions
            .iter()
            .any(|id| *id == permission::ADMIN || *id == permission::SUPER_ADMIN)
    }
}

/// Substring filters for the listing endpoint. Every field is optional;
/// absent fields do not constrain the query.
#[derive(Debug, Default, Clone)]
pub struct UserSearchFilter {
    pub name: Option<String>,
    pub address: Option<String>,
    pub username: Option<String>,
    pub permission: Option<String>,
    pub phone_number: Option<String>,
}

/// Input for the single create path shared by signup and guest
/// registration. Guests leave username/password_hash unset.
#[derive(Debug, Default, Clone)]
pub struct NewAccount {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

/// Present fields overwrite, absent fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct InfoPatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

// The connection is shared behind an Arc; DatabaseConnection itself is
// not cloneable when the mock backend is compiled in.
#[derive(Clone)]
pub struct UserDao {
    db: Arc<DatabaseConnection>,
}

impl UserDao {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<Option<user::Model>> {
        let user = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;
        Ok(user)
    }

    /// Full record for the password strategy: profile and permissions
    /// included.
    pub async fn load_by_username(&self, username: &str) -> DaoResult<Option<UserRecord>> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };
        let record = self.hydrate(user, true).await?;
        Ok(Some(record))
    }

    /// Record for the bearer strategy: looked up by the token-embedded id.
    pub async fn load_by_id(&self, id: i32) -> DaoResult<Option<UserRecord>> {
        let Some(user) = User::find_by_id(id).one(self.db.as_ref()).await? else {
            return Ok(None);
        };
        let record = self.hydrate(user, true).await?;
        Ok(Some(record))
    }

    /// Exact `(id, token)` match for the guest strategy. Permissions are
    /// not loaded; guests hold none.
    pub async fn load_by_id_and_token(
        &self,
        id: i32,
        token: &str,
    ) -> DaoResult<Option<UserRecord>> {
        let Some(user) = User::find()
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };
        let record = self.hydrate(user, false).await?;
        Ok(Some(record))
    }

    /// Public get-by-id: the profile must exist and not be soft-deleted.
    pub async fn get_active(&self, id: i32) -> DaoResult<Option<UserRecord>> {
        let Some(user) = User::find_by_id(id).one(self.db.as_ref()).await? else {
            return Ok(None);
        };
        let record = self.hydrate(user, true).await?;
        match record.info {
            Some(ref info) if !info.is_deleted => Ok(Some(record)),
            _ => Ok(None),
        }
    }

    pub async fn search(
        &self,
        filter: &UserSearchFilter,
        offset: u64,
        limit: u64,
    ) -> DaoResult<Vec<UserRecord>> {
        let users = Self::filtered(filter)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        let mut records = Vec::with_capacity(users.len());
        for user in users {
            records.push(self.hydrate(user, true).await?);
        }
        Ok(records)
    }

    pub async fn count(&self, filter: &UserSearchFilter) -> DaoResult<u64> {
        let total = Self::filtered(filter).count(self.db.as_ref()).await?;
        Ok(total)
    }

    fn filtered(filter: &UserSearchFilter) -> sea_orm::Select<User> {
        let mut query = User::find()
            .join(JoinType::LeftJoin, user::Relation::UserInfo.def())
            .join_rev(JoinType::LeftJoin, user_permission::Relation::User.def())
            .join(JoinType::LeftJoin, user_permission::Relation::Permission.def())
            .filter(user_info::Column::IsDeleted.eq(false))
            .distinct();

        if let Some(name) = filter.name.as_deref() {
            query = query.filter(user_info::Column::Name.contains(name));
        }
        if let Some(address) = filter.address.as_deref() {
            query = query.filter(user_info::Column::Address.contains(address));
        }
        if let Some(username) = filter.username.as_deref() {
            query = query.filter(user::Column::Username.contains(username));
        }
        if let Some(permission) = filter.permission.as_deref() {
            query = query.filter(permission::Column::Id.like(format!("%{permission}%")));
        }
        if let Some(phone) = filter.phone_number.as_deref() {
            query = query.filter(user_info::Column::PhoneNumber.contains(phone));
        }
        query
    }

    /// Creates the user row and its profile row in one transaction. The
    /// rotating token is generated here; the password digest (if any) is
    /// computed by the caller before this point.
    pub async fn create_account(&self, new: NewAccount) -> DaoResult<UserRecord> {
        let txn = self.db.begin().await?;

        let user = user::ActiveModel {
            username: Set(new.username),
            password: Set(new.password_hash),
            token: Set(generate_login_token()),
            enable: Set(true),
            created_by: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let info = user_info::ActiveModel {
            id: Set(user.id),
            name: Set(new.name),
            phone_number: Set(new.phone_number),
            address: Set(new.address),
            avatar_url: Set(new.avatar_url),
            expert_id: Set(None),
            city: Set(None),
            is_deleted: Set(false),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(UserRecord {
            user,
            info: Some(info),
            permissions: Vec::new(),
        })
    }

    pub async fn update_info(&self, id: i32, patch: InfoPatch) -> DaoResult<user_info::Model> {
        let info = UserInfo::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(DaoLayerError::NotFound {
                entity: "user_info",
                id,
            })?;

        let mut active: user_info::ActiveModel = info.into();
        if let Some(name) = patch.name {
            active.name = Set(Some(name));
        }
        if let Some(phone) = patch.phone_number {
            active.phone_number = Set(Some(phone));
        }
        if let Some(address) = patch.address {
            active.address = Set(Some(address));
        }
        if let Some(avatar_url) = patch.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }

        let info = active.update(self.db.as_ref()).await?;
        Ok(info)
    }

    /// Stores a fresh digest and rotates the guest token; the token
    /// changes on every write to the user row.
    pub async fn update_password(&self, id: i32, password_hash: &str) -> DaoResult<user::Model> {
        let user = User::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(DaoLayerError::NotFound { entity: "user", id })?;

        let mut active: user::ActiveModel = user.into();
        active.password = Set(Some(password_hash.to_string()));
        active.token = Set(generate_login_token());

        let user = active.update(self.db.as_ref()).await?;
        Ok(user)
    }

    async fn hydrate(&self, user: user::Model, with_permissions: bool) -> DaoResult<UserRecord> {
        let info = UserInfo::find_by_id(user.id).one(self.db.as_ref()).await?;

        let permissions = if with_permissions {
            UserPermission::find()
                .filter(user_permission::Column::UserId.eq(user.id))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|link| link.permission_id)
                .collect()
        } else {
            Vec::new()
        };

        Ok(UserRecord {
            user,
            info,
            permissions,
        })
    }
}
