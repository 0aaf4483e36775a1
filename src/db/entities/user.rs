use sea_orm::entity::prelude::*;

/// Account row. A row without username/password is a guest account and
/// authenticates only by `(id, token)`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "t_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, nullable)]
    pub username: Option<String>,
    pub enable: bool,
    /// Argon2 digest, never plaintext. NULL for guests.
    #[sea_orm(nullable)]
    pub password: Option<String>,
    /// Rotating guest token, regenerated on every insert/update.
    pub token: String,
    #[sea_orm(column_name = "created_by", nullable)]
    pub created_by: Option<i32>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_info::Entity")]
    UserInfo,
}

impl Related<super::user_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserInfo.def()
    }
}

impl Related<super::permission::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_permission::Relation::Permission.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_permission::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_guest(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}
