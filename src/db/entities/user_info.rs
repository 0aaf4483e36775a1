use sea_orm::entity::prelude::*;

/// Profile row, 1:1 with `t_user` sharing the primary key value. Soft
/// deletion lives here, not on the user row.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "t_user_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(nullable)]
    pub name: Option<String>,
    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(column_name = "expert_id", nullable)]
    pub expert_id: Option<String>,
    #[sea_orm(column_name = "phone_number", nullable)]
    pub phone_number: Option<String>,
    #[sea_orm(column_name = "avatar_url", nullable)]
    pub avatar_url: Option<String>,
    #[sea_orm(nullable)]
    pub city: Option<String>,
    #[sea_orm(column_name = "is_deleted")]
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Id",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
