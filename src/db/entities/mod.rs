#[allow(unused_imports)]
pub mod prelude {
    pub use super::permission::Entity as Permission;
    pub use super::user::Entity as User;
    pub use super::user_info::Entity as UserInfo;
    pub use super::user_permission::Entity as UserPermission;
}

pub mod permission;
pub mod user;
pub mod user_info;
pub mod user_permission;
