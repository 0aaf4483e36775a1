mod context;
mod user_service;

pub use context::ServiceContext;
pub use user_service::{
    ChangePasswordInput, GuestInput, ProfilePatch, SearchOutcome, SignupInput, UserService,
};
