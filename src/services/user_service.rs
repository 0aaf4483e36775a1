use crate::{
    auth::{
        Authenticator, Credentials,
        jwt::{encode_token, make_claims},
        password::hash_password,
    },
    db::dao::{DaoLayerError, InfoPatch, NewAccount, UserDao, UserRecord, UserSearchFilter},
    error::{AppError, FieldError, messages},
};

/// Self-service account creation. `avatar_url` is filled in by the route
/// after the upload, never by the client directly.
#[derive(Debug, Default, Clone)]
pub struct SignupInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub repeat_password: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct GuestInput {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

/// Present fields overwrite; present-but-blank `name`/`phone_number` are
/// rejected before anything touches storage.
#[derive(Debug, Default, Clone)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ChangePasswordInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub new_password: Option<String>,
    pub repeat_new_password: Option<String>,
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub records: Vec<UserRecord>,
    /// `(total_count, page_count)`, present only when the caller asked
    /// for counts.
    pub counts: Option<(u64, u64)>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Clone)]
pub struct UserService {
    dao: UserDao,
    auth: Authenticator,
    token_ttl_secs: usize,
    default_limit: u64,
}

impl UserService {
    pub fn new(
        dao: UserDao,
        auth: Authenticator,
        token_ttl_secs: usize,
        default_limit: u64,
    ) -> Self {
        Self {
            dao,
            auth,
            token_ttl_secs,
            default_limit,
        }
    }

    /// Username/password signup. Succeeds silently; the client logs in
    /// afterwards.
    pub async fn signup(&self, input: SignupInput) -> Result<(), AppError> {
        let (username, password) = match (required(&input.username), required(&input.password)) {
            (Some(username), Some(password)) => (username, password),
            (username, password) => {
                let mut errors = Vec::new();
                if username.is_none() {
                    errors.push(FieldError::new("username", messages::INVALID_INFO));
                }
                if password.is_none() {
                    errors.push(FieldError::new("password", messages::PASSWORD_BLANK));
                }
                return Err(AppError::validation(
                    "signup_error",
                    messages::INVALID_INFO,
                    errors,
                ));
            }
        };

        if input.repeat_password.as_deref() != Some(password) {
            return Err(AppError::validation(
                "confirmation_password",
                messages::PASSWORD_MISMATCH,
                vec![FieldError::new(
                    "repeatPassword",
                    messages::PASSWORD_MISMATCH,
                )],
            ));
        }

        if self.dao.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict("user_existed", messages::USER_EXISTED));
        }

        let password_hash = hash_password(password)?;
        self.dao
            .create_account(NewAccount {
                username: Some(username.to_string()),
                password_hash: Some(password_hash),
                // The profile starts out named after the login; the user
                // renames it later through the profile update.
                name: Some(username.to_string()),
                phone_number: input.phone_number,
                address: input.address,
                avatar_url: input.avatar_url,
            })
            .await
            .map_err(|err| persistence("signup_error", messages::SIGNUP_FAILED, err))?;

        Ok(())
    }

    /// Credential-less registration. The response view is the only place
    /// the rotating token is ever exposed.
    pub async fn register_guest(&self, input: GuestInput) -> Result<UserRecord, AppError> {
        let mut errors = Vec::new();
        if required(&input.name).is_none() {
            errors.push(FieldError::new("name", messages::NAME_REQUIRED));
        }
        if required(&input.phone_number).is_none() {
            errors.push(FieldError::new("phoneNumber", messages::PHONE_REQUIRED));
        }
        if !errors.is_empty() {
            return Err(AppError::validation(
                "create_guest_error",
                messages::INVALID_INFO,
                errors,
            ));
        }

        let record = self
            .dao
            .create_account(NewAccount {
                name: input.name,
                phone_number: input.phone_number,
                address: input.address,
                avatar_url: input.avatar_url,
                ..Default::default()
            })
            .await
            .map_err(|err| persistence("create_guest_error", messages::PERSISTENCE, err))?;

        Ok(record)
    }

    /// Password login for the admin surface. Valid credentials are not
    /// enough: the account must be enabled and hold an admin permission.
    pub async fn login(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<(String, UserRecord), AppError> {
        let (Some(username), Some(password)) = (required(&username), required(&password)) else {
            return Err(bad_login());
        };

        let record = match self
            .auth
            .verify(&Credentials::Password {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
        {
            Ok(Some(record)) => record,
            Ok(None) => return Err(bad_login()),
            Err(err) => {
                tracing::error!(error = %err, "login verification failed");
                return Err(bad_login());
            }
        };

        if !record.user.enable || !record.has_admin_permission() {
            return Err(AppError::unauthorized_with(
                "login_error",
                messages::LOGIN_FORBIDDEN,
            ));
        }

        let claims = make_claims(record.user.id, self.token_ttl_secs);
        let token = encode_token(self.auth.keys(), &claims)?;
        Ok((token, record))
    }

    pub async fn update_me(&self, user_id: i32, patch: ProfilePatch) -> Result<UserRecord, AppError> {
        let mut errors = Vec::new();
        if matches!(patch.name.as_deref(), Some(name) if name.trim().is_empty()) {
            errors.push(FieldError::new("name", messages::NAME_BLANK));
        }
        if matches!(patch.phone_number.as_deref(), Some(phone) if phone.trim().is_empty()) {
            errors.push(FieldError::new("phoneNumber", messages::PHONE_BLANK));
        }
        if !errors.is_empty() {
            return Err(AppError::validation(
                "update_user",
                messages::INVALID_INFO,
                errors,
            ));
        }

        self.dao
            .update_info(
                user_id,
                InfoPatch {
                    name: patch.name,
                    phone_number: patch.phone_number,
                    address: patch.address,
                    avatar_url: patch.avatar_url,
                },
            )
            .await
            .map_err(|err| match err {
                DaoLayerError::NotFound { .. } => {
                    AppError::not_found("user_not_found", messages::USER_NOT_FOUND)
                }
                err => persistence("update_user", messages::UPDATE_FAILED, err),
            })?;

        self.dao
            .load_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user_not_found", messages::USER_NOT_FOUND))
    }

    /// The bearer token authenticates the request; the old password is
    /// re-verified from the body on top of that. A success rotates the
    /// guest token as a side effect of the user-row write.
    pub async fn change_password(
        &self,
        user_id: i32,
        input: ChangePasswordInput,
    ) -> Result<(), AppError> {
        let Some(new_password) = required(&input.new_password) else {
            return Err(AppError::validation(
                "change_password",
                messages::INVALID_PASSWORD,
                vec![FieldError::new("newPassword", messages::PASSWORD_BLANK)],
            ));
        };
        if input.repeat_new_password.as_deref() != Some(new_password) {
            return Err(AppError::validation(
                "confirmation_password",
                messages::PASSWORD_MISMATCH,
                vec![FieldError::new(
                    "repeatNewPassword",
                    messages::PASSWORD_MISMATCH,
                )],
            ));
        }

        let record = match self
            .auth
            .verify(&Credentials::Password {
                username: input.username.unwrap_or_default(),
                password: input.password.unwrap_or_default(),
            })
            .await
        {
            Ok(Some(record)) => record,
            Ok(None) => return Err(old_password_invalid()),
            Err(err) => {
                tracing::error!(error = %err, "old password verification failed");
                return Err(old_password_invalid());
            }
        };
        // The body must describe the same account the token authenticated.
        if record.user.id != user_id {
            return Err(AppError::unauthorized());
        }

        let password_hash = hash_password(new_password)?;
        self.dao
            .update_password(user_id, &password_hash)
            .await
            .map_err(|err| persistence("change_password", messages::UPDATE_FAILED, err))?;

        Ok(())
    }

    pub async fn get(&self, id: i32) -> Result<UserRecord, AppError> {
        self.dao
            .get_active(id)
            .await?
            .ok_or_else(|| AppError::not_found("user_not_found", messages::USER_NOT_FOUND))
    }

    pub async fn find(
        &self,
        filter: UserSearchFilter,
        page: Option<u64>,
        limit: Option<i64>,
        with_count: bool,
    ) -> Result<SearchOutcome, AppError> {
        let limit = match limit {
            Some(limit) if limit > 0 => limit as u64,
            _ => self.default_limit,
        };
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let offset = page.saturating_sub(1).saturating_mul(limit);

        let records = self.dao.search(&filter, offset, limit).await?;
        let counts = if with_count {
            let total = self.dao.count(&filter).await?;
            Some((total, total.div_ceil(limit)))
        } else {
            None
        };

        Ok(SearchOutcome {
            records,
            counts,
            page,
            limit,
        })
    }
}

fn required(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn bad_login() -> AppError {
    AppError::validation("login_error", messages::LOGIN_INVALID, Vec::new())
}

fn old_password_invalid() -> AppError {
    AppError::validation(
        "login_error",
        messages::OLD_PASSWORD_INVALID,
        vec![FieldError::new("password", messages::OLD_PASSWORD_INVALID)],
    )
}

fn persistence(kind: &str, message: &str, err: DaoLayerError) -> AppError {
    tracing::error!(error = %err, kind, "storage failure");
    AppError::persistence(kind, message)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};

    use crate::{
        auth::{
            Authenticator,
            jwt::{JwtKeys, decode_token},
            password::hash_password,
        },
        db::dao::{UserDao, UserSearchFilter},
        db::entities::{user, user_info, user_permission},
        error::AppError,
    };

    use super::{ChangePasswordInput, GuestInput, ProfilePatch, SignupInput, UserService};

    fn user_model(id: i32, username: Option<&str>, digest: Option<&str>, enable: bool) -> user::Model {
        user::Model {
            id,
            username: username.map(str::to_string),
            enable,
            password: digest.map(str::to_string),
            token: "b".repeat(20),
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn info_model(id: i32, name: &str) -> user_info::Model {
        user_info::Model {
            id,
            name: Some(name.to_string()),
            address: None,
            expert_id: None,
            phone_number: Some("0912345678".to_string()),
            avatar_url: None,
            city: None,
            is_deleted: false,
        }
    }

    fn link(user_id: i32, permission_id: i32) -> user_permission::Model {
        user_permission::Model {
            user_id,
            permission_id,
        }
    }

    fn service(db: DatabaseConnection) -> UserService {
        let dao = UserDao::new(Arc::new(db));
        let auth = Authenticator::new(dao.clone(), JwtKeys::from_secret(b"service-secret"));
        UserService::new(dao, auth, 36000, 20)
    }

    #[tokio::test]
    async fn signup_rejects_mismatched_confirmation() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let err = svc
            .signup(SignupInput {
                username: Some("alice".to_string()),
                password: Some("secret1".to_string()),
                repeat_password: Some("secret2".to_string()),
                ..Default::default()
            })
            .await
            .expect_err("mismatch should be rejected");

        assert_eq!(err.kind(), "confirmation_password");
        assert_eq!(err.message(), "Mật khẩu xác nhận không trùng khớp!");
    }

    #[tokio::test]
    async fn signup_rejects_blank_credentials() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let err = svc
            .signup(SignupInput {
                username: Some("alice".to_string()),
                password: Some("   ".to_string()),
                ..Default::default()
            })
            .await
            .expect_err("blank password should be rejected");

        assert_eq!(err.kind(), "signup_error");
        assert_eq!(err.field_errors()[0].field, "password");
    }

    #[tokio::test]
    async fn signup_rejects_taken_usernames() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some("$x"), true)]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .signup(SignupInput {
                username: Some("alice".to_string()),
                password: Some("secret1".to_string()),
                repeat_password: Some("secret1".to_string()),
                ..Default::default()
            })
            .await
            .expect_err("duplicate should be rejected");

        assert_eq!(err.kind(), "user_existed");
        assert_eq!(err.message(), "Tài khoản đã tồn tại!");
    }

    #[tokio::test]
    async fn signup_creates_user_and_profile() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![user_model(5, Some("alice"), Some("$x"), true)]])
            .append_query_results([vec![info_model(5, "Alice")]])
            .into_connection();
        let svc = service(db);

        svc.signup(SignupInput {
            username: Some("alice".to_string()),
            password: Some("secret1".to_string()),
            repeat_password: Some("secret1".to_string()),
            ..Default::default()
        })
        .await
        .expect("signup should succeed");
    }

    #[tokio::test]
    async fn signup_names_the_profile_after_the_username() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([vec![user_model(5, Some("alice"), Some("$x"), true)]])
                .append_query_results([vec![info_model(5, "alice")]])
                .into_connection(),
        );
        {
            let dao = UserDao::new(Arc::clone(&db));
            let auth = Authenticator::new(dao.clone(), JwtKeys::from_secret(b"service-secret"));
            let svc = UserService::new(dao, auth, 36000, 20);
            svc.signup(SignupInput {
                username: Some("alice".to_string()),
                password: Some("secret1".to_string()),
                repeat_password: Some("secret1".to_string()),
                ..Default::default()
            })
            .await
            .expect("signup should succeed");
        }

        let log = Arc::try_unwrap(db)
            .ok()
            .expect("no other connection handles should remain")
            .into_transaction_log();
        let dump = format!("{log:?}");
        // The username shows up in the duplicate lookup, the user insert
        // and the profile-name insert.
        assert!(dump.matches("alice").count() >= 3, "log: {dump}");
    }

    #[tokio::test]
    async fn guest_registration_collects_missing_fields() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let err = svc
            .register_guest(GuestInput::default())
            .await
            .expect_err("missing fields should be rejected");

        assert_eq!(err.kind(), "create_guest_error");
        let fields: Vec<&str> = err
            .field_errors()
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(fields, vec!["name", "phoneNumber"]);
    }

    #[tokio::test]
    async fn guest_registration_returns_the_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(7, None, None, true)]])
            .append_query_results([vec![info_model(7, "Guest")]])
            .into_connection();
        let svc = service(db);

        let record = svc
            .register_guest(GuestInput {
                name: Some("Guest".to_string()),
                phone_number: Some("0912345678".to_string()),
                ..Default::default()
            })
            .await
            .expect("registration should succeed");

        assert_eq!(record.user.id, 7);
        assert!(record.user.is_guest());
        assert_eq!(record.user.token.len(), 20);
    }

    #[tokio::test]
    async fn login_issues_a_decodable_token() {
        let digest = hash_password("secret1").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some(&digest), true)]])
            .append_query_results([vec![info_model(1, "Alice")]])
            .append_query_results([vec![link(1, 1)]])
            .into_connection();
        let svc = service(db);

        let (token, record) = svc
            .login(Some("alice".to_string()), Some("secret1".to_string()))
            .await
            .expect("login should succeed");

        let claims = decode_token(
            &JwtKeys::from_secret(b"service-secret"),
            &token,
        )
        .expect("token should decode");
        assert_eq!(claims.id, 1);
        assert_eq!(record.user.id, 1);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_as_bad_request() {
        let digest = hash_password("secret1").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some(&digest), true)]])
            .append_query_results([vec![info_model(1, "Alice")]])
            .append_query_results([vec![link(1, 1)]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .login(Some("alice".to_string()), Some("wrong".to_string()))
            .await
            .expect_err("wrong password should be rejected");

        assert_eq!(err.kind(), "login_error");
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn login_rejects_disabled_accounts_as_unauthorized() {
        let digest = hash_password("secret1").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some(&digest), false)]])
            .append_query_results([vec![info_model(1, "Alice")]])
            .append_query_results([vec![link(1, 1)]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .login(Some("alice".to_string()), Some("secret1".to_string()))
            .await
            .expect_err("disabled account should be rejected");

        assert!(matches!(err, AppError::Unauthorized { .. }));
        assert_eq!(err.message(), "Tài khoản không có quyền đăng nhập");
    }

    #[tokio::test]
    async fn login_rejects_accounts_without_admin_permission() {
        let digest = hash_password("secret1").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some(&digest), true)]])
            .append_query_results([vec![info_model(1, "Alice")]])
            .append_query_results([Vec::<user_permission::Model>::new()])
            .into_connection();
        let svc = service(db);

        let err = svc
            .login(Some("alice".to_string()), Some("secret1".to_string()))
            .await
            .expect_err("unprivileged account should be rejected");

        assert!(matches!(err, AppError::Unauthorized { .. }));
        assert_eq!(err.kind(), "login_error");
    }

    #[tokio::test]
    async fn update_me_rejects_present_but_blank_fields() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let err = svc
            .update_me(
                1,
                ProfilePatch {
                    name: Some("  ".to_string()),
                    phone_number: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("blank fields should be rejected");

        assert_eq!(err.kind(), "update_user");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[tokio::test]
    async fn update_me_returns_the_fresh_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![info_model(1, "Old")]])
            .append_query_results([vec![user_info::Model {
                name: Some("New".to_string()),
                ..info_model(1, "Old")
            }]])
            .append_query_results([vec![user_model(1, Some("alice"), Some("$x"), true)]])
            .append_query_results([vec![user_info::Model {
                name: Some("New".to_string()),
                ..info_model(1, "Old")
            }]])
            .append_query_results([Vec::<user_permission::Model>::new()])
            .into_connection();
        let svc = service(db);

        let record = svc
            .update_me(
                1,
                ProfilePatch {
                    name: Some("New".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update should succeed");

        assert_eq!(record.info.as_ref().and_then(|i| i.name.as_deref()), Some("New"));
    }

    #[tokio::test]
    async fn change_password_requires_a_new_password() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let err = svc
            .change_password(1, ChangePasswordInput::default())
            .await
            .expect_err("blank new password should be rejected");

        assert_eq!(err.kind(), "change_password");
        assert_eq!(err.field_errors()[0].field, "newPassword");
    }

    #[tokio::test]
    async fn change_password_rejects_bad_old_credentials() {
        let digest = hash_password("secret1").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some(&digest), true)]])
            .append_query_results([vec![info_model(1, "Alice")]])
            .append_query_results([vec![link(1, 1)]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .change_password(
                1,
                ChangePasswordInput {
                    username: Some("alice".to_string()),
                    password: Some("wrong".to_string()),
                    new_password: Some("next1".to_string()),
                    repeat_new_password: Some("next1".to_string()),
                },
            )
            .await
            .expect_err("bad old password should be rejected");

        assert_eq!(err.kind(), "login_error");
        assert_eq!(err.message(), "Mật khẩu cũ không hợp lệ");
    }

    #[tokio::test]
    async fn change_password_rejects_foreign_credentials() {
        let digest = hash_password("secret1").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(2, Some("mallory"), Some(&digest), true)]])
            .append_query_results([vec![info_model(2, "Mallory")]])
            .append_query_results([Vec::<user_permission::Model>::new()])
            .into_connection();
        let svc = service(db);

        let err = svc
            .change_password(
                1,
                ChangePasswordInput {
                    username: Some("mallory".to_string()),
                    password: Some("secret1".to_string()),
                    new_password: Some("next1".to_string()),
                    repeat_new_password: Some("next1".to_string()),
                },
            )
            .await
            .expect_err("credentials for another account should be rejected");

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn change_password_stores_the_new_digest() {
        let digest = hash_password("secret1").expect("hash should succeed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some(&digest), true)]])
            .append_query_results([vec![info_model(1, "Alice")]])
            .append_query_results([vec![link(1, 1)]])
            .append_query_results([vec![user_model(1, Some("alice"), Some(&digest), true)]])
            .append_query_results([vec![user_model(1, Some("alice"), Some("$new"), true)]])
            .into_connection();
        let svc = service(db);

        svc.change_password(
            1,
            ChangePasswordInput {
                username: Some("alice".to_string()),
                password: Some("secret1".to_string()),
                new_password: Some("next1".to_string()),
                repeat_new_password: Some("next1".to_string()),
            },
        )
        .await
        .expect("change should succeed");
    }

    #[tokio::test]
    async fn get_maps_missing_users_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let svc = service(db);

        let err = svc.get(9999).await.expect_err("missing user should error");

        assert_eq!(err.kind(), "user_not_found");
        assert_eq!(err.message(), "Không tìm thấy người dùng!");
    }

    #[tokio::test]
    async fn find_coerces_bad_limits_to_the_default() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let svc = service(db);

        let outcome = svc
            .find(UserSearchFilter::default(), None, Some(-5), false)
            .await
            .expect("search should succeed");

        assert_eq!(outcome.limit, 20);
        assert_eq!(outcome.page, 1);
        assert!(outcome.counts.is_none());
    }

    #[tokio::test]
    async fn find_survives_huge_page_numbers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let svc = service(db);

        let outcome = svc
            .find(UserSearchFilter::default(), Some(u64::MAX), Some(20), false)
            .await
            .expect("search should succeed");

        assert_eq!(outcome.page, u64::MAX);
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn find_with_count_computes_page_count() {
        let mut count_row = BTreeMap::new();
        count_row.insert("num_items", Value::BigInt(Some(41)));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1, Some("alice"), Some("$x"), true)]])
            .append_query_results([vec![info_model(1, "Alice")]])
            .append_query_results([vec![link(1, 1)]])
            .append_query_results([vec![count_row]])
            .into_connection();
        let svc = service(db);

        let outcome = svc
            .find(UserSearchFilter::default(), Some(2), Some(20), true)
            .await
            .expect("search should succeed");

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.counts, Some((41, 3)));
        assert_eq!(outcome.page, 2);
    }
}
