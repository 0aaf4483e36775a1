use serde::Serialize;

/// One field-scoped validation failure, serialized inside the `errors`
/// array of the wire error body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            messages: vec![message.into()],
        }
    }
}

/// Application error taxonomy. Every variant carries the `type` code the
/// client matches on (`user_not_found`, `login_error`, ...); only
/// `Unauthorized` maps to HTTP 401, everything else is a 400.
#[derive(Debug)]
pub enum AppError {
    Validation {
        kind: String,
        message: String,
        errors: Vec<FieldError>,
    },
    NotFound {
        kind: String,
        message: String,
    },
    Conflict {
        kind: String,
        message: String,
    },
    Unauthorized {
        kind: String,
        message: String,
    },
    /// Storage/transaction failure. The caller logs the underlying error;
    /// only the generic per-operation message reaches the client.
    Persistence {
        kind: String,
        message: String,
    },
}

impl AppError {
    pub fn validation(
        kind: impl Into<String>,
        message: impl Into<String>,
        errors: Vec<FieldError>,
    ) -> Self {
        Self::Validation {
            kind: kind.into(),
            message: message.into(),
            errors,
        }
    }

    pub fn not_found(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn conflict(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The fixed gate rejection every guarded route answers with.
    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            kind: "unauthorized".to_string(),
            message: messages::UNAUTHORIZED.to_string(),
        }
    }

    /// A 401 with a route-specific code, e.g. the login permission check.
    pub fn unauthorized_with(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn persistence(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Validation { kind, .. }
            | Self::NotFound { kind, .. }
            | Self::Conflict { kind, .. }
            | Self::Unauthorized { kind, .. }
            | Self::Persistence { kind, .. } => kind.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Persistence { message, .. } => message.as_str(),
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors, .. } => errors.as_slice(),
            _ => &[],
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl From<crate::db::dao::DaoLayerError> for AppError {
    fn from(err: crate::db::dao::DaoLayerError) -> Self {
        match err {
            crate::db::dao::DaoLayerError::NotFound { .. } => {
                AppError::not_found("user_not_found", messages::USER_NOT_FOUND)
            }
            err => {
                tracing::error!(error = %err, "storage failure");
                AppError::persistence("persistence_error", messages::PERSISTENCE)
            }
        }
    }
}

/// Client-facing messages. Vietnamese strings are part of the API
/// contract and must not be reworded.
pub mod messages {
    pub const UNAUTHORIZED: &str = "Không đủ quyền thực hiện yêu cầu!";
    pub const USER_NOT_FOUND: &str = "Không tìm thấy người dùng!";
    pub const USER_EXISTED: &str = "Tài khoản đã tồn tại!";
    pub const INVALID_PASSWORD: &str = "Mật khẩu không hợp lệ";
    pub const PASSWORD_MISMATCH: &str = "Mật khẩu xác nhận không trùng khớp!";
    pub const PASSWORD_BLANK: &str = "Mật khẩu không được để trống!";
    pub const OLD_PASSWORD_INVALID: &str = "Mật khẩu cũ không hợp lệ";
    pub const INVALID_INFO: &str = "Thông tin không hợp lệ!";
    pub const NAME_REQUIRED: &str = "Phải nhập tên hiển thị!";
    pub const PHONE_REQUIRED: &str = "Phải nhập số điện thoại!";
    pub const NAME_BLANK: &str = "Tên hiển thị không được để trống!";
    pub const PHONE_BLANK: &str = "Thông tin số điện thoại không được để trống!";
    pub const LOGIN_INVALID: &str = "Tài khoản đăng nhập hoặc mật khẩu không hợp lệ";
    pub const LOGIN_FORBIDDEN: &str = "Tài khoản không có quyền đăng nhập";
    pub const SIGNUP_FAILED: &str = "Lỗi trong quá trình đăng ký!";
    pub const UPDATE_FAILED: &str = "Lỗi trong quá trình cập nhật!";
    pub const PERSISTENCE: &str = "Lỗi trong quá trình xử lý!";
}

#[cfg(test)]
mod tests {
    use super::{AppError, FieldError};

    #[test]
    fn unauthorized_has_fixed_kind_and_message() {
        let err = AppError::unauthorized();

        assert_eq!(err.kind(), "unauthorized");
        assert_eq!(err.message(), "Không đủ quyền thực hiện yêu cầu!");
        assert!(err.field_errors().is_empty());
    }

    #[test]
    fn validation_errors_expose_field_scope() {
        let err = AppError::validation(
            "update_user",
            "Thông tin không hợp lệ!",
            vec![FieldError::new("name", "Tên hiển thị không được để trống!")],
        );

        assert_eq!(err.kind(), "update_user");
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, "name");
    }
}
