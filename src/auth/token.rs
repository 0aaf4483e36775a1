use rand::{Rng, distributions::Alphanumeric, thread_rng};

pub const LOGIN_TOKEN_LEN: usize = 20;

/// Rotating guest credential. A fresh value is stored on every insert or
/// update of a user row; only the guest strategy ever checks it.
pub fn generate_login_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LOGIN_TOKEN_LEN)
        .map(char::from)
        .collect()
}
