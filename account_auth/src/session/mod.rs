mod config;
mod errors;
mod main;
mod types;

pub use config::SESSION_COOKIE_NAME;
pub use errors::SessionError;
pub use main::{
    establish, get_auth_state, invalidate, prepare_logout_response, verify_csrf_token,
};
pub use types::{AuthState, CsrfHeaderVerified, CsrfToken, Identity};

pub(crate) use main::{SessionContext, check_csrf, get_session_context, session_cookie_headers};

#[cfg(any(test, feature = "test-utils"))]
pub(crate) use main::establish_unverified;
