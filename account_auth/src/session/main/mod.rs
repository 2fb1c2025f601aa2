mod csrf;
mod session;

pub use csrf::verify_csrf_token;
pub use session::{establish, get_auth_state, invalidate, prepare_logout_response};

pub(crate) use csrf::check_csrf;
pub(crate) use session::{SessionContext, get_session_context, session_cookie_headers};

#[cfg(any(test, feature = "test-utils"))]
pub(crate) use session::establish_unverified;
