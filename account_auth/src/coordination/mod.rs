mod account;
mod admin;
mod authorize;
mod errors;
mod login;

pub use account::{get_account, register_account, update_account_password};
pub use admin::{delete_account_admin, list_accounts, update_account_role};
pub use authorize::{
    Authorization, SessionAuth, auth_state_from_headers, authenticate_request_core,
    authorize_request_core,
};
pub use errors::CoordinationError;
pub use login::{LoginOutcome, login_core};
