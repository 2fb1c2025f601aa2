mod account;
mod admin;
mod login;
mod logout;

pub(super) use account::{change_password, register};
pub(super) use admin::{delete_account, list, update_role};
pub(super) use login::{login, login_page};
pub(super) use logout::logout;
