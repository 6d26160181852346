pub mod credential;

pub use credential::{check_hash, make_salt, password_hash};
