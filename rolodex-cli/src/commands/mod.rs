pub mod auth;
pub mod diff;
pub mod init;
pub mod sync;
