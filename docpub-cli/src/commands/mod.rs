pub mod delete;
pub mod init;
pub mod status;
pub mod sync;
