pub mod init;
pub mod status;
pub mod sync;
pub mod views;
