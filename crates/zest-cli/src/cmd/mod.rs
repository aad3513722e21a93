pub mod init;
pub mod spec;
pub mod status;
