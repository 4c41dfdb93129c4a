pub mod check;
pub mod config;
pub mod guide;
pub mod home;
pub mod init;
pub mod nav;
pub mod phases;
pub mod progress;
pub mod roadmap;
pub mod roles;
pub mod sync;
