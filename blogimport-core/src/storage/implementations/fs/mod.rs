//! Filesystem-backed storage

mod uploads;

pub use uploads::UploadDir;
