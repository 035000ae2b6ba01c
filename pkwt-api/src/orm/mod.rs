mod db;
pub mod dokumen;
pub mod import;
pub mod karyawan;
pub mod kontrak;
pub mod login;
pub mod nomor_kontrak;
pub mod sweeper;
pub mod template_kontrak;
pub mod testing;
pub mod user;

pub use db::*;
