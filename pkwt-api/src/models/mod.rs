pub mod dokumen;
pub mod karyawan;
pub mod session;
pub mod template_kontrak;
pub mod user;

// Re-export models for easier access
pub use dokumen::*;
pub use karyawan::*;
pub use session::*;
pub use template_kontrak::*;
pub use user::*;
