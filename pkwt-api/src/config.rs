//! Application configuration.
//!
//! Upload directories and the allowed document extensions come from
//! environment variables with sensible defaults, mirroring how the database
//! URL is provided. The resolved config is attached as Rocket managed state
//! so handlers receive it explicitly instead of reaching for globals.

use std::path::{Path, PathBuf};

use rocket::fairing::AdHoc;

/// Resolved application configuration, injected into handlers as
/// `&State<AppConfig>`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory for uploaded employee documents.
    pub upload_dir_dokumen: PathBuf,
    /// Directory for generated contract letters.
    pub upload_dir_kontrak: PathBuf,
    /// Directory for uploaded contract templates.
    pub upload_dir_template: PathBuf,
    /// Lowercased extensions accepted for document uploads.
    pub allowed_extensions_dokumen: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            upload_dir_dokumen: PathBuf::from("uploads/dokumen"),
            upload_dir_kontrak: PathBuf::from("uploads/kontrak"),
            upload_dir_template: PathBuf::from("uploads/template"),
            allowed_extensions_dokumen: ["pdf", "doc", "docx", "jpg", "jpeg", "png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from `PKWT_*` environment variables, falling
    /// back to the defaults above for anything unset.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        let dir = |var: &str, fallback: PathBuf| {
            std::env::var(var).map(PathBuf::from).unwrap_or(fallback)
        };
        let allowed = std::env::var("PKWT_ALLOWED_EXTENSIONS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_extensions_dokumen);

        AppConfig {
            upload_dir_dokumen: dir("PKWT_UPLOAD_DIR_DOKUMEN", defaults.upload_dir_dokumen),
            upload_dir_kontrak: dir("PKWT_UPLOAD_DIR_KONTRAK", defaults.upload_dir_kontrak),
            upload_dir_template: dir("PKWT_UPLOAD_DIR_TEMPLATE", defaults.upload_dir_template),
            allowed_extensions_dokumen: allowed,
        }
    }

    /// Checks a filename's extension against the allowed set
    /// (case-insensitive). Files without an extension are rejected.
    pub fn ekstensi_diizinkan(&self, filename: &str) -> bool {
        match Path::new(filename).extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .allowed_extensions_dokumen
                .iter()
                .any(|allowed| allowed == &ext.to_lowercase()),
            None => false,
        }
    }

    /// Creates the three upload directories if they do not exist yet.
    pub fn buat_direktori(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir_dokumen)?;
        std::fs::create_dir_all(&self.upload_dir_kontrak)?;
        std::fs::create_dir_all(&self.upload_dir_template)?;
        Ok(())
    }
}

/// Fairing that resolves the config, creates the upload directories and
/// attaches the config as managed state.
pub fn app_config_fairing() -> AdHoc {
    AdHoc::on_ignite("App Config", |rocket| async {
        let config = AppConfig::from_env();
        config
            .buat_direktori()
            .expect("Failed to create upload directories");
        rocket.manage(config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ekstensi_diizinkan() {
        let config = AppConfig::default();
        assert!(config.ekstensi_diizinkan("cv.pdf"));
        assert!(config.ekstensi_diizinkan("scan.JPEG"));
        assert!(config.ekstensi_diizinkan("foto.Png"));
        assert!(!config.ekstensi_diizinkan("script.exe"));
        assert!(!config.ekstensi_diizinkan("tanpa_ekstensi"));
    }

    #[test]
    fn test_default_directories() {
        let config = AppConfig::default();
        assert_eq!(config.upload_dir_dokumen, PathBuf::from("uploads/dokumen"));
        assert_eq!(config.upload_dir_kontrak, PathBuf::from("uploads/kontrak"));
        assert_eq!(
            config.upload_dir_template,
            PathBuf::from("uploads/template")
        );
    }
}
