use crate::config::Config;
use std::path::{Path, PathBuf};

/// Maps a proof-document URL to a path under the upload directory, or `None`
/// when the URL points at third-party storage (or tries to escape the
/// directory).
pub fn local_proof_path(url: &str, config: &Config) -> Option<PathBuf> {
    let rel = url.strip_prefix(&config.upload_url_prefix)?;
    let rel = rel.trim_start_matches('/');

    if rel.is_empty() || rel.split('/').any(|seg| seg == "..") {
        return None;
    }

    Some(Path::new(&config.upload_dir).join(rel))
}

/// Best-effort removal of a server-local proof file. Runs off the request
/// path; failure is logged and never reaches the client.
pub fn cleanup_local_proof(url: String, config: Config) {
    let Some(path) = local_proof_path(&url, &config) else {
        return;
    };

    actix_web::rt::task::spawn_blocking(move || {
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove proof file");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: String::new(),
            server_addr: String::new(),
            access_token_ttl: 0,
            refresh_token_ttl: 0,
            rate_login_per_min: 0,
            rate_register_per_min: 0,
            rate_refresh_per_min: 0,
            rate_protected_per_min: 0,
            api_prefix: String::new(),
            upload_url_prefix: "/uploads".to_string(),
            upload_dir: "uploads".to_string(),
        }
    }

    #[test]
    fn local_url_maps_under_upload_dir() {
        let path = local_proof_path("/uploads/proof-123.pdf", &config()).unwrap();
        assert_eq!(path, Path::new("uploads").join("proof-123.pdf"));
    }

    #[test]
    fn external_url_is_ignored() {
        assert!(local_proof_path("https://bucket.example.com/proof.pdf", &config()).is_none());
    }

    #[test]
    fn traversal_is_rejected() {
        assert!(local_proof_path("/uploads/../etc/passwd", &config()).is_none());
        assert!(local_proof_path("/uploads/", &config()).is_none());
    }
}
