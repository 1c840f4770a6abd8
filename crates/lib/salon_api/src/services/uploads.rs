//! Image uploads for catalog services, stored on local disk.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "uploads";

/// Raster formats accepted for service images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// Map a declared `Content-Type` onto an accepted format. Parameters and
    /// case are ignored; anything outside the allow-list yields `None`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime: mime::Mime = content_type.trim().to_ascii_lowercase().parse().ok()?;
        match mime.essence_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Extension of the stored copy.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// Whether `bytes` start with this format's signature.
    pub fn matches(self, bytes: &[u8]) -> bool {
        match self {
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Webp => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        }
    }
}

/// One image part read from a multipart request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Validate the part and return its format.
    ///
    /// The declared type must be an accepted raster format and the content
    /// must carry that format's signature. The client file name plays no part.
    pub fn validate(&self, max_bytes: usize) -> AppResult<ImageKind> {
        let kind = self
            .content_type
            .as_deref()
            .and_then(ImageKind::from_content_type)
            .ok_or_else(|| {
                AppError::Validation("Only JPEG, PNG, GIF and WebP images are allowed".into())
            })?;
        if self.bytes.is_empty() {
            return Err(AppError::Validation("Image file is empty".into()));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "Image exceeds the {max_bytes} byte limit"
            )));
        }
        if !kind.matches(&self.bytes) {
            return Err(AppError::Validation(
                "Image content does not match its declared type".into(),
            ));
        }
        Ok(kind)
    }
}

/// Write each image under `dir` with a fresh name and return their public paths.
///
/// Every image is validated against `max_bytes` before anything is written.
/// If any write fails the files already written are removed again.
pub async fn save_images(
    dir: &Path,
    images: &[ImageUpload],
    max_bytes: usize,
) -> AppResult<Vec<String>> {
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let kinds = images
        .iter()
        .map(|image| image.validate(max_bytes))
        .collect::<AppResult<Vec<_>>>()?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("create upload dir {}: {e}", dir.display())))?;

    let mut saved = Vec::with_capacity(images.len());
    for (image, kind) in images.iter().zip(kinds) {
        let file_name = format!("{}.{}", salon_core::uuid::uuidv7(), kind.extension());
        let path = dir.join(&file_name);
        if let Err(e) = tokio::fs::write(&path, &image.bytes).await {
            remove_images(dir, &saved).await;
            return Err(AppError::Internal(format!("write {}: {e}", path.display())));
        }
        debug!(path = %path.display(), bytes = image.bytes.len(), "stored upload");
        saved.push(format!("{PUBLIC_PREFIX}/{file_name}"));
    }
    Ok(saved)
}

/// Map a public path back onto `dir`. Anything that is not a plain file name
/// under the public prefix yields `None`.
fn local_path(dir: &Path, public_path: &str) -> Option<PathBuf> {
    let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return None;
    }
    Some(dir.join(name))
}

/// Best-effort removal of previously stored images.
pub async fn remove_images(dir: &Path, public_paths: &[String]) {
    for public_path in public_paths {
        let Some(path) = local_path(dir, public_path) else {
            warn!(path = %public_path, "skipping removal of unrecognized upload path");
            continue;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), "failed to remove upload: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF";
    const GIF: &[u8] = b"GIF89a\x01\0\x01\0";
    const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

    fn image(name: Option<&str>, ct: Option<&str>, bytes: &'static [u8]) -> ImageUpload {
        ImageUpload {
            file_name: name.map(str::to_string),
            content_type: ct.map(str::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn accepted_types_map_to_fixed_extensions() {
        assert_eq!(ImageKind::from_content_type("image/jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_content_type("IMAGE/PNG; charset=binary"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_content_type("image/gif"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::from_content_type("image/webp"), Some(ImageKind::Webp));
        assert_eq!(ImageKind::Jpeg.extension(), "jpg");
        assert_eq!(ImageKind::Webp.extension(), "webp");
    }

    #[test]
    fn scriptable_and_unknown_types_are_refused() {
        for ct in ["image/svg+xml", "text/html", "image/x-icon", "application/octet-stream", "", "image/"] {
            assert_eq!(ImageKind::from_content_type(ct), None, "{ct}");
        }
    }

    #[test]
    fn validation_checks_type_size_and_signature() {
        assert_eq!(image(Some("a.png"), Some("image/png"), PNG).validate(64).unwrap(), ImageKind::Png);
        assert_eq!(image(None, Some("image/jpeg"), JPEG).validate(64).unwrap(), ImageKind::Jpeg);
        assert_eq!(image(None, Some("image/gif"), GIF).validate(64).unwrap(), ImageKind::Gif);
        assert_eq!(image(None, Some("image/webp"), WEBP).validate(64).unwrap(), ImageKind::Webp);

        assert!(image(Some("a.txt"), Some("text/plain"), b"x").validate(64).is_err());
        assert!(image(Some("a.png"), None, PNG).validate(64).is_err());
        assert!(image(Some("a.png"), Some("image/png"), b"").validate(64).is_err());
        assert!(image(Some("a.png"), Some("image/png"), PNG).validate(4).is_err());
        assert!(image(Some("a.svg"), Some("image/svg+xml"), b"<svg onload=alert(1)>").validate(64).is_err());
    }

    #[test]
    fn declared_type_must_match_content() {
        let html = image(Some("evil.html"), Some("image/png"), b"<script>alert(1)</script>");
        assert!(matches!(html.validate(64), Err(AppError::Validation(_))));
        assert!(image(None, Some("image/png"), JPEG).validate(64).is_err());
    }

    #[test]
    fn local_path_rejects_traversal() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(
            local_path(dir, "uploads/a.png"),
            Some(PathBuf::from("/srv/uploads/a.png"))
        );
        assert_eq!(local_path(dir, "uploads/../etc/passwd"), None);
        assert_eq!(local_path(dir, "uploads/.hidden"), None);
        assert_eq!(local_path(dir, "other/a.png"), None);
    }

    #[tokio::test]
    async fn stored_extension_ignores_client_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("nested");
        let paths = save_images(
            &upload_dir,
            &[
                image(Some("page.html"), Some("image/png"), PNG),
                image(Some("b.JPG"), Some("image/jpeg"), JPEG),
            ],
            64,
        )
        .await
        .unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with(".png"), "{}", paths[0]);
        assert!(paths[1].ends_with(".jpg"), "{}", paths[1]);
        for p in &paths {
            assert!(p.starts_with("uploads/"));
            assert!(local_path(&upload_dir, p).unwrap().exists());
        }

        remove_images(&upload_dir, &paths).await;
        for p in &paths {
            assert!(!local_path(&upload_dir, p).unwrap().exists());
        }
    }

    #[tokio::test]
    async fn invalid_image_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("nested");
        let err = save_images(
            &upload_dir,
            &[
                image(Some("a.png"), Some("image/png"), PNG),
                image(Some("b.svg"), Some("image/svg+xml"), b"<svg/>"),
            ],
            64,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!upload_dir.exists());
    }
}
