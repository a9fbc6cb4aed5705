use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Where an uploaded image lands under the upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    Product,
    Shop,
}

impl UploadKind {
    pub fn subdir(self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatars",
            UploadKind::Product => "products",
            UploadKind::Shop => "shops",
        }
    }

    /// Multipart field name the client uses for this kind of image.
    pub fn field_name(self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatar",
            UploadKind::Product => "productImage",
            UploadKind::Shop => "shopImage",
        }
    }
}

#[derive(Debug)]
pub struct UploadedImage {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Text fields plus at most one image file, drained from a multipart
/// request. Fields may repeat (e.g. several `productIds`).
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file: Option<UploadedImage>,
}

impl MultipartForm {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Drains the multipart stream. The field named by `kind` is treated as
/// the image upload and must be `image/*`; everything else is collected
/// as text. Size is capped upstream by the request body limit.
pub async fn collect_form(mut multipart: Multipart, kind: UploadKind) -> Result<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == kind.field_name() {
            let content_type = field.content_type().unwrap_or_default().to_string();
            if !is_image(&content_type) {
                return Err(AppError::BadRequest(
                    "Only image files are allowed".to_string(),
                ));
            }
            let original_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            form.file = Some(UploadedImage {
                original_name,
                content_type,
                bytes,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Malformed field {}: {}", name, e)))?;
            form.fields.push((name, value));
        }
    }

    Ok(form)
}

/// Writes the image under the kind's subdirectory and returns the
/// stored filename. Single-shot write; a failure surfaces to the caller
/// with nothing to clean up but an orphan file.
pub async fn store_image(
    root: &Path,
    kind: UploadKind,
    image: &UploadedImage,
) -> Result<String> {
    let filename = storage_filename(&image.original_name);
    let path = root.join(kind.subdir()).join(&filename);

    tokio::fs::write(&path, &image.bytes).await.map_err(|e| {
        tracing::error!("Failed to store upload {}: {}", path.display(), e);
        AppError::InternalError("File upload error".to_string())
    })?;

    tracing::info!("Stored {} upload {}", kind.subdir(), filename);
    Ok(filename)
}

pub async fn ensure_upload_dirs(root: &Path) -> Result<()> {
    for kind in [UploadKind::Avatar, UploadKind::Product, UploadKind::Shop] {
        tokio::fs::create_dir_all(root.join(kind.subdir())).await?;
    }
    Ok(())
}

fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Collision-resistant name: a v4 uuid prefix plus the sanitized
/// original filename.
fn storage_filename(original: &str) -> String {
    let sanitized = sanitize_filename(original);
    if sanitized.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        format!("{}-{}", Uuid::new_v4(), sanitized)
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_special_characters() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("safe-name_01.jpeg"), "safe-name_01.jpeg");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn storage_filename_keeps_original_suffix() {
        let name = storage_filename("cat.png");
        assert!(name.ends_with("-cat.png"));
        assert!(name.len() > "cat.png".len());
    }

    #[test]
    fn storage_filenames_are_unique() {
        assert_ne!(storage_filename("a.png"), storage_filename("a.png"));
    }

    #[test]
    fn empty_original_name_still_gets_a_filename() {
        assert!(!storage_filename("").is_empty());
    }

    #[test]
    fn image_filter_accepts_only_images() {
        assert!(is_image("image/png"));
        assert!(is_image("image/jpeg"));
        assert!(!is_image("application/pdf"));
        assert!(!is_image("text/html"));
        assert!(!is_image(""));
    }

    #[tokio::test]
    async fn store_image_writes_to_kind_subdir() {
        let dir = tempfile::tempdir().expect("tempdir");
        ensure_upload_dirs(dir.path()).await.expect("dirs");

        let image = UploadedImage {
            original_name: "avatar pic.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"not-really-a-png"),
        };

        let filename = store_image(dir.path(), UploadKind::Avatar, &image)
            .await
            .expect("store");

        let stored = dir.path().join("avatars").join(&filename);
        let contents = tokio::fs::read(&stored).await.expect("read back");
        assert_eq!(contents, b"not-really-a-png");
        assert!(filename.ends_with("-avatar_pic.png"));
    }

    #[test]
    fn multipart_form_lookups() {
        let form = MultipartForm {
            fields: vec![
                ("name".to_string(), "Mug".to_string()),
                ("productIds".to_string(), "1".to_string()),
                ("productIds".to_string(), "2".to_string()),
            ],
            file: None,
        };
        assert_eq!(form.get("name"), Some("Mug"));
        assert_eq!(form.get("missing"), None);
        assert_eq!(form.get_all("productIds"), vec!["1", "2"]);
    }
}
