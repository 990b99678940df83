use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::storage::StorageClient;

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
}

#[derive(Debug, Clone)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

pub async fn upload_book_image(
    storage: &dyn StorageClient,
    user_id: i64,
    image: UploadItem<'_>,
) -> anyhow::Result<StoredImage> {
    anyhow::ensure!(!image.body.is_empty(), "empty image");

    let ext = ext_from_mime(image.content_type).unwrap_or("bin");
    let key = format!("books/{}/{}.{}", user_id, Uuid::new_v4(), ext);
    storage
        .put_object(&key, image.body, image.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    info!(%key, "book image uploaded");
    Ok(StoredImage {
        url: storage.public_url(&key),
        key,
    })
}

/// Best-effort removal of an image whose listing never made it to the database.
pub async fn discard_image(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = %e, %key, "orphaned book image left in storage");
    }
}

pub(crate) fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod image_tests {
    use super::*;
    use crate::state::test_support::FakeStorage;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert!(is_image("image/png"));
        assert!(!is_image("text/plain"));
    }

    #[tokio::test]
    async fn upload_then_discard() {
        let storage = FakeStorage::default();
        let stored = upload_book_image(
            &storage,
            7,
            UploadItem {
                body: Bytes::from_static(b"\x89PNG"),
                content_type: "image/png",
            },
        )
        .await
        .unwrap();

        assert!(stored.key.starts_with("books/7/"));
        assert!(stored.key.ends_with(".png"));
        assert_eq!(stored.url, format!("https://fake.local/{}", stored.key));
        assert_eq!(storage.objects.lock().unwrap().len(), 1);

        discard_image(&storage, &stored.key).await;
        assert!(storage.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let storage = FakeStorage::default();
        let res = upload_book_image(
            &storage,
            1,
            UploadItem {
                body: Bytes::new(),
                content_type: "image/png",
            },
        )
        .await;
        assert!(res.is_err());
        assert!(storage.objects.lock().unwrap().is_empty());
    }
}
