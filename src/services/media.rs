use futures::future::BoxFuture;
use thiserror::Error;

/// Failure raised by the image pipeline.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The payload is not a usable image.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
    /// The object storage upload failed.
    #[error("upload failed: {0}")]
    Upload(String),
}

/// External image conversion and public object storage, consumed only by the
/// club hero upload path.
pub trait ImagePipeline: Send + Sync {
    /// Re-encode the image as webp at the given width and quality.
    fn convert_to_webp<'a>(
        &'a self,
        image: &'a [u8],
        width: u32,
        quality: u8,
    ) -> BoxFuture<'a, Result<Vec<u8>, MediaError>>;

    /// Upload a public asset and return its public URL.
    fn upload_public_image<'a>(
        &'a self,
        path: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String, MediaError>>;
}

/// Development pipeline: passes bytes through and fabricates a local URL.
#[derive(Default)]
pub struct PassthroughImagePipeline;

impl ImagePipeline for PassthroughImagePipeline {
    fn convert_to_webp<'a>(
        &'a self,
        image: &'a [u8],
        _width: u32,
        _quality: u8,
    ) -> BoxFuture<'a, Result<Vec<u8>, MediaError>> {
        Box::pin(async move {
            if image.is_empty() {
                return Err(MediaError::InvalidImage("empty payload".to_owned()));
            }
            Ok(image.to_vec())
        })
    }

    fn upload_public_image<'a>(
        &'a self,
        path: &'a str,
        _bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String, MediaError>> {
        Box::pin(async move { Ok(format!("https://assets.local/{path}")) })
    }
}
