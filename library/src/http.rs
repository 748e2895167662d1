//! Size-bounded HTTP body reads

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    /// `size` is the announced length, or the bytes read when reading stopped
    #[error("body is at least {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: usize },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Read a response body, giving up as soon as it exceeds `limit` bytes.
pub async fn read_body_limited(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BodyError> {
    let announced = response.content_length();
    if let Some(size) = announced
        && size > limit as u64
    {
        return Err(BodyError::TooLarge { size, limit });
    }

    let capacity = announced.map_or(0, |size| size as usize);
    let mut body = Vec::with_capacity(capacity);
    while let Some(chunk) = response.chunk().await? {
        let size = body.len() + chunk.len();
        if size > limit {
            return Err(BodyError::TooLarge {
                size: size as u64,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
