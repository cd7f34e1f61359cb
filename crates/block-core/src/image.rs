use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::block::{Block, BlockId};
use crate::controller::{Change, ChangeKind};
use crate::document::Document;
use crate::error::ImageError;

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// The image MIME type for `path`, judged by extension.
pub fn image_mime_for_path(path: &Path) -> Result<String, ImageError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(ImageError::NotAnImage {
            path: path.to_path_buf(),
            mime: mime.essence_str().to_string(),
        });
    }
    Ok(mime.essence_str().to_string())
}

/// Read an image file and encode it as a self-contained `data:` URL.
pub fn read_image_data_url(path: &Path) -> Result<String, ImageError> {
    let mime = image_mime_for_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), %mime, len = bytes.len(), "read image");
    Ok(data_url(&mime, &bytes))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decode a base64 `data:` URL. Anything else yields `None`.
pub fn decode_data_url(url: &str) -> Option<DecodedDataUrl> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some(DecodedDataUrl {
        mime: mime.to_string(),
        bytes,
    })
}

/// Where an image picked from disk should land once the (asynchronous) read finishes.
///
/// Captured when the picker opens; applied against whatever the block list is by then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInsertion {
    anchor: BlockId,
    index: usize,
}

impl ImageInsertion {
    pub fn capture(doc: &Document, after: &BlockId) -> Self {
        let index = doc.index_of(after).map_or(doc.len(), |ix| ix + 1);
        Self {
            anchor: after.clone(),
            index,
        }
    }

    pub fn anchor(&self) -> &BlockId {
        &self.anchor
    }

    /// Insert an image block after the anchor, or at the recorded position (clamped) when
    /// the anchor has since been removed.
    pub fn apply(&self, doc: &Document, url: String) -> (Change, BlockId) {
        let mut next = doc.clone();
        let block = Block::image(url);
        let id = block.id.clone();
        if next.insert_after(&self.anchor, block.clone()).is_err() {
            tracing::debug!(anchor = %self.anchor, "image anchor is gone, using recorded index");
            let index = self.index.min(next.len());
            if let Err(err) = next.insert_at(index, block) {
                tracing::warn!(index, "image not inserted: {err}");
            }
        }
        (
            Change {
                blocks: next.into_blocks(),
                kind: ChangeKind::Structure,
            },
            id,
        )
    }
}
