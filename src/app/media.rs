//! Background media decoding for the detail overlay.
//!
//! Media URLs in the catalog are resolved against the catalog file's
//! directory.  Only local files can be previewed; remote URLs are listed but
//! never fetched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::event::{AppEvent, EventSender};

/// Decoded previews are shrunk to fit this box before caching.
const PREVIEW_MAX: (u32, u32) = (320, 240);

/// Local file behind a media URL, or `None` for remote media.
pub fn resolve_media_path(catalog_dir: &Path, url: &str) -> Option<PathBuf> {
    if let Some(local) = url.strip_prefix("file://") {
        return Some(PathBuf::from(local));
    }
    if url.contains("://") || url.trim().is_empty() {
        return None;
    }
    Some(catalog_dir.join(url))
}

/// Decode `path` on the blocking pool and post the result as
/// [`AppEvent::MediaDecoded`].
pub fn spawn_decode(tx: EventSender, path: PathBuf) {
    tokio::task::spawn_blocking(move || {
        let t0 = std::time::Instant::now();
        let result = decode_preview(&path);
        tracing::debug!(
            path = %path.display(),
            ok = result.is_ok(),
            elapsed = ?t0.elapsed(),
            "media decoded"
        );
        let _ = tx.send(AppEvent::MediaDecoded { path, result });
    });
}

fn decode_preview(path: &Path) -> Result<Arc<image::RgbaImage>, String> {
    let img = image::open(path).map_err(|e| e.to_string())?;
    let (w, h) = PREVIEW_MAX;
    Ok(Arc::new(img.thumbnail(w, h).to_rgba8()))
}
