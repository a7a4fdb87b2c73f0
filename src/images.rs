//! Image retrieval and transient image handles.
//!
//! Image bytes come from an [`ImageFetcher`], one reference at a time, in
//! submission order. Each successfully decoded image is held by an
//! [`ImageHandle`] registered with a [`HandleRegistry`]; dropping the handle
//! releases it. An [`ImageSet`] owns all handles of one fetch, so replacing
//! or dropping the set releases every handle on every path, including a
//! fetch that fails halfway.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::RgbaImage;

use crate::error::{FetchError, Result, SessionError};

/// Source of raw image bytes for an image reference.
pub trait ImageFetcher {
    fn fetch(&mut self, reference: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

impl<F> ImageFetcher for F
where
    F: FnMut(&str) -> std::result::Result<Vec<u8>, FetchError>,
{
    fn fetch(&mut self, reference: &str) -> std::result::Result<Vec<u8>, FetchError> {
        self(reference)
    }
}

/// Fetcher reading image references as paths below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageFetcher for DirectoryFetcher {
    fn fetch(&mut self, reference: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let path = self.root.join(reference.trim_start_matches('/'));
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound,
            _ => FetchError::Transport(format!("{}: {}", path.display(), e)),
        })
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    live: Cell<usize>,
    issued: Cell<u64>,
}

/// Tracks how many image handles are alive.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    inner: Rc<RegistryInner>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles acquired and not yet released.
    pub fn live(&self) -> usize {
        self.inner.live.get()
    }

    /// Total number of handles ever acquired.
    pub fn issued(&self) -> u64 {
        self.inner.issued.get()
    }

    fn acquire(&self) -> u64 {
        let id = self.inner.issued.get() + 1;
        self.inner.issued.set(id);
        self.inner.live.set(self.inner.live.get() + 1);
        id
    }

    fn release(&self) {
        self.inner.live.set(self.inner.live.get().saturating_sub(1));
    }
}

/// A decoded image held for display. Released when dropped.
#[derive(Debug)]
pub struct ImageHandle {
    id: u64,
    reference: String,
    pixels: RgbaImage,
    registry: HandleRegistry,
}

impl ImageHandle {
    /// Decode raw bytes and acquire a handle for the result.
    pub fn decode(
        reference: &str,
        bytes: &[u8],
        registry: &HandleRegistry,
    ) -> std::result::Result<Self, image::ImageError> {
        let pixels = image::load_from_memory(bytes)?.to_rgba8();
        let id = registry.acquire();

        log::debug!(
            "Acquired image handle {} for '{}' ({}x{})",
            id,
            reference,
            pixels.width(),
            pixels.height()
        );

        Ok(Self {
            id,
            reference: reference.to_string(),
            pixels,
            registry: registry.clone(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Intrinsic width in native pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Intrinsic height in native pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        self.registry.release();
        log::debug!("Released image handle {} for '{}'", self.id, self.reference);
    }
}

/// One image of the submission after fetching.
#[derive(Debug)]
pub enum LoadedImage {
    /// Bytes fetched and decoded
    Ready(ImageHandle),
    /// Bytes fetched but could not be decoded
    Failed { reference: String, reason: String },
}

impl LoadedImage {
    pub fn reference(&self) -> &str {
        match self {
            LoadedImage::Ready(handle) => handle.reference(),
            LoadedImage::Failed { reference, .. } => reference,
        }
    }

    pub fn handle(&self) -> Option<&ImageHandle> {
        match self {
            LoadedImage::Ready(handle) => Some(handle),
            LoadedImage::Failed { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadedImage::Ready(_))
    }
}

/// All images of one fetch, index-aligned with the submission's image list.
#[derive(Debug, Default)]
pub struct ImageSet {
    entries: Vec<LoadedImage>,
}

impl ImageSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetch and decode every reference in order, one at a time.
    ///
    /// A fetch failure aborts the remaining references; the handles acquired
    /// so far are released before the error is returned. A decode failure
    /// only marks that image as failed.
    pub fn fetch_all<F: ImageFetcher + ?Sized>(
        fetcher: &mut F,
        references: &[String],
        registry: &HandleRegistry,
    ) -> Result<Self> {
        let mut entries = Vec::with_capacity(references.len());

        for reference in references {
            let bytes = fetcher
                .fetch(reference)
                .map_err(|e| SessionError::fetch(reference.as_str(), e))?;

            let entry = match ImageHandle::decode(reference, &bytes, registry) {
                Ok(handle) => LoadedImage::Ready(handle),
                Err(e) => {
                    log::warn!("Failed to decode image '{}': {}", reference, e);
                    LoadedImage::Failed {
                        reference: reference.clone(),
                        reason: e.to_string(),
                    }
                }
            };
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> Option<&LoadedImage> {
        self.entries.get(index)
    }

    /// Handle of a successfully loaded image.
    pub fn handle(&self, index: usize) -> Option<&ImageHandle> {
        self.get(index).and_then(LoadedImage::handle)
    }

    /// Intrinsic size of a successfully loaded image.
    pub fn dimensions(&self, index: usize) -> Option<(u32, u32)> {
        self.handle(index).map(|h| (h.width(), h.height()))
    }

    /// Which images can be presented, index-aligned.
    pub fn availability(&self) -> Vec<bool> {
        self.entries.iter().map(LoadedImage::is_ready).collect()
    }

    /// Images that failed to decode, as `(index, reference, reason)`.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.entries.iter().enumerate().filter_map(|(i, e)| match e {
            LoadedImage::Failed { reference, reason } => Some((i, reference.as_str(), reason.as_str())),
            LoadedImage::Ready(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ready()).count()
    }
}
