use std::cell::{Cell, RefCell};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::RgbaImage;
use log::debug;
use lru::LruCache;

use crate::error::Result;

/// Number of decoded images kept unless configured otherwise.
pub const IMAGE_CACHE_SIZE: usize = 32;

/// Decoded images keyed by path, least recently used evicted first.
///
/// Shared between drawings through an `Rc`; lookups only need `&self`.
pub struct ImageCache {
    inner: RefCell<LruCache<PathBuf, Rc<RgbaImage>>>,
    decodes: Cell<usize>,
}

impl ImageCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ImageCache {
            inner: RefCell::new(LruCache::new(cap)),
            decodes: Cell::new(0),
        }
    }

    /// Returns the decoded image at `path`, decoding it on first use.
    pub fn get(&self, path: &Path) -> Result<Rc<RgbaImage>> {
        if let Some(image) = self.inner.borrow_mut().get(path) {
            return Ok(image.clone());
        }
        let image = Rc::new(image::open(path)?.to_rgba8());
        self.decodes.set(self.decodes.get() + 1);
        debug!(
            "Decoded image {} ({} x {})",
            path.display(),
            image.width(),
            image.height()
        );
        self.inner
            .borrow_mut()
            .put(path.to_path_buf(), image.clone());
        Ok(image)
    }

    /// Number of decodes performed so far.
    pub fn decode_count(&self) -> usize {
        self.decodes.get()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.borrow().contains(path)
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().cap().get()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        ImageCache::new(IMAGE_CACHE_SIZE)
    }
}

impl fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("decodes", &self.decode_count())
            .finish()
    }
}
