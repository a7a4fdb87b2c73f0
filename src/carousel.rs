//! Image carousel: which image of the submission is active.
//!
//! Indices are submission image indices. Images that could not be loaded are
//! never presented; navigation steps over them. Navigation is clamped, there
//! is no wraparound.

/// Active-image tracking over a submission's image list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carousel {
    presentable: Vec<bool>,
    current: Option<usize>,
}

impl Carousel {
    /// Carousel over `len` images, all presentable.
    pub fn new(len: usize) -> Self {
        Self::with_availability(vec![true; len])
    }

    /// Carousel over images with the given presentability.
    pub fn with_availability(presentable: Vec<bool>) -> Self {
        let current = presentable.iter().position(|p| *p);
        Self {
            presentable,
            current,
        }
    }

    /// Carousel presenting nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Active image index, `None` when nothing can be presented.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Number of images in the submission, presentable or not.
    pub fn len(&self) -> usize {
        self.presentable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presentable_count() == 0
    }

    /// Number of images that can be shown.
    pub fn presentable_count(&self) -> usize {
        self.presentable.iter().filter(|p| **p).count()
    }

    pub fn is_presentable(&self, index: usize) -> bool {
        self.presentable.get(index).copied().unwrap_or(false)
    }

    fn next_index(&self) -> Option<usize> {
        let current = self.current?;
        (current + 1..self.presentable.len()).find(|i| self.presentable[*i])
    }

    fn previous_index(&self) -> Option<usize> {
        let current = self.current?;
        (0..current).rev().find(|i| self.presentable[*i])
    }

    pub fn can_go_next(&self) -> bool {
        self.next_index().is_some()
    }

    pub fn can_go_previous(&self) -> bool {
        self.previous_index().is_some()
    }

    /// Move to the next presentable image. Returns whether the index changed.
    pub fn next(&mut self) -> bool {
        match self.next_index() {
            Some(i) => {
                self.current = Some(i);
                true
            }
            None => false,
        }
    }

    /// Move to the previous presentable image. Returns whether the index
    /// changed.
    pub fn previous(&mut self) -> bool {
        match self.previous_index() {
            Some(i) => {
                self.current = Some(i);
                true
            }
            None => false,
        }
    }

    /// Jump to `index` if it is presentable. Returns whether the index changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        if !self.is_presentable(index) || self.current == Some(index) {
            return false;
        }
        self.current = Some(index);
        true
    }

    /// Position label like "Image 2 of 3", counting presentable images only.
    pub fn progress(&self) -> String {
        let Some(current) = self.current else {
            return "No images".to_string();
        };
        let position = self.presentable[..=current].iter().filter(|p| **p).count();
        format!("Image {} of {}", position, self.presentable_count())
    }
}
