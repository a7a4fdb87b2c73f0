//! Per-image annotation storage.
//!
//! The store keeps one [`ImageAnnotations`] record per image of the
//! submission, index-aligned with the image list. Records are also keyed by
//! image reference so lookups survive a reordered list, but the index stays
//! the persisted contract.
//!
//! Every mutation publishes a new sequence: a snapshot taken before the
//! mutation is never changed afterwards, and the revision counter moves.

use std::sync::Arc;

use crate::model::{ImageAnnotations, Shape};

/// Index-aligned annotation records for one submission.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    records: Arc<Vec<ImageAnnotations>>,
    keys: Vec<String>,
    revision: u64,
}

impl AnnotationStore {
    /// Create a store with one empty record per image.
    pub fn new(keys: Vec<String>) -> Self {
        let records = vec![ImageAnnotations::default(); keys.len()];
        Self {
            records: Arc::new(records),
            keys,
            revision: 0,
        }
    }

    /// Create a store from a prior annotation sequence.
    ///
    /// Without a prior sequence every image starts empty. A sequence whose
    /// length does not match the image list is normalized: missing records
    /// are synthesized empty and surplus records are dropped.
    pub fn hydrate(keys: Vec<String>, prior: Option<Vec<ImageAnnotations>>) -> Self {
        let mut store = Self::new(keys);
        if let Some(records) = prior {
            store.replace_all(records);
            store.revision = 0;
        }
        store
    }

    fn normalize(&self, mut records: Vec<ImageAnnotations>) -> Vec<ImageAnnotations> {
        let expected = self.keys.len();
        if records.len() != expected {
            log::warn!(
                "Annotation sequence has {} records for {} images, normalizing",
                records.len(),
                expected
            );
        }
        if records.len() > expected {
            let dropped: usize = records[expected..].iter().map(ImageAnnotations::len).sum();
            if dropped > 0 {
                log::warn!("Dropping {} shapes recorded for images that no longer exist", dropped);
            }
        }
        records.resize_with(expected, ImageAnnotations::default);
        records
    }

    fn publish(&mut self, records: Vec<ImageAnnotations>) {
        self.records = Arc::new(records);
        self.revision += 1;
    }

    /// Append a shape to the record of `index`, materializing the record if
    /// it does not exist yet.
    pub fn append(&mut self, index: usize, shape: Shape) {
        let mut next = (*self.records).clone();
        if next.len() <= index {
            next.resize_with(index + 1, ImageAnnotations::default);
        }
        let kind = shape.type_name();
        next[index].annotations.push(shape);
        log::debug!(
            "Committed {} to image {} ({} shapes)",
            kind,
            index,
            next[index].len()
        );
        self.publish(next);
    }

    /// Remove all shapes of the record of `index`. Other records are untouched.
    pub fn clear(&mut self, index: usize) {
        let mut next = (*self.records).clone();
        if next.len() <= index {
            next.resize_with(index + 1, ImageAnnotations::default);
        }
        let removed = next[index].len();
        next[index].annotations.clear();
        log::debug!("Cleared {} shapes from image {}", removed, index);
        self.publish(next);
    }

    /// Replace the whole sequence, normalized to the current image list.
    pub fn replace_all(&mut self, records: Vec<ImageAnnotations>) {
        let next = self.normalize(records);
        self.publish(next);
    }

    /// Re-align the store with a changed image list.
    ///
    /// Records follow their image reference when it is still present; new
    /// images get empty records. References that appear several times are
    /// matched in order.
    pub fn rekey(&mut self, keys: Vec<String>) {
        let mut old: Vec<Option<ImageAnnotations>> = self.records.iter().cloned().map(Some).collect();
        let old_keys = std::mem::take(&mut self.keys);

        let next = keys
            .iter()
            .map(|key| {
                old_keys
                    .iter()
                    .enumerate()
                    .find(|(i, k)| *k == key && old.get(*i).is_some_and(Option::is_some))
                    .and_then(|(i, _)| old[i].take())
                    .unwrap_or_default()
            })
            .collect();

        self.keys = keys;
        self.publish(next);
    }

    /// Shapes of the record of `index`; empty if the record does not exist.
    pub fn get(&self, index: usize) -> &[Shape] {
        self.records
            .get(index)
            .map(|r| r.annotations.as_slice())
            .unwrap_or(&[])
    }

    /// Shapes of the image with the given reference.
    pub fn get_by_key(&self, key: &str) -> &[Shape] {
        self.index_of(key).map(|i| self.get(i)).unwrap_or(&[])
    }

    /// Index of the first image with the given reference.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Current sequence. Later mutations do not affect a returned snapshot.
    pub fn snapshot(&self) -> Arc<Vec<ImageAnnotations>> {
        Arc::clone(&self.records)
    }

    pub fn records(&self) -> &[ImageAnnotations] {
        &self.records
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counter bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total number of shapes across all images.
    pub fn total_shapes(&self) -> usize {
        self.records.iter().map(ImageAnnotations::len).sum()
    }
}
