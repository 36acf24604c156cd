//! Arrival-ordered annotation storage.

use super::annotation::{Annotation, AnnotationId, NewAnnotation, now_millis};
use super::category::AnnotationCategory;
use super::view::View;

/// Annotations for the currently open scan, in arrival order.
///
/// The store outlives individual render sessions: replacing the image source
/// does not touch it.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    next_id: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new annotation. Returns `None` if the content is blank.
    pub fn add(&mut self, mut draft: NewAnnotation) -> Option<AnnotationId> {
        let content = draft.content.trim();
        if content.is_empty() {
            return None;
        }
        draft.content = content.to_string();

        self.next_id += 1;
        let id = AnnotationId(self.next_id);
        self.annotations.push(Annotation::from_draft(id, draft, now_millis()));
        Some(id)
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// Remove an annotation by id.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id() == id)?;
        Some(self.annotations.remove(index))
    }

    /// All annotations in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations anchored on exactly this slice of this view.
    pub fn on_slice(&self, slice: u32, view: View) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.is_on(slice, view))
    }

    /// Number of annotations in a category.
    pub fn count_by_category(&self, category: AnnotationCategory) -> usize {
        self.annotations
            .iter()
            .filter(|a| a.category() == category)
            .count()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, CanvasPoint};

    fn draft(content: &str, slice: u32, view: View) -> NewAnnotation {
        NewAnnotation::new("Dr. Robert Smith", "Neurologist", content, AnnotationCategory::Finding)
            .with_anchor(Anchor::new(CanvasPoint::new(128.0, 156.0), slice, view))
    }

    #[test]
    fn test_ids_follow_arrival_order() {
        let mut store = AnnotationStore::new();
        let a = store.add(draft("first", 45, View::Axial)).unwrap();
        let b = store.add(draft("second", 45, View::Axial)).unwrap();
        assert!(a < b);
        let order: Vec<_> = store.iter().map(|a| a.content()).collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn test_blank_content_rejected() {
        let mut store = AnnotationStore::new();
        assert_eq!(store.add(draft("   ", 45, View::Axial)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_content_is_trimmed() {
        let mut store = AnnotationStore::new();
        let id = store.add(draft("  hyperintensity \n", 45, View::Axial)).unwrap();
        assert_eq!(store.get(id).unwrap().content(), "hyperintensity");
    }

    #[test]
    fn test_on_slice_filters_exact_pair() {
        let mut store = AnnotationStore::new();
        store.add(draft("axial", 45, View::Axial));
        let coronal = store.add(draft("coronal", 10, View::Coronal)).unwrap();
        store.add(draft("other slice", 11, View::Coronal));
        store.add(NewAnnotation::new("A", "B", "unanchored", AnnotationCategory::Note));

        let visible: Vec<_> = store.on_slice(10, View::Coronal).map(|a| a.id()).collect();
        assert_eq!(visible, vec![coronal]);
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut store = AnnotationStore::new();
        let a = store.add(draft("a", 1, View::Axial)).unwrap();
        store.remove(a);
        let b = store.add(draft("b", 1, View::Axial)).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count_by_category(AnnotationCategory::Finding), 1);
    }
}
