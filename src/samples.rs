//! Bundled sample scans offered on the gallery screen.

use crate::model::SourceInput;

/// A sample scan with an optional overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleImage {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Modality shown as a badge, e.g. "MRI"
    pub modality: &'static str,
    pub image_url: &'static str,
    pub overlay_url: Option<&'static str>,
}

impl SampleImage {
    pub fn image_input(&self) -> SourceInput {
        SourceInput::url(self.image_url)
    }

    pub fn overlay_input(&self) -> SourceInput {
        self.overlay_url.map(SourceInput::url).unwrap_or_default()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay_url.is_some()
    }
}

pub const SAMPLES: &[SampleImage] = &[
    SampleImage {
        id: "mni152",
        title: "MNI152 Brain Template",
        description: "Standard T1-weighted brain template",
        modality: "MRI",
        image_url: "https://niivue.github.io/niivue/images/mni152.nii.gz",
        overlay_url: None,
    },
    SampleImage {
        id: "hippocampus",
        title: "Hippocampus Segmentation",
        description: "Brain MRI with hippocampus segmentation overlay",
        modality: "MRI",
        image_url: "/hippo-ori.nii.gz",
        overlay_url: Some("/hippo-segmentasi.nii.gz"),
    },
];

/// Look up a sample by id.
pub fn find(id: &str) -> Option<&'static SampleImage> {
    SAMPLES.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SourceSlot, VolumeSource};

    #[test]
    fn test_sample_ids_unique() {
        for (i, a) in SAMPLES.iter().enumerate() {
            assert!(SAMPLES.iter().skip(i + 1).all(|b| b.id != a.id));
        }
    }

    #[test]
    fn test_sample_sources_resolve() {
        for sample in SAMPLES {
            let image = sample.image_input().resolve(SourceSlot::Image).unwrap();
            assert!(matches!(image, Some(VolumeSource::Url(_))));
            let overlay = sample.overlay_input().resolve(SourceSlot::Overlay).unwrap();
            assert_eq!(overlay.is_some(), sample.has_overlay());
        }
    }

    #[test]
    fn test_find() {
        let hippocampus = find("hippocampus").unwrap();
        assert_eq!(hippocampus.overlay_url, Some("/hippo-segmentasi.nii.gz"));
        assert!(find("ct-chest").is_none());
    }
}
