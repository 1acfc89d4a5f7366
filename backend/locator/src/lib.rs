//! `scanfill-locator` — finds the scanned document image on the host page
//! and resolves it to an absolute, fragment-free reference.

pub mod normalize;

use tracing::debug;

use scanfill_core::{ImageProbe, ImageReference, Page, ScanfillError};

/// Locates the document image by walking an ordered probe list: designated
/// element id, then file-extension match, then partial-id match.
pub struct ImageLocator {
    probe: ImageProbe,
}

impl ImageLocator {
    pub fn new(probe: ImageProbe) -> Self {
        Self { probe }
    }

    /// Resolve the document image. `ImageNotFound` aborts the current run
    /// but is non-fatal to the process.
    pub async fn locate(&self, page: &dyn Page) -> Result<ImageReference, ScanfillError> {
        let raw = self
            .first_candidate(page)
            .await
            .map_err(|e| ScanfillError::Page(e.to_string()))?;

        let raw = match raw {
            Some(src) if !src.trim().is_empty() => src,
            _ => return Err(ScanfillError::ImageNotFound),
        };

        let page_url = page
            .current_url()
            .await
            .map_err(|e| ScanfillError::Page(e.to_string()))?;
        let address = normalize::absolutize(raw.trim(), &page_url)?;
        if address.is_empty() {
            return Err(ScanfillError::ImageNotFound);
        }

        debug!(raw = %raw, resolved = %address, "Resolved document image");
        Ok(ImageReference::new(address))
    }

    /// First probe that yields a non-empty source wins.
    async fn first_candidate(&self, page: &dyn Page) -> anyhow::Result<Option<String>> {
        if !self.probe.element_id.trim().is_empty() {
            if let Some(src) = page.image_source_by_id(&self.probe.element_id).await? {
                if !src.trim().is_empty() {
                    return Ok(Some(src));
                }
            }
        }
        if !self.probe.extensions.is_empty() {
            if let Some(src) = page.image_source_by_extension(&self.probe.extensions).await? {
                if !src.trim().is_empty() {
                    return Ok(Some(src));
                }
            }
        }
        if !self.probe.id_fragment.trim().is_empty() {
            if let Some(src) = page
                .image_source_by_id_fragment(&self.probe.id_fragment)
                .await?
            {
                if !src.trim().is_empty() {
                    return Ok(Some(src));
                }
            }
        }
        Ok(None)
    }
}
