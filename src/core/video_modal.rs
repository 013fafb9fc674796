use crate::domain::events::ESCAPE;
use crate::domain::model::{ElementId, ModalState};
use crate::domain::ports::Document;
use crate::utils::error::{Result, SiteError};

pub const MODAL_SELECTOR: &str = "#videoModal";
pub const FRAME_SELECTOR: &str = "#videoFrame";
pub const TRIGGER_ATTRIBUTE: &str = "data-video-src";
pub const CLOSE_CLASS: &str = "video-close";

#[derive(Debug, Clone, Default)]
pub struct VideoModal {
    modal: Option<ElementId>,
    frame: Option<ElementId>,
    state: ModalState,
}

impl VideoModal {
    /// Never fails; missing elements are reported when the modal is used.
    pub fn attach<D: Document>(doc: &D) -> Self {
        Self {
            modal: doc.query(MODAL_SELECTOR),
            frame: doc.query(FRAME_SELECTOR),
            state: ModalState::default(),
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_wired(&self) -> bool {
        self.modal.is_some() && self.frame.is_some()
    }

    pub fn open<D: Document>(&mut self, doc: &mut D, source_url: &str) -> Result<()> {
        let (modal, frame) = self.elements()?;

        doc.set_attribute(frame, "src", source_url);
        doc.set_style(modal, "display", "flex");
        let body = doc.body();
        doc.set_style(body, "overflow", "hidden");

        self.state = ModalState {
            is_visible: true,
            media_src: source_url.to_string(),
        };
        tracing::debug!("video modal opened with {}", source_url);
        Ok(())
    }

    pub fn close<D: Document>(&mut self, doc: &mut D) -> Result<()> {
        let (modal, frame) = self.elements()?;

        // an emptied src is what stops the embedded player
        doc.set_attribute(frame, "src", "");
        doc.set_style(modal, "display", "none");
        let body = doc.body();
        doc.set_style(body, "overflow", "");

        self.state = ModalState::default();
        Ok(())
    }

    /// Handles a click anywhere on the page; only the backdrop itself and
    /// explicit triggers matter here.
    pub fn on_click<D: Document>(&mut self, doc: &mut D, target: ElementId) {
        let result = if let Some(src) = doc.attribute(target, TRIGGER_ATTRIBUTE) {
            self.open(doc, &src)
        } else if Some(target) == self.modal || doc.has_class(target, CLOSE_CLASS) {
            if !self.is_visible(doc) {
                return;
            }
            self.close(doc)
        } else {
            return;
        };

        if let Err(e) = result {
            tracing::error!("video modal unavailable: {}", e);
        }
    }

    pub fn on_key_down<D: Document>(&mut self, doc: &mut D, key: &str) {
        if key == ESCAPE && self.is_visible(doc) {
            if let Err(e) = self.close(doc) {
                tracing::error!("video modal unavailable: {}", e);
            }
        }
    }

    fn is_visible<D: Document>(&self, doc: &D) -> bool {
        self.modal
            .and_then(|m| doc.style(m, "display"))
            .as_deref()
            == Some("flex")
    }

    fn elements(&self) -> Result<(ElementId, ElementId)> {
        let modal = self.modal.ok_or_else(|| {
            tracing::error!("video modal element not found");
            SiteError::missing(MODAL_SELECTOR)
        })?;
        let frame = self.frame.ok_or_else(|| {
            tracing::error!("video frame element not found");
            SiteError::missing(FRAME_SELECTOR)
        })?;
        Ok((modal, frame))
    }
}
