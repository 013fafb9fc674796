use crate::domain::model::{ContactPayload, ContactReply, ElementId, ScrollBehavior};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The slice of a page's DOM and window the controllers are allowed to touch.
///
/// Style writes follow browser semantics: writing an empty value removes the
/// inline property.
pub trait Document {
    fn query(&self, selector: &str) -> Option<ElementId>;
    fn query_all(&self, selector: &str) -> Vec<ElementId>;
    /// The `<html>` element.
    fn root(&self) -> ElementId;
    fn body(&self) -> ElementId;

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);
    fn remove_attribute(&mut self, el: ElementId, name: &str);

    fn has_class(&self, el: ElementId, class: &str) -> bool;
    fn add_class(&mut self, el: ElementId, class: &str);
    fn remove_class(&mut self, el: ElementId, class: &str);

    fn style(&self, el: ElementId, property: &str) -> Option<String>;
    fn set_style(&mut self, el: ElementId, property: &str, value: &str);
    /// Drops the whole inline `style` attribute.
    fn clear_inline_style(&mut self, el: ElementId);

    fn text(&self, el: ElementId) -> String;
    fn set_text(&mut self, el: ElementId, text: &str);
    fn value(&self, el: ElementId) -> String;
    fn set_disabled(&mut self, el: ElementId, disabled: bool);
    fn reset_form(&mut self, form: ElementId);

    /// Top relative to the document.
    fn offset_top(&self, el: ElementId) -> f64;
    fn offset_height(&self, el: ElementId) -> f64;
    /// Top relative to the viewport (`getBoundingClientRect().top`).
    fn viewport_top(&self, el: ElementId) -> f64;

    fn inner_width(&self) -> f64;
    fn scroll_y(&self) -> f64;
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
    /// Scrolls so the element's start is aligned with the top of the viewport.
    fn scroll_into_view(&mut self, el: ElementId);
    /// Fragment of the current URL including the leading `#`, if any.
    fn location_hash(&self) -> Option<String>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ContactTransport {
    async fn send(&self, payload: &ContactPayload) -> Result<ContactReply>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> String;

    fn contact_endpoint(&self) -> String {
        format!("{}/api/contact", self.api_base_url())
    }

    fn health_endpoint(&self) -> String {
        format!("{}/health", self.api_base_url())
    }
}
