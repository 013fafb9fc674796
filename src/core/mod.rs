pub mod contact_form;
pub mod menu;
pub mod replay;
pub mod runtime;
pub mod scroll_nav;
pub mod timer;
pub mod video_modal;

pub use crate::domain::events::{Dispatch, EventOutcome, PageEvent};
pub use crate::domain::model::{ContactPayload, ContactReply, ElementId, SubmitOutcome};
pub use crate::domain::ports::{ConfigProvider, ContactTransport, Document};
pub use crate::utils::error::Result;
