// Adapters layer: concrete hosts for the controllers (in-memory page, browser page, contact backend).

pub mod http;
pub mod memory_dom;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;
