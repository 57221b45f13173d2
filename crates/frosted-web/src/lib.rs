#![forbid(unsafe_code)]

//! WASM frontend for the frosted panel widget.
//!
//! [`FrostedPanel`] (wasm32 only) reads the panel configuration from DOM
//! attributes, waits for the background image, then keeps the panel size and
//! the SVG image transform in sync with the viewport. All layout decisions
//! are made by `frosted-layout`; this crate only measures and writes.
//!
//! ```text
//! const panel = FrostedPanel.mount();   // throws on invalid configuration
//! panel.lastLayoutJson();               // inspect the latest pass
//! ```
//!
//! The JS host drives nothing else: resize and load listeners are attached
//! by `mount` and live as long as the returned handle.

pub mod dom;

#[cfg(target_arch = "wasm32")]
mod console_log;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FrostedPanel;
