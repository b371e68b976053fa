//! htmlshot Capture Engine
//!
//! Turns a local HTML file into a PNG of its visible viewport by driving a
//! headless Chromium over the DevTools protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                CaptureSession                │
//! │                                              │
//! │  resolve input ──► render ──► output path    │
//! │   html/<file>       │          imgs/<stem>/  │
//! │                     ▼                        │
//! │           ┌───────────────────┐              │
//! │           │  RenderBackend    │              │
//! │           │  launch → page →  │              │
//! │           │  goto → idle →    │              │
//! │           │  screenshot       │              │
//! │           └───────────────────┘              │
//! └──────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod paths;
pub mod session;

pub use backend::{get_backend, BrowserSession, RenderBackend, RenderPage, Viewport};
pub use session::*;
