//! Presentation-side state owned by the console.
//!
//! The console never draws. It keeps the modal stack and selection slots,
//! builds banners and table models, and hands them to a `PresentationSink`.

pub mod banner;
pub mod modal;
pub mod selection;
pub mod sink;

pub use banner::{Banner, BannerKind, Notifier};
pub use modal::{Modal, ModalStack};
pub use selection::SelectionSlots;
pub use sink::{Kpi, LoginGate, PresentationSink, Readout, Row, Table};
