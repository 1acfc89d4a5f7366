//! `scanfill-notify` — renders operator feedback on the host page. Side
//! effect only; no business logic.

pub mod presenter;

pub use presenter::NotificationPresenter;
