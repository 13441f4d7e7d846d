pub mod event_submitter;
pub mod notification;
pub mod webhook_submitter;
