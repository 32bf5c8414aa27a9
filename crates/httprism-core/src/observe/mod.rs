//! Request observation: status classification and the completion hook.

pub mod observer;
pub mod status;

pub use observer::{CompletedRequest, ObserverOpts, RequestHook, RequestObserver};
pub use status::{classify, StatusClass};
