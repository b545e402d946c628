//! Hypotheses about hidden information and how events confirm or refute them.

mod deferred;
mod event_inference;
mod reasons;
mod sub_inference;
mod sub_reason;

pub use deferred::{DeferredRejections, settle_deferred};
pub use event_inference::{
    Acceptor, EventInference, InferenceParser, expect_events, inference_window, open_cases,
    reject_all, try_inferences,
};
pub use reasons::{AbilityReason, ItemReason, MoveTypeReason};
pub use sub_inference::SubInference;
pub use sub_reason::{DelayCallback, SubReason};
