//! FLIP transitions, generated keyframe animations and animated scrolling
//! for document-based UIs.
//!
//! The usual flow:
//!
//! ```ignore
//! let animator = Animator::new(platform);
//! let before = animator.snapshot(&card)?;
//! // ... change classes, reflow ...
//! animator
//!     .from(&card, &before, 500.0, &FlipOptions::default())?
//!     .then(|| log::info!("card settled"));
//! ```
//!
//! All document access goes through [`platform::Platform`]; see
//! [`platform::headless`] for the in-memory implementation and the `web`
//! feature for the browser one.

pub mod animation;
pub mod callbacks;
pub mod error;
pub mod geometry;
pub mod platform;
pub mod transform;
pub mod transform_origin;

pub use animation::{Animator, AnimatorConfig};
pub use callbacks::CallbackChain;
pub use error::{Result, TransitionError};
pub use geometry::{Rect, Snapshot};

pub mod prelude {
    pub use crate::animation::{
        Align, AnimatorConfig, AspectRatio, Animator, FlipOptions, FrameSelector, KeyframeOptions,
        Keyframes, ScrollOptions, ScrollTarget, Source, Timing,
    };
    pub use crate::callbacks::CallbackChain;
    pub use crate::error::{Result, TransitionError};
    pub use crate::geometry::{Rect, Snapshot};
    pub use crate::platform::{Platform, ScrollContainer};
}
