//! factory-tint: factory-finish recoloring for isolated product photos
//!
//! Given a subject photo whose background is already transparent and a
//! target color, this library produces an image where the subject looks as
//! if it left the factory in that color, while glass, chrome, stickers and
//! deep shadows keep their true appearance.
//!
//! # Quick Start
//!
//! The [`Recolorer`] builder is the primary entry point:
//!
//! ```
//! use factory_tint::{PixelBuffer, Recolorer, TargetColor};
//!
//! let subject = PixelBuffer::filled(8, 8, [140, 60, 40, 255]).unwrap();
//! let color: TargetColor = "#0047AB".parse().unwrap();
//!
//! let painted = Recolorer::new().recolor(&subject, color).unwrap();
//! assert_eq!(painted.dimensions(), (8, 8));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! subject (RGBA, background alpha = 0)
//!     |
//!     v
//! [Normalize]        long edge <= 2000 px, Catmull-Rom on premultiplied alpha
//!     |
//!     +---> [Primer]  (L, L, L, A) with L = 0.299R + 0.587G + 0.114B
//!     |        |
//!     v        v
//! [Blend stages]     multiply / color / overlay / screen / soft-light
//!     |              on an accumulator that starts as the primer
//!     v
//! [Clip to subject]  alpha := original alpha, background copied through
//!     |
//!     v
//! [Protection mask]  out = tinted * (1 - p) + original * p
//!     |
//!     v
//! painted subject
//! ```
//!
//! Every stage is a pure buffer-to-buffer function; rows are processed in
//! parallel on the rayon pool. The stage list and mask thresholds are data,
//! carried by [`StagePolicy`].
//!
//! # Above the pipeline
//!
//! - [`TransitionController`]: debounces color requests so the rendered
//!   color only changes after a quiet period
//! - [`ResultGate`]: last-request-wins delivery for concurrent renders
//! - [`SubjectIsolator`]: seam for the external background remover
//! - [`Watermark`]: optional mark composited behind the subject

pub mod api;
pub mod blend;
pub mod buffer;
pub mod color;
pub mod gate;
pub mod isolate;
pub mod mask;
pub mod output;
pub mod policy;
pub mod preprocess;
pub mod transition;


pub use api::{PreparedSubject, Recolorer, TintError};
pub use blend::{tint, BlendMode, BlendStage, Operand};
pub use buffer::PixelBuffer;
pub use color::{luma, saturation, ParseColorError, Rgb, TargetColor};
pub use gate::{ResultGate, Ticket};
pub use isolate::{
    isolate_subject, AlphaPassthrough, IsolationError, IsolationProgress, SubjectIsolator,
};
pub use mask::{restore_protected_regions, GradedMask, MaskPolicy, SteppedMask};
pub use output::Watermark;
pub use policy::{StagePolicy, DEFAULT_PRESET, PRESET_NAMES};
pub use preprocess::{normalize, to_primer};
pub use transition::{
    RequestOutcome, TransitionController, TransitionState, DEFAULT_TRANSITION_DELAY,
};
