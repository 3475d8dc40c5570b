//! `actions` crate — the action/effect contract and the pure action interpreter.
//!
//! Everything a workflow can *do* to the page is described here: the tagged
//! [`Action`] union fetched from the backend, the [`InAppEffect`] artifacts
//! handed to the UI, and [`interpret`] which maps one to the other.  No I/O
//! lives in this crate.

pub mod context;
pub mod effect;
pub mod interpret;
pub mod model;

pub use context::{ItemContext, WorkflowContext};
pub use effect::{FormCorrelation, InAppEffect};
pub use interpret::{interpret, substitute_placeholders};
pub use model::{Action, EventName, ItemType, ModalButton, Severity};
