//! Contract with the rendering engine.
//!
//! The view never builds DOM or diffs trees itself. It asks the engine to
//! instantiate and destroy components, and to read or move scroll targets.

mod headless;

pub use headless::{HeadlessEngine, HeadlessInstance, ScrollHandle};

use std::fmt;

use crate::scroll::ScrollOffset;
use crate::types::fragment::{Fragment, InstanceId};

/// A live, stateful component occupant.
pub trait ComponentInstance {
    /// Identity of this instance.
    fn id(&self) -> InstanceId;
}

/// Services consumed from the rendering engine.
pub trait RenderEngine {
    /// Live instance type. Owned by whoever holds it; dropping it without
    /// [`RenderEngine::destroy`] leaks the engine-side state.
    type Instance: ComponentInstance;

    /// Weak handle to a scrollable element.
    type ScrollTarget: Clone + fmt::Debug;

    /// Creates the instance backing `fragment`.
    fn instantiate(&mut self, fragment: &Fragment) -> Self::Instance;

    /// Destroys an instance.
    fn destroy(&mut self, instance: Self::Instance);

    /// Scrollable element of a mounted instance, if it has one yet.
    fn scroll_target(&self, instance: &Self::Instance) -> Option<Self::ScrollTarget>;

    /// Current offset of `target`. `None` when the target is gone.
    fn scroll_offset(&self, target: &Self::ScrollTarget) -> Option<ScrollOffset>;

    /// Scrolls `target`. Returns false when the target is gone.
    fn scroll_to(&mut self, target: &Self::ScrollTarget, offset: ScrollOffset) -> bool;

    /// Asks the host to call back once the current update is applied.
    fn request_settle(&mut self) {}
}
