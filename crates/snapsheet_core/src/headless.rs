//! Headless host for tests and scenario replay.
//!
//! Records every surface write instead of rendering. The host moves into the
//! controller; a cloned [`HeadlessHandle`] stays with the caller to inspect
//! writes and to change content metrics, mount state or viewport size
//! between inputs.

use std::cell::RefCell;
use std::rc::Rc;

use snapsheet_animation::StyleTarget;

use crate::boundary::ScrollMetrics;
use crate::surface::{SheetHost, SheetSurface, SheetTransform};

#[derive(Debug)]
struct HeadlessState {
    viewport_height: f32,
    content: Option<ScrollMetrics>,
    mounted: bool,
    reduced_motion: bool,
    /// Every transform written, oldest first
    transforms: Vec<SheetTransform>,
    transition: Option<String>,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            viewport_height: 800.0,
            content: None,
            mounted: true,
            reduced_motion: false,
            transforms: Vec::new(),
            transition: None,
        }
    }
}

/// Shared handle onto a [`HeadlessHost`]
#[derive(Debug, Clone, Default)]
pub struct HeadlessHandle {
    inner: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHandle {
    pub fn transform_writes(&self) -> usize {
        self.inner.borrow().transforms.len()
    }

    pub fn last_transform(&self) -> Option<SheetTransform> {
        self.inner.borrow().transforms.last().copied()
    }

    pub fn transition(&self) -> Option<String> {
        self.inner.borrow().transition.clone()
    }

    pub fn set_viewport_height(&self, height: f32) {
        self.inner.borrow_mut().viewport_height = height;
    }

    pub fn set_content(&self, content: Option<ScrollMetrics>) {
        self.inner.borrow_mut().content = content;
    }

    /// Move the content's scroll position, if content is present
    pub fn set_scroll_top(&self, scroll_top: f32) {
        if let Some(content) = self.inner.borrow_mut().content.as_mut() {
            content.scroll_top = scroll_top;
        }
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.inner.borrow_mut().mounted = mounted;
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.inner.borrow_mut().reduced_motion = reduced;
    }

    /// Set the transition style as the host page would, outside the controller
    pub fn set_base_transition(&self, transition: Option<&str>) {
        self.inner.borrow_mut().transition = transition.map(str::to_owned);
    }
}

/// Recording surface backed by a [`HeadlessHandle`]
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    handle: HeadlessHandle,
}

impl StyleTarget for HeadlessSurface {
    fn transition(&self) -> Option<String> {
        self.handle.inner.borrow().transition.clone()
    }

    fn set_transition(&mut self, transition: Option<&str>) {
        self.handle.inner.borrow_mut().transition = transition.map(str::to_owned);
    }
}

impl SheetSurface for HeadlessSurface {
    fn set_transform(&mut self, transform: SheetTransform) {
        tracing::trace!("HeadlessSurface: transform {}", transform);
        self.handle.inner.borrow_mut().transforms.push(transform);
    }
}

/// [`SheetHost`] that records instead of rendering
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    surface: HeadlessSurface,
    handle: HeadlessHandle,
}

impl HeadlessHost {
    /// Host with an 800px viewport and no content
    pub fn new() -> Self {
        let handle = HeadlessHandle::default();
        Self {
            surface: HeadlessSurface {
                handle: handle.clone(),
            },
            handle,
        }
    }

    pub fn with_viewport_height(self, height: f32) -> Self {
        self.handle.set_viewport_height(height);
        self
    }

    pub fn with_content(self, content: ScrollMetrics) -> Self {
        self.handle.set_content(Some(content));
        self
    }

    pub fn handle(&self) -> HeadlessHandle {
        self.handle.clone()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetHost for HeadlessHost {
    fn sheet_surface(&mut self) -> Option<&mut dyn SheetSurface> {
        if self.handle.inner.borrow().mounted {
            Some(&mut self.surface)
        } else {
            None
        }
    }

    fn content_metrics(&self) -> Option<ScrollMetrics> {
        self.handle.inner.borrow().content
    }

    fn viewport_height(&self) -> f32 {
        self.handle.inner.borrow().viewport_height
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.handle.inner.borrow().reduced_motion
    }
}
