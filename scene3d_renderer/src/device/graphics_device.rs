//! Graphics device trait

use std::sync::Arc;
use crate::error::Result;
use super::buffer::{BufferDesc, ConstantBuffer};
use super::command_list::CommandList;
use super::quad_drawer::QuadDrawer;

/// Device availability reported at the start of each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Ready for rendering
    Ready,
    /// Lost; nothing can be rendered until the device can be reset
    Lost,
    /// Lost but resettable
    NotReset,
}

/// Graphics device consumed by the scene
///
/// Passed into `GraphicsScene::update` each frame. Implemented by the
/// backend (or by a recording mock in tests).
pub trait GraphicsDevice {
    /// Current device status
    fn status(&self) -> DeviceStatus;

    /// Attempt to reset a device in the `NotReset` state, returning the new status
    fn reset(&mut self) -> DeviceStatus;

    /// Create a CPU-writable constant buffer
    fn create_constant_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn ConstantBuffer>>;

    /// Immediate command list
    fn command_list(&mut self) -> &mut dyn CommandList;

    /// Screen-space quad drawer
    fn quad_drawer(&mut self) -> &mut dyn QuadDrawer;
}
