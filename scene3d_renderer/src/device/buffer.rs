//! Buffer traits and buffer descriptor

use crate::error::Result;

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, read many times by the GPU
    Static,
    /// Rewritten by the CPU every frame
    Dynamic,
}

/// Mapping hint for buffer uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapHint {
    /// Previous contents are discarded; the device may rename the allocation
    Discard,
    /// Previous contents are preserved; only the written range changes
    NoOverwrite,
}

/// Descriptor for creating a constant buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Debug label shown by capture tools
    pub label: &'static str,
}

/// Vertex or index buffer owned by the mesh resource system
///
/// The scene only binds these; it never creates or writes them.
pub trait Buffer: Send + Sync {}

/// Constant (parameter) buffer created and rewritten by the scene
///
/// The buffer is destroyed when the last reference is dropped.
pub trait ConstantBuffer: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Debug label given at creation
    fn label(&self) -> &str;

    /// Map the buffer, copy `data` to its start, then unmap.
    ///
    /// `data` must not exceed `size()`.
    fn upload(&self, hint: MapHint, data: &[u8]) -> Result<()>;
}
