//! Compiled shader and vertex layout traits

/// Compiled vertex or pixel shader
pub trait Shader: Send + Sync {
    /// Debug name, empty by default
    fn name(&self) -> &str {
        ""
    }
}

/// Vertex layout description
///
/// The device builds (and caches) an input layout from the currently bound
/// vertex shader and this description.
pub trait VertexDescription: Send + Sync {}
