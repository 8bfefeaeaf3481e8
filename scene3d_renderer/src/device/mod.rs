//! Graphics device module - the interface the scene renders through

// Module declarations
pub mod buffer;
pub mod command_list;
pub mod graphics_device;
pub mod quad_drawer;
pub mod shader;
pub mod state;
pub mod texture;

// Re-exports
pub use buffer::*;
pub use command_list::*;
pub use graphics_device::*;
pub use quad_drawer::*;
pub use shader::*;
pub use state::*;
pub use texture::*;

// Recording device for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
