/*!
# Scene3D Renderer

Frame-pipelined 3D scene renderer.

A `GraphicsScene` holds views, objects and sub-meshes in sparse pools and
renders every view once per `update()`, through a graphics device and a
resource manager supplied by the host.

## Frame

- **Visibility**: frustum culling of object bounding spheres
- **Shadow fit**: one light view-projection per view
- **Constant data**: view and instance blocks in rotating buffer sets
- **Passes**: ShadowDepth, DepthPrePass, BasePass, Composite

The device and resource interfaces are traits; backends provide concrete
types that implement them.
*/

// Internal modules
mod error;
pub mod camera;
pub mod config;
pub mod device;
pub mod log;
pub mod resource;
pub mod scene;
pub mod utils;

// Main scene3d namespace module
pub mod scene3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Scene facade
    pub use crate::scene::GraphicsScene;

    // Configuration
    pub use crate::config::{GraphicsConfig, ShadowFitMode, ShadowMode};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Device interface sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
