//! Graphics configuration consumed by the scene.
//!
//! Plain read-only values supplied by the host (settings file, command line,
//! editor preferences). The scene never writes back to it.

/// Shadow rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowMode {
    /// No shadow depth pass, no shadow sampling
    None,
    /// Single-tap shadow lookup
    #[default]
    Simple,
    /// Percentage-closer filtering with dithered taps
    PcfDithered,
}

impl ShadowMode {
    /// Whether this mode requires a shadow depth pass
    pub fn is_enabled(self) -> bool {
        self != ShadowMode::None
    }
}

/// Strategy used to fit the light frustum around the camera frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowFitMode {
    /// Axis-aligned light-space box around the clipped camera frustum
    #[default]
    Simple,
    /// Light-space perspective warp, falling back to `Simple` when the
    /// camera looks along the light direction
    LightSpacePerspective,
}

/// Scene-level graphics configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsConfig {
    /// Shadow rendering mode
    pub shadow_mode: ShadowMode,
    /// Requested shadow depth buffer resolution (square, in texels). Zero disables shadows.
    pub shadow_buffer_size: u32,
    /// Number of rotating constant buffer sets (CPU/GPU frame latency)
    pub buffer_set_count: usize,
    /// Light frustum fitting strategy
    pub shadow_fit: ShadowFitMode,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            shadow_mode: ShadowMode::Simple,
            shadow_buffer_size: 1024,
            buffer_set_count: 2,
            shadow_fit: ShadowFitMode::Simple,
        }
    }
}

impl GraphicsConfig {
    /// Whether the shadow depth pass should run at all
    pub fn shadows_enabled(&self) -> bool {
        self.shadow_mode.is_enabled() && self.shadow_buffer_size != 0
    }

    /// Buffer set count clamped to at least one set
    pub fn effective_buffer_set_count(&self) -> usize {
        self.buffer_set_count.max(1)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
