//! Scene-wide lighting: a hemispherical ambient term plus one directional light.

use glam::{Vec3, Vec4};
use super::shadow_fit::DEFAULT_LIGHT_DIRECTION;

/// Lighting parameters uploaded into every view's base-pass blocks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    ambient_top_color: Vec3,
    ambient_top_brightness: f32,
    ambient_bottom_color: Vec3,
    ambient_bottom_brightness: f32,

    directional_direction: Vec3,
    directional_color: Vec3,
    directional_brightness: f32,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            ambient_top_color: Vec3::ONE,
            ambient_top_brightness: 0.25,
            ambient_bottom_color: Vec3::ZERO,
            ambient_bottom_brightness: 0.0,
            directional_direction: DEFAULT_LIGHT_DIRECTION,
            directional_color: Vec3::ONE,
            directional_brightness: 1.0,
        }
    }
}

impl SceneLighting {
    pub fn set_ambient(
        &mut self,
        top_color: Vec3,
        top_brightness: f32,
        bottom_color: Vec3,
        bottom_brightness: f32,
    ) {
        self.ambient_top_color = top_color;
        self.ambient_top_brightness = top_brightness;
        self.ambient_bottom_color = bottom_color;
        self.ambient_bottom_brightness = bottom_brightness;
    }

    /// Set the directional light. A zero direction keeps the previous one.
    pub fn set_directional(&mut self, direction: Vec3, color: Vec3, brightness: f32) {
        self.directional_direction = direction.try_normalize().unwrap_or(self.directional_direction);
        self.directional_color = color;
        self.directional_brightness = brightness;
    }

    pub fn ambient_top_color(&self) -> Vec3 {
        self.ambient_top_color
    }

    pub fn ambient_top_brightness(&self) -> f32 {
        self.ambient_top_brightness
    }

    pub fn ambient_bottom_color(&self) -> Vec3 {
        self.ambient_bottom_color
    }

    pub fn ambient_bottom_brightness(&self) -> f32 {
        self.ambient_bottom_brightness
    }

    /// Unit direction the light travels in
    pub fn directional_direction(&self) -> Vec3 {
        self.directional_direction
    }

    pub fn directional_color(&self) -> Vec3 {
        self.directional_color
    }

    pub fn directional_brightness(&self) -> f32 {
        self.directional_brightness
    }

    /// Top ambient color premultiplied by its brightness, alpha 1
    pub fn ambient_top_radiance(&self) -> Vec4 {
        (self.ambient_top_color * self.ambient_top_brightness).extend(1.0)
    }

    /// Bottom ambient color premultiplied by its brightness, alpha 1
    pub fn ambient_bottom_radiance(&self) -> Vec4 {
        (self.ambient_bottom_color * self.ambient_bottom_brightness).extend(1.0)
    }

    /// Directional color premultiplied by its brightness, alpha 1
    pub fn directional_radiance(&self) -> Vec4 {
        (self.directional_color * self.directional_brightness).extend(1.0)
    }
}

#[cfg(test)]
#[path = "lighting_tests.rs"]
mod tests;
