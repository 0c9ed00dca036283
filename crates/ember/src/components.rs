//! # Gameplay Components
//!
//! Pure data attached to entities. The ECS core treats them as opaque
//! payloads; only the systems in [`crate::systems`] read their fields.
//!
//! Everything except [`Sprite`] is `#[repr(C)]` plain old data.

use std::ops::{Add, AddAssign, Mul};

use bytemuck::{Pod, Zeroable};
use ember_core::Component;
use serde::{Deserialize, Serialize};

/// 2D vector in world units.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unit scale
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Creates a new Vec2
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Converts to array
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Placement of an entity in world space.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Transform {
    /// Top-left corner in world units.
    pub position: Vec2,
    /// Per-axis scale factor.
    pub scale: Vec2,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
}

impl Component for Transform {}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// Creates an unrotated transform at `position`.
    #[inline]
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }

    /// Returns this transform with `scale` applied.
    #[inline]
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Returns this transform rotated to `degrees`.
    #[inline]
    #[must_use]
    pub const fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Linear motion, in world units per second.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RigidBody {
    /// Velocity in world units per second.
    pub velocity: Vec2,
}

impl Component for RigidBody {}

impl RigidBody {
    /// Creates a rigid body moving at `velocity`.
    #[inline]
    #[must_use]
    pub const fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

/// A textured quad.
///
/// Higher `z_index` draws on top. Sprites on the same layer keep the order
/// in which their entities joined the render system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sprite {
    /// Width in pixels before scaling.
    pub width: u32,
    /// Height in pixels before scaling.
    pub height: u32,
    /// Draw layer.
    pub z_index: i32,
    /// Asset identifier of the texture.
    pub texture: String,
}

impl Component for Sprite {}

impl Sprite {
    /// Creates a sprite on layer 0.
    #[must_use]
    pub fn new(texture: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            z_index: 0,
            texture: texture.into(),
        }
    }

    /// Returns this sprite moved to layer `z_index`.
    #[must_use]
    pub fn on_layer(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

/// Axis-aligned collision box relative to the entity's transform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BoxCollider {
    /// Box width in world units.
    pub width: f32,
    /// Box height in world units.
    pub height: f32,
    /// Offset of the box's top-left corner from the transform position.
    pub offset: Vec2,
}

impl Component for BoxCollider {}

impl BoxCollider {
    /// Creates an unoffset collider.
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// World-space `(min, max)` corners of the box, honoring the transform's scale.
    #[must_use]
    pub fn bounds(&self, transform: &Transform) -> (Vec2, Vec2) {
        let min = transform.position + self.offset;
        let size = Vec2::new(
            self.width * transform.scale.x,
            self.height * transform.scale.y,
        );
        (min, min + size)
    }

    /// Returns `true` if the two boxes overlap.
    #[must_use]
    pub fn overlaps(&self, transform: &Transform, other: &Self, other_transform: &Transform) -> bool {
        let (a_min, a_max) = self.bounds(transform);
        let (b_min, b_max) = other.bounds(other_transform);
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default_has_unit_scale() {
        let t = Transform::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn test_vec2_ops() {
        let mut v = Vec2::new(1.0, 2.0) + Vec2::new(3.0, 4.0) * 0.5;
        assert_eq!(v, Vec2::new(2.5, 4.0));
        v += Vec2::ONE;
        assert_eq!(v.to_array(), [3.5, 5.0]);
    }

    #[test]
    fn test_collider_bounds_and_overlap() {
        let collider = BoxCollider::new(10.0, 10.0);
        let a = Transform::at(Vec2::new(0.0, 0.0));
        let b = Transform::at(Vec2::new(5.0, 5.0));
        let c = Transform::at(Vec2::new(10.0, 0.0));

        assert_eq!(collider.bounds(&b), (Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0)));
        assert!(collider.overlaps(&a, &collider, &b));
        // Touching edges do not overlap
        assert!(!collider.overlaps(&a, &collider, &c));
    }

    #[test]
    fn test_collider_scales_with_transform() {
        let collider = BoxCollider {
            width: 4.0,
            height: 2.0,
            offset: Vec2::new(1.0, 1.0),
        };
        let t = Transform::at(Vec2::ZERO).with_scale(Vec2::new(2.0, 3.0));
        assert_eq!(collider.bounds(&t), (Vec2::ONE, Vec2::new(9.0, 7.0)));
    }

    #[test]
    fn test_sprite_builder() {
        let sprite = Sprite::new("tank.png", 32, 32).on_layer(2);
        assert_eq!(sprite.texture, "tank.png");
        assert_eq!(sprite.z_index, 2);
    }
}
