//! # Placement
//!
//! Optional position, rotation and scale applied to an instance when it
//! leaves its pool. Components left unset fall back to the template's
//! transform.

use oroboros_shared::{Quaternion, Transform, Vec3};

/// Where and how an acquired instance is placed.
///
/// ```rust,ignore
/// registry.acquire(SHADOW, Placement::none());
/// registry.acquire(GROUND, Placement::at(Vec3::new(1.0, 2.0, 3.0)));
/// registry.acquire(TRAP, Placement::at(pos).with_rotation(rot).with_scale(Vec3::splat(2.0)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    /// World position.
    pub position: Option<Vec3>,
    /// Orientation.
    pub rotation: Option<Quaternion>,
    /// Local scale.
    pub scale: Option<Vec3>,
}

impl Placement {
    /// No placement: the instance takes the template's transform.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            position: None,
            rotation: None,
            scale: None,
        }
    }

    /// Placement at `position`.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position: Some(position),
            rotation: None,
            scale: None,
        }
    }

    /// Sets the orientation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Quaternion) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Sets the scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Resolves against `defaults`.
    #[inline]
    #[must_use]
    pub fn resolve(&self, defaults: &Transform) -> Transform {
        Transform::new(
            self.position.unwrap_or(defaults.position),
            self.rotation.unwrap_or(defaults.rotation),
            self.scale.unwrap_or(defaults.scale),
        )
    }
}

impl From<Vec3> for Placement {
    fn from(position: Vec3) -> Self {
        Self::at(position)
    }
}

impl From<Transform> for Placement {
    fn from(transform: Transform) -> Self {
        Self::at(transform.position)
            .with_rotation(transform.rotation)
            .with_scale(transform.scale)
    }
}
