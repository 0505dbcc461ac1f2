//! World bounds and edge policies
//!
//! The playfield is an axis-aligned rectangle with its origin at the top-left
//! corner, y growing downward (screen space, as the cabinet draws it).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What happens to an entity that crosses the world edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Position wraps modulo the world size (Asteroids)
    Wrap,
    /// Position is clamped to the edge
    #[default]
    Clip,
    /// Crossing the edge kills the entity
    Lethal,
}

/// Result of applying an edge policy to one position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOutcome {
    /// Position is inside bounds (possibly after wrapping or clamping)
    Inside,
    /// Entity crossed a lethal edge
    Crossed,
}

/// Fixed playfield dimensions, read-only for the life of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    /// Default policy for groups that don't override it
    pub edge_policy: EdgePolicy,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32, edge_policy: EdgePolicy) -> Self {
        Self {
            width,
            height,
            edge_policy,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Closed-rectangle containment test
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }

    /// Clamp a point into the closed rectangle
    #[inline]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        pos.clamp(Vec2::ZERO, self.size())
    }

    /// Positive, finite width and height
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Place a point where `policy` allows it to rest: wrapped into
    /// `[0, size)` for wrap, clamped into the rectangle otherwise
    pub fn settle(&self, policy: EdgePolicy, pos: Vec2) -> Vec2 {
        match policy {
            EdgePolicy::Wrap => {
                Vec2::new(wrap_coord(pos.x, self.width), wrap_coord(pos.y, self.height))
            }
            EdgePolicy::Clip | EdgePolicy::Lethal => self.clamp(pos),
        }
    }

    /// Apply `policy` to a position (and velocity, which clip zeroes at the wall)
    pub fn apply(&self, policy: EdgePolicy, pos: &mut Vec2, vel: &mut Vec2) -> EdgeOutcome {
        match policy {
            EdgePolicy::Wrap => {
                pos.x = wrap_coord(pos.x, self.width);
                pos.y = wrap_coord(pos.y, self.height);
                EdgeOutcome::Inside
            }
            EdgePolicy::Clip => {
                let clamped = self.clamp(*pos);
                if clamped.x != pos.x {
                    vel.x = 0.0;
                }
                if clamped.y != pos.y {
                    vel.y = 0.0;
                }
                *pos = clamped;
                EdgeOutcome::Inside
            }
            EdgePolicy::Lethal => {
                if self.contains(*pos) {
                    EdgeOutcome::Inside
                } else {
                    EdgeOutcome::Crossed
                }
            }
        }
    }
}

/// Wrap a coordinate into `[0, size)`
///
/// `rem_euclid` can round up to exactly `size` for tiny negative inputs, so
/// that case folds back to zero.
#[inline]
pub fn wrap_coord(value: f32, size: f32) -> f32 {
    let wrapped = value.rem_euclid(size);
    if wrapped >= size { 0.0 } else { wrapped }
}
