// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scene lights.
//!
//! One uniform list of tagged variants; every light answers `apply` with
//! its contribution at a surface point. Distance and angular falloff use
//! quadratic ease-out over a `[min, max]` window.

use glam::Vec3;

use prism_common::Color;

/// A named scene light.
#[derive(Clone, Debug)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
}

/// Light variants and their parameters.
#[derive(Clone, Debug)]
pub enum LightKind {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        direction: Vec3,
    },
    Point {
        color: Color,
        intensity: f32,
        position: Vec3,
        dist_atten_min: f32,
        dist_atten_max: f32,
    },
    Spot {
        color: Color,
        intensity: f32,
        position: Vec3,
        direction: Vec3,
        ang_atten_min: f32,
        ang_atten_max: f32,
        dist_atten_min: f32,
        dist_atten_max: f32,
    },
}

impl Light {
    pub fn new(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Contribution of this light at a surface point with unit normal
    /// `surf_norm`. `eye_pos`/`eye_dir` are part of the contract for
    /// view-dependent models even where unused here.
    pub fn apply(&self, surf_pos: Vec3, surf_norm: Vec3, _eye_pos: Vec3, _eye_dir: Vec3) -> Color {
        match &self.kind {
            LightKind::Ambient { color, intensity } => *color * *intensity,

            LightKind::Directional {
                color,
                intensity,
                direction,
            } => {
                let cn = surf_norm.dot(-*direction);
                if cn < 0.0 {
                    return Color::CLEAR;
                }
                *color * (cn * intensity)
            }

            LightKind::Point {
                color,
                intensity,
                position,
                dist_atten_min,
                dist_atten_max,
            } => {
                let light_vec = surf_pos - *position;
                let len_sq = light_vec.length_squared();
                if len_sq > dist_atten_max * dist_atten_max {
                    return Color::CLEAR;
                }

                let dist = len_sq.sqrt();
                let light_dir = light_vec / dist;

                let cn = surf_norm.dot(-light_dir);
                if cn < 0.0 {
                    return Color::CLEAR;
                }

                let cd = falloff(dist, *dist_atten_min, *dist_atten_max);
                *color * (cd * cn * intensity)
            }

            LightKind::Spot {
                color,
                intensity,
                position,
                direction,
                ang_atten_min,
                ang_atten_max,
                dist_atten_min,
                dist_atten_max,
            } => {
                let light_vec = surf_pos - *position;
                let len_sq = light_vec.length_squared();
                if len_sq > dist_atten_max * dist_atten_max {
                    return Color::CLEAR;
                }
                if surf_norm.dot(-light_vec) < 0.0 {
                    return Color::CLEAR;
                }

                let dist = len_sq.sqrt();
                let light_dir = light_vec / dist;
                let cn = surf_norm.dot(-light_dir);

                // Cone angles are full-angle degrees; compare half-angles.
                let half_min = ang_atten_min.to_radians() * 0.5;
                let half_max = ang_atten_max.to_radians() * 0.5;

                let ang = direction.dot(light_dir).max(0.0).min(1.0).acos();
                if ang > half_max {
                    return Color::CLEAR;
                }

                let ca = falloff(ang, half_min, half_max);
                let cd = falloff(dist, *dist_atten_min, *dist_atten_max);
                *color * (ca * cd * cn * intensity)
            }
        }
    }
}

/// Quadratic ease-out from 1 at `lower` to 0 at `upper`.
fn falloff(x: f32, lower: f32, upper: f32) -> f32 {
    let t = normalized_clamp(x, lower, upper);
    1.0 - t * t
}

/// Map `x` into `[0, 1]` over the window `[lower, upper]`.
fn normalized_clamp(x: f32, lower: f32, upper: f32) -> f32 {
    if upper - lower <= f32::EPSILON {
        return if x < lower { 0.0 } else { 1.0 };
    }
    ((x - lower) / (upper - lower)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EYE: Vec3 = Vec3::ZERO;

    #[test]
    fn test_ambient_ignores_geometry() {
        let light = Light::new(
            "amb",
            LightKind::Ambient {
                color: Color::WHITE,
                intensity: 0.25,
            },
        );
        let c = light.apply(Vec3::new(9.0, 9.0, 9.0), Vec3::Y, EYE, Vec3::Z);
        assert!((c.r - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_directional_cosine_falloff() {
        let light = Light::new(
            "sun",
            LightKind::Directional {
                color: Color::WHITE,
                intensity: 1.0,
                direction: -Vec3::Y, // shining straight down
            },
        );
        // Normal facing the light: full contribution.
        let c = light.apply(Vec3::ZERO, Vec3::Y, EYE, Vec3::Z);
        assert!((c.r - 1.0).abs() < 1e-6);
        // Facing away: nothing.
        let c = light.apply(Vec3::ZERO, -Vec3::Y, EYE, Vec3::Z);
        assert_eq!(c, Color::CLEAR);
        // 60° incidence: cosine 0.5.
        let tilted = Vec3::new(3.0f32.sqrt() / 2.0, 0.5, 0.0);
        let c = light.apply(Vec3::ZERO, tilted, EYE, Vec3::Z);
        assert!((c.r - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_point_light_window() {
        let light = Light::new(
            "bulb",
            LightKind::Point {
                color: Color::WHITE,
                intensity: 1.0,
                position: Vec3::new(0.0, 5.0, 0.0),
                dist_atten_min: 4.0,
                dist_atten_max: 8.0,
            },
        );
        // Inside the min window: full cosine-weighted contribution.
        let near = light.apply(Vec3::new(0.0, 2.0, 0.0), Vec3::Y, EYE, Vec3::Z);
        assert!((near.r - 1.0).abs() < 1e-5);
        // Beyond max: cut off entirely.
        let far = light.apply(Vec3::new(0.0, -6.0, 0.0), Vec3::Y, EYE, Vec3::Z);
        assert_eq!(far, Color::CLEAR);
        // Between min and max: attenuated but nonzero.
        let mid = light.apply(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, EYE, Vec3::Z);
        assert!(mid.r > 0.0 && mid.r < 1.0);
    }

    #[test]
    fn test_spot_cone_cutoff() {
        let light = Light::new(
            "spot",
            LightKind::Spot {
                color: Color::WHITE,
                intensity: 1.0,
                position: Vec3::new(0.0, 4.0, 0.0),
                direction: -Vec3::Y,
                ang_atten_min: 40.0,
                ang_atten_max: 45.0,
                dist_atten_min: 8.0,
                dist_atten_max: 10.0,
            },
        );
        // Directly below, inside the cone.
        let inside = light.apply(Vec3::ZERO, Vec3::Y, EYE, Vec3::Z);
        assert!(inside.r > 0.9);
        // Far off-axis, outside the 22.5° half-angle.
        let outside = light.apply(Vec3::new(4.0, 0.0, 0.0), Vec3::Y, EYE, Vec3::Z);
        assert_eq!(outside, Color::CLEAR);
    }

    #[test]
    fn test_point_light_behind_surface_is_dark() {
        let light = Light::new(
            "bulb",
            LightKind::Point {
                color: Color::WHITE,
                intensity: 1.0,
                position: Vec3::new(0.0, -2.0, 0.0),
                dist_atten_min: 4.0,
                dist_atten_max: 8.0,
            },
        );
        let c = light.apply(Vec3::ZERO, Vec3::Y, EYE, Vec3::Z);
        assert_eq!(c, Color::CLEAR);
    }
}
