// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scene settings file application.
//!
//! The settings file is a JSON object mapping entity names to parameter
//! blocks: `{pos, rot}` for objects, `{color, multiplier, ...}` plus
//! kind-specific fields for lights. Application is lenient — unknown
//! names and missing keys are skipped, so a settings file can address a
//! subset of the scene.

use std::path::Path;

use glam::Vec3;
use serde_json::Value;
use thiserror::Error;

use prism_common::Color;

use super::light::LightKind;
use super::Scene;

/// Errors from loading a scene settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings root must be a JSON object")]
    NotAnObject,
}

impl Scene {
    /// Apply a settings file to matching objects and lights by name.
    pub fn apply_settings(&mut self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let root: Value = serde_json::from_str(&text)?;
        let entries = root.as_object().ok_or(SettingsError::NotAnObject)?;

        for (name, data) in entries {
            if let Some(object) = self.find_object_mut(name) {
                if let Some(pos) = vec3_field(data, "pos") {
                    object.transform.set_position(pos);
                }
                if let Some(rot) = vec3_field(data, "rot") {
                    object.transform.set_rotation_euler(rot.x, rot.y, rot.z);
                }
            }

            if let Some(light) = self.find_light_mut(name) {
                apply_light(&mut light.kind, data);
            } else if self.find_object(name).is_none() {
                log::warn!("settings entry '{name}' matches no object or light");
            }
        }

        log::debug!("applied scene settings ({} entries)", entries.len());
        Ok(())
    }
}

fn apply_light(kind: &mut LightKind, data: &Value) {
    match kind {
        LightKind::Ambient { color, intensity } => {
            set_color(color, data, "color");
            set_f32(intensity, data, "multiplier");
        }
        LightKind::Directional {
            color,
            intensity,
            direction,
        } => {
            set_color(color, data, "color");
            set_f32(intensity, data, "multiplier");
            set_vec3(direction, data, "dir");
        }
        LightKind::Point {
            color,
            intensity,
            position,
            dist_atten_min,
            dist_atten_max,
        } => {
            set_color(color, data, "color");
            set_f32(intensity, data, "multiplier");
            set_vec3(position, data, "pos");
            set_f32(dist_atten_min, data, "distAttenMin");
            set_f32(dist_atten_max, data, "distAttenMax");
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
            set_color(color, data, "color");
            set_f32(intensity, data, "multiplier");
            set_vec3(position, data, "pos");
            set_vec3(direction, data, "dir");
            set_f32(ang_atten_min, data, "angAttenMin");
            set_f32(ang_atten_max, data, "angAttenMax");
            set_f32(dist_atten_min, data, "distAttenMin");
            set_f32(dist_atten_max, data, "distAttenMax");
        }
    }
}

fn number(v: &Value) -> Option<f32> {
    v.as_f64().map(|n| n as f32)
}

fn f32_field(data: &Value, key: &str) -> Option<f32> {
    number(data.get(key)?)
}

fn vec3_field(data: &Value, key: &str) -> Option<Vec3> {
    let arr = data.get(key)?.as_array()?;
    Some(Vec3::new(
        number(arr.first()?)?,
        number(arr.get(1)?)?,
        number(arr.get(2)?)?,
    ))
}

fn color_field(data: &Value, key: &str) -> Option<Color> {
    let arr = data.get(key)?.as_array()?;
    Some(Color::new(
        number(arr.first()?)?,
        number(arr.get(1)?)?,
        number(arr.get(2)?)?,
        arr.get(3).and_then(number).unwrap_or(1.0),
    ))
}

fn set_f32(slot: &mut f32, data: &Value, key: &str) {
    if let Some(v) = f32_field(data, key) {
        *slot = v;
    }
}

fn set_vec3(slot: &mut Vec3, data: &Value, key: &str) {
    if let Some(v) = vec3_field(data, key) {
        *slot = v;
    }
}

fn set_color(slot: &mut Color, data: &Value, key: &str) {
    if let Some(v) = color_field(data, key) {
        *slot = v;
    }
}
