// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The programmable shader contract.
//!
//! Shaders are value types owned by the scene and shared between objects.
//! Before rasterization the frame driver calls [`Shader::prepare`] on the
//! main thread to bind per-object state (matrices, texture, lights), then
//! [`Shader::capture`]s an independent instance into the frame's
//! type-erased store so workers never touch live scene state. The store is
//! a `Vec<Box<dyn Shader>>` cleared wholesale at end of frame.
//!
//! Captured instances are invoked immutably from worker threads — every
//! worker rasterizes its own band of the same draw call — hence the
//! `Send + Sync` bound.

use std::sync::Arc;

use parking_lot::Mutex;

use prism_common::Color;

use crate::scene::{Scene, SceneObject};
use crate::vertex::Vertex;

/// A per-object vertex and pixel program.
pub trait Shader: Send + Sync {
    /// Bind this frame's per-object state. Main thread, before capture.
    fn prepare(&mut self, scene: &Scene, object: &SceneObject);

    /// Transform one input vertex into clip space.
    fn process_vertex(&self, input: &Vertex) -> Vertex;

    /// Shade one fragment. `input` carries perspective-corrected
    /// attributes; set `discard` to skip the depth/color write.
    fn process_pixel(&self, input: &Vertex, mip_level: f32, discard: &mut bool) -> Color;

    /// Value-copy this shader into an instance the renderer owns.
    fn capture(&self) -> Box<dyn Shader>;
}

/// Scene-side shader handle: mutable on the main thread, cloned per object.
pub type SharedShader = Arc<Mutex<dyn Shader>>;

/// Wrap a shader for scene ownership.
pub fn shared<S: Shader + 'static>(shader: S) -> SharedShader {
    Arc::new(Mutex::new(shader))
}
