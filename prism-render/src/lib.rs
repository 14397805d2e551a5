// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tile-parallel CPU software rasterizer.
//!
//! The pipeline transforms indexed triangle meshes under a programmable
//! shader model into a shaded 2D image: per-object frustum culling, vertex
//! shading, homogeneous near/far clipping, viewport transform, screen-edge
//! clipping, then tile-parallel rasterization with perspective-correct
//! attribute interpolation, mipmapped texture sampling, depth testing, and
//! MSAA/SSAA resolve.
//!
//! [`context::RenderContext`] is the entry point: configure it, `clear`,
//! `draw` a [`scene::Scene`], and `present` the BGRA display buffer.

pub mod clip;
pub mod context;
pub mod framebuffer;
pub mod pipeline;
pub mod raster;
pub mod resolve;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod vertex;
pub mod worker;

pub use context::{AntiAliasingMode, PresentTarget, RasterizationMode, RenderContext};
pub use scene::{Camera, CullMode, Light, LightKind, Mesh, Scene, SceneObject, Sphere, Transform};
pub use shader::{Shader, SharedShader};
pub use texture::{FilterMode, Texture};
pub use vertex::Vertex;
