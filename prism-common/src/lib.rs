// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod color;
pub mod rect;

pub use color::{Color, Color32};
pub use rect::Rect;
