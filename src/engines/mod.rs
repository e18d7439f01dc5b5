// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod auto_scroll;
pub mod candidates;
pub mod chromium_renderer;
pub mod traits;
pub mod validators;
