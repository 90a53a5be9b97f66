// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::images::quad::TexCoordOrientation;

/**
Configuration shared by every [crate::images::gpu::GpuDrawing] implementation in this crate.

```
use edge_viewer::images::config::RenderConfig;
use edge_viewer::images::quad::TexCoordOrientation;

let config = RenderConfig {
    orientation: TexCoordOrientation::FlipVertical,
    ..RenderConfig::default()
};
assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// How frame rows map onto the screen.
    pub orientation: TexCoordOrientation,
    /// RGBA the target is cleared to before the quad is drawn.
    pub clear_color: [f64; 4],
    /// Label prefix for GPU objects, shown in graphics debuggers.
    pub debug_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            orientation: TexCoordOrientation::Upright,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            debug_name: "edge_viewer".to_string(),
        }
    }
}
