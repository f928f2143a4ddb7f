//! Embedded WGSL shader sources for the shutter pipeline stages.

pub const BLIT_SHADER: &str = include_str!("../shaders/blit.wgsl");
pub const DEPTH_DOWNSCALE_SHADER: &str = include_str!("../shaders/depth_downscale.wgsl");
pub const COC_SHADER: &str = include_str!("../shaders/coc.wgsl");
pub const TEMPORAL_SHADER: &str = include_str!("../shaders/temporal.wgsl");
pub const EXPOSURE_SHADER: &str = include_str!("../shaders/exposure.wgsl");
pub const COC_DEBUG_SHADER: &str = include_str!("../shaders/coc_debug.wgsl");
