//! Accumulation-buffer format negotiation.

/// Preference-ordered fallback list for the accumulation target: full
/// half-float precision, then packed floats, then the 8-bit formats every
/// backend can render to.
pub const ACCUMULATION_FORMATS: [wgpu::TextureFormat; 4] = [
    wgpu::TextureFormat::Rgba16Float,
    wgpu::TextureFormat::Rg11b10Ufloat,
    wgpu::TextureFormat::Rgba8Unorm,
    wgpu::TextureFormat::Bgra8Unorm,
];

/// Host capability query: can this format be used as a render attachment.
pub trait FormatProbe {
    fn is_render_format(&self, format: wgpu::TextureFormat) -> bool;
}

impl FormatProbe for wgpu::Adapter {
    fn is_render_format(&self, format: wgpu::TextureFormat) -> bool {
        self.get_texture_format_features(format)
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    }
}

/// Pick the accumulation format for this frame. The requested format wins
/// when it is renderable; otherwise the first supported fallback is used.
/// When nothing probes as supported the last fallback is still returned, so
/// callers always get a descriptor — precision degrades, rendering never
/// aborts.
pub fn negotiate_format(
    probe: &impl FormatProbe,
    requested: wgpu::TextureFormat,
) -> wgpu::TextureFormat {
    if probe.is_render_format(requested) {
        return requested;
    }
    for &format in &ACCUMULATION_FORMATS {
        if probe.is_render_format(format) {
            log::debug!("accumulation format {requested:?} unsupported, using {format:?}");
            return format;
        }
    }
    let last = ACCUMULATION_FORMATS[ACCUMULATION_FORMATS.len() - 1];
    log::warn!("no accumulation format probed as renderable, forcing {last:?}");
    last
}
