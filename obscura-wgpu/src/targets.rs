//! Render-target descriptors and the persistent accumulation buffer.

/// Per-frame description of the host's active color target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub hdr: bool,
}

/// What the history texture was last allocated as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistorySpec {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl HistorySpec {
    pub fn of(desc: &TargetDescriptor) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
        }
    }
}

/// The persistent accumulation/history image. Reallocated only when the
/// frame's target descriptor stops matching; otherwise the texture is reused
/// and its prior-frame content carries the temporal accumulation forward.
#[derive(Default)]
pub struct AccumulationHistory {
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    spec: Option<HistorySpec>,
}

impl AccumulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `ensure` would reallocate for this descriptor.
    pub fn needs_realloc(&self, desc: &TargetDescriptor) -> bool {
        self.spec != Some(HistorySpec::of(desc))
    }

    /// Make the history texture match the descriptor. Returns true when a
    /// (re)allocation happened, which also means prior history content was
    /// discarded and the blend must not read it this frame.
    pub fn ensure(&mut self, device: &wgpu::Device, desc: &TargetDescriptor) -> bool {
        if !self.needs_realloc(desc) {
            return false;
        }
        if let Some(old) = &self.spec {
            log::debug!(
                "reallocating accumulation history {}x{} {:?} -> {}x{} {:?}",
                old.width,
                old.height,
                old.format,
                desc.width,
                desc.height,
                desc.format
            );
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Accumulation History"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.texture = Some(texture);
        self.spec = Some(HistorySpec::of(desc));
        true
    }

    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.texture.as_ref()
    }

    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.view.as_ref()
    }

    pub fn spec(&self) -> Option<HistorySpec> {
        self.spec
    }

    /// Disposal entry point: drop the persistent GPU image.
    pub fn release(&mut self) {
        if self.spec.take().is_some() {
            log::debug!("releasing accumulation history");
        }
        self.texture = None;
        self.view = None;
    }

    #[cfg(test)]
    pub(crate) fn mark_allocated(&mut self, desc: &TargetDescriptor) {
        self.spec = Some(HistorySpec::of(desc));
    }
}

/// Transient color target, created fresh each frame (the host's allocator is
/// expected to pool these).
pub struct ColorTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

pub fn create_color_target(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    label: &str,
) -> ColorTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    ColorTarget {
        texture,
        view,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(width: u32, height: u32) -> TargetDescriptor {
        TargetDescriptor {
            width,
            height,
            format: wgpu::TextureFormat::Rgba16Float,
            hdr: true,
        }
    }

    #[test]
    fn test_fresh_history_needs_alloc() {
        let history = AccumulationHistory::new();
        assert!(history.needs_realloc(&desc(1280, 720)));
    }

    #[test]
    fn test_resize_reallocates_exactly_once() {
        let mut history = AccumulationHistory::new();
        history.mark_allocated(&desc(1280, 720));

        // Frames at the same size keep the buffer.
        assert!(!history.needs_realloc(&desc(1280, 720)));

        // Frame N+1 after a resize reallocates...
        let resized = desc(1920, 1080);
        assert!(history.needs_realloc(&resized));
        history.mark_allocated(&resized);

        // ...and only once: frame N+2 reuses it.
        assert!(!history.needs_realloc(&resized));
    }

    #[test]
    fn test_format_change_also_reallocates() {
        let mut history = AccumulationHistory::new();
        history.mark_allocated(&desc(800, 600));
        let degraded = TargetDescriptor {
            format: wgpu::TextureFormat::Rgba8Unorm,
            ..desc(800, 600)
        };
        assert!(history.needs_realloc(&degraded));
    }

    #[test]
    fn test_release_forgets_spec() {
        let mut history = AccumulationHistory::new();
        history.mark_allocated(&desc(640, 480));
        history.release();
        assert!(history.spec().is_none());
        assert!(history.needs_realloc(&desc(640, 480)));
    }
}
