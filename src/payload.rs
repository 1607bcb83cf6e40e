//! Resource Payloads
//!
//! Kind-specific data held by a filled cache entry. Each kind is a variant
//! of [`ResourcePayload`], so creation and teardown logic is checked for
//! exhaustiveness at compile time when a kind is added.
//!
//! Payloads own their CPU-side buffers outright. Backend objects (GPU
//! textures, compiled programs, audio voices) are carried as opaque
//! [`BackendHandle`] ids, exclusively owned by the entry until the
//! reclamation sweep releases them through the [`crate::reclaim::ReclaimBackend`] seam.

use crate::kind::ResourceKind;

/// Opaque id of an object living in an external backend (GPU, audio mixer).
pub type BackendHandle = u64;

/// Pixel buffer plus optional uploaded GPU texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TexturePayload {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixel data, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
    pub gpu_texture: Option<BackendHandle>,
}

impl TexturePayload {
    /// CPU-only texture from raw RGBA8 pixels.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "texture pixel buffer length mismatch"
        );
        Self {
            width,
            height,
            pixels,
            gpu_texture: None,
        }
    }
}

/// Decoded vector path data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorImagePayload {
    /// Flattened path command stream.
    pub path_data: Vec<f32>,
    /// `[min_x, min_y, width, height]` of the source view box.
    pub view_box: [f32; 4],
}

/// Atlas frame table over a packed sprite texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteSheetPayload {
    /// `[x, y, w, h]` per frame, in atlas pixels.
    pub frames: Vec<[u32; 4]>,
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub gpu_texture: Option<BackendHandle>,
}

/// Shader sources plus the compiled program handle, if linked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderPayload {
    pub vertex_source: String,
    pub fragment_source: String,
    pub program: Option<BackendHandle>,
}

/// Rasterized glyph atlas and font metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontPayload {
    pub atlas_pixels: Vec<u8>,
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub glyph_count: u32,
    pub line_height: f32,
    pub atlas_texture: Option<BackendHandle>,
}

/// Fully decoded PCM clip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundPayload {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Streaming audio state; samples are pulled incrementally by the mixer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MusicPayload {
    pub sample_rate: u32,
    pub channels: u16,
    /// Decode position, in frames.
    pub stream_cursor: u64,
    pub voice: Option<BackendHandle>,
}

/// Mesh and skeleton data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPayload {
    /// Interleaved vertex attributes.
    pub vertex_data: Vec<f32>,
    pub indices: Vec<u32>,
    pub bone_count: u32,
    pub vertex_buffer: Option<BackendHandle>,
}

/// Per-frame voxel volumes of an animated voxel object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoxelFrameSetPayload {
    /// One densely packed volume per frame.
    pub frames: Vec<Vec<u8>>,
    /// `[x, y, z]` voxel dimensions shared by every frame.
    pub dimensions: [u32; 3],
}

/// Kind-specific data stored in a filled slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourcePayload {
    Texture(TexturePayload),
    VectorImage(VectorImagePayload),
    SpriteSheet(SpriteSheetPayload),
    Shader(ShaderPayload),
    Font(FontPayload),
    Sound(SoundPayload),
    Music(MusicPayload),
    Model(ModelPayload),
    VoxelFrameSet(VoxelFrameSetPayload),
}

impl ResourcePayload {
    /// The kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourcePayload::Texture(_) => ResourceKind::Texture,
            ResourcePayload::VectorImage(_) => ResourceKind::VectorImage,
            ResourcePayload::SpriteSheet(_) => ResourceKind::SpriteSheet,
            ResourcePayload::Shader(_) => ResourceKind::Shader,
            ResourcePayload::Font(_) => ResourceKind::Font,
            ResourcePayload::Sound(_) => ResourceKind::Sound,
            ResourcePayload::Music(_) => ResourceKind::Music,
            ResourcePayload::Model(_) => ResourceKind::Model,
            ResourcePayload::VoxelFrameSet(_) => ResourceKind::VoxelFrameSet,
        }
    }

    /// Approximate CPU-side footprint, for diagnostics.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        match self {
            ResourcePayload::Texture(t) => t.pixels.len(),
            ResourcePayload::VectorImage(v) => v.path_data.len() * size_of::<f32>(),
            ResourcePayload::SpriteSheet(s) => s.frames.len() * size_of::<[u32; 4]>(),
            ResourcePayload::Shader(s) => s.vertex_source.len() + s.fragment_source.len(),
            ResourcePayload::Font(f) => f.atlas_pixels.len(),
            ResourcePayload::Sound(s) => s.samples.len() * size_of::<i16>(),
            ResourcePayload::Music(_) => 0,
            ResourcePayload::Model(m) => {
                m.vertex_data.len() * size_of::<f32>() + m.indices.len() * size_of::<u32>()
            }
            ResourcePayload::VoxelFrameSet(v) => v.frames.iter().map(Vec::len).sum(),
        }
    }

    /// Backend objects this payload still holds, in release order.
    #[must_use]
    pub fn backend_handles(&self) -> Vec<BackendHandle> {
        match self {
            ResourcePayload::Texture(t) => t.gpu_texture.into_iter().collect(),
            ResourcePayload::SpriteSheet(s) => s.gpu_texture.into_iter().collect(),
            ResourcePayload::Shader(s) => s.program.into_iter().collect(),
            ResourcePayload::Font(f) => f.atlas_texture.into_iter().collect(),
            ResourcePayload::Music(m) => m.voice.into_iter().collect(),
            ResourcePayload::Model(m) => m.vertex_buffer.into_iter().collect(),
            ResourcePayload::VectorImage(_)
            | ResourcePayload::Sound(_)
            | ResourcePayload::VoxelFrameSet(_) => Vec::new(),
        }
    }
}
