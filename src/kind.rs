//! Resource Kinds
//!
//! The closed set of asset categories the cache manages. Each kind gets its
//! own slot storage and its own monotonic id counter inside the pool, so a
//! given slot's kind never changes across refills.

/// One category of cached asset.
///
/// Empty slots are represented structurally (`id == 0`, payload absent)
/// rather than with a sentinel variant, so payload matches stay exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    VectorImage,
    SpriteSheet,
    Shader,
    Font,
    Sound,
    Music,
    Model,
    VoxelFrameSet,
}

/// Number of resource kinds (one slot store per kind).
pub const KIND_COUNT: usize = 9;

impl ResourceKind {
    /// All kinds, in storage order.
    pub const ALL: [ResourceKind; KIND_COUNT] = [
        ResourceKind::Texture,
        ResourceKind::VectorImage,
        ResourceKind::SpriteSheet,
        ResourceKind::Shader,
        ResourceKind::Font,
        ResourceKind::Sound,
        ResourceKind::Music,
        ResourceKind::Model,
        ResourceKind::VoxelFrameSet,
    ];

    /// Index of this kind's store inside the pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Invokes a macro once with the full `(Variant, snake_name)` kind list.
///
/// Used to generate the per-kind diagnostic surface on the pool without
/// hand-writing nine near-identical method sets.
#[macro_export]
macro_rules! for_each_resource_kind {
    ($m:ident) => {
        $m! {
            (Texture, texture),
            (VectorImage, vector_image),
            (SpriteSheet, sprite_sheet),
            (Shader, shader),
            (Font, font),
            (Sound, sound),
            (Music, music),
            (Model, model),
            (VoxelFrameSet, voxel_frame_set),
        }
    };
}
