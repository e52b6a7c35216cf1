use glam::{Vec3, Vec4};
use sceneview_object::{Capability, TypeTag};

/// Type tags for the renderable kinds. Backends register view-node
/// constructors against these.
pub mod tags {
    use sceneview_object::TypeTag;

    pub const OBJECT: TypeTag = TypeTag::new("Object");
    pub const PROP: TypeTag = TypeTag::new("Prop");
    pub const PROP3D: TypeTag = TypeTag::new("Prop3D");
    pub const ACTOR: TypeTag = TypeTag::new("Actor");
    pub const VOLUME: TypeTag = TypeTag::new("Volume");
    pub const VIEWPORT: TypeTag = TypeTag::new("Viewport");
    pub const RENDERER: TypeTag = TypeTag::new("Renderer");
    pub const RENDER_WINDOW: TypeTag = TypeTag::new("RenderWindow");
    pub const ABSTRACT_MAPPER: TypeTag = TypeTag::new("AbstractMapper");
    pub const MAPPER: TypeTag = TypeTag::new("Mapper");
    pub const VOLUME_MAPPER: TypeTag = TypeTag::new("VolumeMapper");
    pub const CAMERA: TypeTag = TypeTag::new("Camera");
}

/// Property names.
pub mod props {
    pub const VISIBILITY: &str = "visibility";
    pub const PICKABLE: &str = "pickable";
    pub const POSITION: &str = "position";
    pub const ORIENTATION: &str = "orientation";
    pub const SCALE: &str = "scale";
    pub const FORCE_OPAQUE: &str = "force_opaque";
    pub const BLEND_MODE: &str = "blend_mode";
    pub const BACKGROUND: &str = "background";
    pub const VIEWPORT: &str = "viewport";
    pub const TRANSPARENT: &str = "transparent";
    pub const PRESERVE_DEPTH_BUFFER: &str = "preserve_depth_buffer";
    pub const PRESERVE_COLOR_BUFFER: &str = "preserve_color_buffer";
    pub const LAYER: &str = "layer";
    pub const INTERACTIVE: &str = "interactive";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const SCALAR_VISIBILITY: &str = "scalar_visibility";
    pub const SAMPLE_DISTANCE: &str = "sample_distance";
    pub const FOCAL_POINT: &str = "focal_point";
    pub const VIEW_UP: &str = "view_up";
    pub const VIEW_ANGLE: &str = "view_angle";
    pub const PARALLEL_PROJECTION: &str = "parallel_projection";
    pub const NAME: &str = "name";
}

/// The renderable kinds the scene knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderableKind {
    RenderWindow,
    Renderer,
    Actor,
    Volume,
    Mapper,
    VolumeMapper,
    Camera,
}

impl RenderableKind {
    pub const ALL: [RenderableKind; 7] = [
        Self::RenderWindow,
        Self::Renderer,
        Self::Actor,
        Self::Volume,
        Self::Mapper,
        Self::VolumeMapper,
        Self::Camera,
    ];

    /// Most-derived tag of this kind.
    pub fn tag(self) -> TypeTag {
        match self {
            Self::RenderWindow => tags::RENDER_WINDOW,
            Self::Renderer => tags::RENDERER,
            Self::Actor => tags::ACTOR,
            Self::Volume => tags::VOLUME,
            Self::Mapper => tags::MAPPER,
            Self::VolumeMapper => tags::VOLUME_MAPPER,
            Self::Camera => tags::CAMERA,
        }
    }

    /// Capabilities in composition order, least-derived first.
    pub fn capabilities(self) -> Vec<Capability> {
        let mut caps = vec![object()];
        match self {
            Self::RenderWindow => caps.push(render_window()),
            Self::Renderer => caps.extend([viewport(), renderer()]),
            Self::Actor => caps.extend([prop(), prop3d(), actor()]),
            Self::Volume => caps.extend([prop(), prop3d(), volume()]),
            Self::Mapper => caps.extend([abstract_mapper(), mapper()]),
            Self::VolumeMapper => caps.extend([abstract_mapper(), volume_mapper()]),
            Self::Camera => caps.push(camera()),
        }
        caps
    }
}

fn object() -> Capability {
    Capability::new(tags::OBJECT).with(props::NAME, "")
}

fn prop() -> Capability {
    Capability::new(tags::PROP)
        .with(props::VISIBILITY, true)
        .with(props::PICKABLE, true)
}

fn prop3d() -> Capability {
    Capability::new(tags::PROP3D)
        .with(props::POSITION, Vec3::ZERO)
        .with(props::ORIENTATION, Vec3::ZERO)
        .with(props::SCALE, Vec3::ONE)
}

fn actor() -> Capability {
    Capability::new(tags::ACTOR).with(props::FORCE_OPAQUE, false)
}

fn volume() -> Capability {
    Capability::new(tags::VOLUME).with(props::BLEND_MODE, "composite")
}

fn viewport() -> Capability {
    Capability::new(tags::VIEWPORT)
        .with(props::BACKGROUND, Vec3::ZERO)
        .with(props::VIEWPORT, Vec4::new(0.0, 0.0, 1.0, 1.0))
}

fn renderer() -> Capability {
    Capability::new(tags::RENDERER)
        .with(props::TRANSPARENT, false)
        .with(props::PRESERVE_DEPTH_BUFFER, false)
        .with(props::PRESERVE_COLOR_BUFFER, false)
        .with(props::LAYER, 0_i64)
        .with(props::INTERACTIVE, true)
}

fn render_window() -> Capability {
    Capability::new(tags::RENDER_WINDOW)
        .with(props::WIDTH, 300_i64)
        .with(props::HEIGHT, 300_i64)
}

fn abstract_mapper() -> Capability {
    Capability::new(tags::ABSTRACT_MAPPER)
}

fn mapper() -> Capability {
    Capability::new(tags::MAPPER).with(props::SCALAR_VISIBILITY, true)
}

fn volume_mapper() -> Capability {
    Capability::new(tags::VOLUME_MAPPER).with(props::SAMPLE_DISTANCE, 1.0)
}

fn camera() -> Capability {
    Capability::new(tags::CAMERA)
        .with(props::POSITION, Vec3::new(0.0, 0.0, 1.0))
        .with(props::FOCAL_POINT, Vec3::ZERO)
        .with(props::VIEW_UP, Vec3::Y)
        .with(props::VIEW_ANGLE, 30.0)
        .with(props::PARALLEL_PROJECTION, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_derived_capability_matches_tag() {
        for kind in RenderableKind::ALL {
            let caps = kind.capabilities();
            assert_eq!(caps.last().unwrap().tag(), kind.tag());
            assert_eq!(caps.first().unwrap().tag(), tags::OBJECT);
        }
    }

    #[test]
    fn mappers_share_the_abstract_tag() {
        for kind in [RenderableKind::Mapper, RenderableKind::VolumeMapper] {
            let caps = kind.capabilities();
            assert!(caps.iter().any(|c| c.tag() == tags::ABSTRACT_MAPPER));
        }
    }
}
