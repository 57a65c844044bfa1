use std::time::Duration;

use crate::gl::ShaderType;
use crate::Locator;

slotmap::new_key_type! {
    /// Dense, arena-backed identity of a pending request.
    ///
    /// Replaces the upstream `shared_ptr`/`weak_ptr` continuation chain: a
    /// continuation is stored as `Option<RequestId>` and looking it back up
    /// in the arena behaves like an expired weak pointer once the slot has
    /// been swept — the lookup simply returns `None`.
    pub struct RequestId;
}

/// The closed set of artifact kinds a pending request can terminate as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    PlainText,
    StringList,
    UrlList,
    FloatVector,
    Vec3Vector,
    SmoothVec3Curve,
    Mat4Vector,
    ValueTree,
    GlslSource,
    ShapeGenerator,
    GlShape,
    GeometryAndBindings,
    GlShaderInclude,
    GlShader,
    GlProgram,
    GlTextureImage,
    GlTexture,
    GlBuffer,
    MappedStruct,
    /// Sentinel used only as a garbage-collection marker inside the arena;
    /// never surfaced through the public API.
    Finished,
}

/// Terminal and in-flight lifecycle status of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    Loading,
    Loaded,
    Cancelled,
    NotFound,
    Error,
}

impl ResourceStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Parameters supplied to a `request_*` call.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub locator: Locator,
    pub max_time: Option<Duration>,
    pub priority: Option<i32>,
    /// Which stage a `request_gl_shader` call should compile its body as.
    /// Ignored for every other kind.
    pub shader_type: Option<ShaderType>,
}

impl RequestParams {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            max_time: None,
            priority: None,
            shader_type: None,
        }
    }

    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_shader_type(mut self, shader_type: ShaderType) -> Self {
        self.shader_type = Some(shader_type);
        self
    }
}

impl From<Locator> for RequestParams {
    fn from(locator: Locator) -> Self {
        Self::new(locator)
    }
}

/// Result of a `request_<kind>` call: the new request's identity plus
/// whether the loader's re-entrancy guard immediately cancelled it (e.g. the
/// locator was rejected by every provider at submission time).
#[derive(Debug, Clone, Copy)]
pub struct ResourceRequestResult {
    pub request_id: RequestId,
    pub was_cancelled: bool,
}

impl ResourceRequestResult {
    pub(crate) fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            was_cancelled: false,
        }
    }
}

/// Tracks a set of request ids and reports when every one of them has
/// reached a terminal status.
#[derive(Debug, Default, Clone)]
pub struct PendingResourceRequests {
    ids: Vec<RequestId>,
}

impl PendingResourceRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: RequestId) {
        self.ids.push(id);
    }

    pub fn ids(&self) -> &[RequestId] {
        &self.ids
    }

    /// Returns `true` once every tracked id has a terminal status according
    /// to `status_of`. An id the loader no longer knows about (already swept
    /// after `Finished`) counts as terminal.
    pub fn all_are_loaded(&self, status_of: impl Fn(RequestId) -> Option<ResourceStatus>) -> bool {
        self.ids
            .iter()
            .all(|&id| status_of(id).map_or(true, ResourceStatus::is_terminal))
    }
}
