//! The resource loader facade (component F): the single entry point an
//! application drives. Construction wires a [`ProviderRegistry`] and an
//! optional GL context; every subsequent call is either a `request_*` (adds
//! work) or [`Loader::update_and_process_all`] (does work).

use std::cell::RefCell;
use std::rc::Rc;

use resource_store::{BlobIo, PrepareStatus};

use crate::builders::{walk_value_tree, GlProgramBuilder, Mat4, Vec3};
use crate::gl::{GlContext, GlTextureParams};
use crate::handle::OwnedGlName;
use crate::pending::{LoadedPayload, PendingArena, Transition};
use crate::providers::ProviderRegistry;
use crate::request::{RequestId, RequestParams, ResourceKind, ResourceRequestResult, ResourceStatus};
use crate::signals::{LoadEvent, SignalBus};
use crate::{Locator, LoaderError};

type Submission = (Locator, ResourceKind, RequestParams);

/// A cheaply cloneable handle signal subscribers can capture to submit new
/// requests without borrowing the [`Loader`] itself.
///
/// This is the re-entrancy side-buffer the concurrency model calls for:
/// submissions made from inside a signal handler are queued here and only
/// drained at the start of the *next* [`Loader::update_and_process_all`]
/// call, never spliced into the arena mid-iteration.
#[derive(Clone, Default)]
pub struct SubmissionHandle {
    queue: Rc<RefCell<Vec<Submission>>>,
}

impl SubmissionHandle {
    pub fn submit(&self, kind: ResourceKind, params: impl Into<RequestParams>) {
        let params = params.into();
        let locator = params.locator.clone();
        self.queue.borrow_mut().push((locator, kind, params));
    }
}

/// Drives providers, the pending-request arena, and the signal bus as one
/// cooperative unit. Holds no threads, mutexes, or atomics: every method is
/// `&mut self` and does a bounded amount of work per call.
pub struct Loader {
    providers: ProviderRegistry,
    arena: PendingArena,
    signals: SignalBus,
    gl_ctx: Option<Rc<dyn GlContext>>,
    submissions: SubmissionHandle,
}

impl Loader {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self {
            providers,
            arena: PendingArena::new(),
            signals: SignalBus::new(),
            gl_ctx: None,
            submissions: SubmissionHandle::default(),
        }
    }

    pub fn with_gl_context(mut self, ctx: Rc<dyn GlContext>) -> Self {
        self.gl_ctx = Some(ctx);
        self
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&LoadEvent<'_>) + 'static) {
        self.signals.subscribe(handler);
    }

    /// Returns a handle signal subscribers can move into their closures to
    /// submit follow-up requests.
    pub fn submission_handle(&self) -> SubmissionHandle {
        self.submissions.clone()
    }

    fn submit(&mut self, kind: ResourceKind, params: impl Into<RequestParams>) -> ResourceRequestResult {
        let params = params.into();
        if !self.providers.has_resource(&params.locator) {
            // A request with no claiming provider is admitted into the
            // arena anyway, so its status is queryable like any other
            // request, but it is immediately terminal.
            let id = self.arena.insert(params.locator, kind, params.priority.unwrap_or(0));
            self.arena.not_found(id);
            return ResourceRequestResult { request_id: id, was_cancelled: true };
        }

        let id = self.arena.insert(params.locator.clone(), kind, params.priority.unwrap_or(0));
        if let Some(shader_type) = params.shader_type {
            self.arena.set_shader_type(id, shader_type);
        }
        match self.providers.get_resource_io(id, &params.locator) {
            Some(blob) => {
                self.arena.set_blob(id, blob);
                ResourceRequestResult::new(id)
            }
            None => {
                self.arena.fail(id, LoaderError::NotFound(params.locator));
                ResourceRequestResult { request_id: id, was_cancelled: true }
            }
        }
    }

    pub fn request_plain_text(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::PlainText, params)
    }

    pub fn request_string_list(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::StringList, params)
    }

    pub fn request_url_list(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::UrlList, params)
    }

    pub fn request_float_vector(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::FloatVector, params)
    }

    pub fn request_vec3_vector(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::Vec3Vector, params)
    }

    pub fn request_smooth_vec3_curve(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::SmoothVec3Curve, params)
    }

    pub fn request_mat4_vector(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::Mat4Vector, params)
    }

    pub fn request_value_tree(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::ValueTree, params)
    }

    /// Requests a resource whose JSON body will be mapped onto `T` by the
    /// caller via [`crate::builders::MappedStructBuilder`] once loaded;
    /// the arena stores the parsed tree generically, same as `ValueTree`.
    pub fn request_mapped_struct<T>(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        let _ = std::marker::PhantomData::<T>;
        self.submit(ResourceKind::MappedStruct, params)
    }

    pub fn request_shape_generator(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::ShapeGenerator, params)
    }

    pub fn request_gl_shape(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::GlShape, params)
    }

    pub fn request_geometry_and_bindings(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::GeometryAndBindings, params)
    }

    pub fn request_glsl_source(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::GlslSource, params)
    }

    pub fn request_gl_shader_include(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::GlShaderInclude, params)
    }

    /// Requests a single compiled shader. `params.shader_type` (set via
    /// [`RequestParams::with_shader_type`]) picks which GL stage to compile
    /// it as; a direct call that omits it compiles as a fragment shader, the
    /// same fallback `pending::materialize` applies.
    pub fn request_gl_shader(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::GlShader, params)
    }

    pub fn request_gl_buffer(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::GlBuffer, params)
    }

    pub fn request_gl_texture(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        self.submit(ResourceKind::GlTexture, params)
    }

    /// Requests a `.eagitexi` image entry that uploads into an
    /// already-requested texture. `texture_request` is the id an earlier
    /// [`Loader::request_gl_texture`] call returned — it need not have
    /// finished loading yet; the image request waits for it via the same
    /// continuation mechanism a generated cube-map face would use.
    pub fn request_gl_texture_image(
        &mut self,
        params: impl Into<RequestParams>,
        texture_request: RequestId,
    ) -> ResourceRequestResult {
        let result = self.submit(ResourceKind::GlTextureImage, params);
        self.arena.set_continuation(result.request_id, texture_request);
        result
    }

    /// Requests a linked GL program. Unlike every other `request_*` call
    /// this one cannot simply hand a blob to the arena and return: it must
    /// know the program descriptor's `shaders[]` entries *before* the
    /// request can be driven, so it can issue and track one child
    /// `request_gl_shader` per entry. The descriptor's own bytes are
    /// therefore read out eagerly here rather than through the cooperative
    /// pump — acceptable because `.eagiprog` bodies are small, pre-packaged
    /// config, not a generating source, but a blob that paces itself across
    /// several `prepare()` calls would stall this call rather than
    /// `update_and_process_all`.
    pub fn request_gl_program(&mut self, params: impl Into<RequestParams>) -> ResourceRequestResult {
        let params = params.into();
        if !self.providers.has_resource(&params.locator) {
            let id = self
                .arena
                .insert(params.locator, ResourceKind::GlProgram, params.priority.unwrap_or(0));
            self.arena.not_found(id);
            return ResourceRequestResult { request_id: id, was_cancelled: true };
        }

        let id = self.arena.insert(
            params.locator.clone(),
            ResourceKind::GlProgram,
            params.priority.unwrap_or(0),
        );
        let Some(mut blob) = self.providers.get_resource_io(id, &params.locator) else {
            self.arena.fail(id, LoaderError::NotFound(params.locator));
            return ResourceRequestResult { request_id: id, was_cancelled: true };
        };

        let descriptor = read_blob_fully(blob.as_mut()).and_then(|bytes| {
            let value: serde_json::Value = serde_json::from_slice(&bytes)
                .map_err(|e| LoaderError::ParseError { reason: e.to_string() })?;
            let mut builder = GlProgramBuilder::new();
            walk_value_tree(&value, &mut builder);
            builder.into_result().ok_or_else(|| LoaderError::ParseError {
                reason: "gl program descriptor did not finish".to_string(),
            })
        });

        let descriptor = match descriptor {
            Ok(descriptor) => descriptor,
            Err(err) => {
                self.arena.fail(id, err);
                return ResourceRequestResult { request_id: id, was_cancelled: true };
            }
        };

        let mut children = Vec::with_capacity(descriptor.shaders.len());
        for shader in &descriptor.shaders {
            match shader.locator.parse::<Locator>() {
                Ok(locator) => {
                    let result = self.submit(
                        ResourceKind::GlShader,
                        RequestParams::new(locator).with_shader_type(shader.shader_type),
                    );
                    children.push(result.request_id);
                }
                Err(_) => {
                    // A shader entry is a required child, not an optional
                    // field: an unparseable locator fails the whole program
                    // rather than linking with one missing.
                    self.arena.fail(
                        id,
                        LoaderError::ParseError {
                            reason: format!("invalid shader locator {:?}", shader.locator),
                        },
                    );
                    return ResourceRequestResult { request_id: id, was_cancelled: true };
                }
            }
        }
        self.arena.await_shader_children(id, descriptor, children);
        ResourceRequestResult::new(id)
    }

    pub fn status(&self, id: RequestId) -> Option<ResourceStatus> {
        self.arena.status(id)
    }

    pub fn error(&self, id: RequestId) -> Option<&LoaderError> {
        self.arena.error(id)
    }

    pub fn take_plain_text(&mut self, id: RequestId) -> Option<String> {
        match self.arena.take_payload(id)? {
            LoadedPayload::PlainText(s) => Some(s),
            _ => None,
        }
    }

    pub fn take_string_list(&mut self, id: RequestId) -> Option<Vec<String>> {
        match self.arena.take_payload(id)? {
            LoadedPayload::StringList(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_url_list(&mut self, id: RequestId) -> Option<Vec<Locator>> {
        match self.arena.take_payload(id)? {
            LoadedPayload::UrlList(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_float_vector(&mut self, id: RequestId) -> Option<Vec<f64>> {
        match self.arena.take_payload(id)? {
            LoadedPayload::FloatVector(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_vec3_vector(&mut self, id: RequestId) -> Option<Vec<Vec3>> {
        match self.arena.take_payload(id)? {
            LoadedPayload::Vec3Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Same payload shape as [`Loader::take_vec3_vector`]; kept as a
    /// separate accessor so a `request_smooth_vec3_curve` caller doesn't
    /// have to know the two kinds share a representation.
    pub fn take_smooth_vec3_curve(&mut self, id: RequestId) -> Option<Vec<Vec3>> {
        self.take_vec3_vector(id)
    }

    pub fn take_mat4_vector(&mut self, id: RequestId) -> Option<Vec<Mat4>> {
        match self.arena.take_payload(id)? {
            LoadedPayload::Mat4Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_value_tree(&mut self, id: RequestId) -> Option<serde_json::Value> {
        match self.arena.take_payload(id)? {
            LoadedPayload::ValueTree(v) => Some(v),
            _ => None,
        }
    }

    /// Takes a compiled/linked GL object (program, shader, or buffer,
    /// distinguishable via [`OwnedGlName::kind`]).
    pub fn take_gl_object(&mut self, id: RequestId) -> Option<OwnedGlName> {
        match self.arena.take_payload(id)? {
            LoadedPayload::GlObject(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_gl_texture(&mut self, id: RequestId) -> Option<(OwnedGlName, GlTextureParams)> {
        match self.arena.take_payload(id)? {
            LoadedPayload::GlTexture(name, params) => Some((name, params)),
            _ => None,
        }
    }

    /// Takes the raw bytes a `ShapeGenerator`/`GlShape`/`GeometryAndBindings`
    /// request produced — there is no builder for these kinds yet, so this
    /// is the provider's served bytes, not a parsed artifact.
    pub fn take_bytes(&mut self, id: RequestId) -> Option<Vec<u8>> {
        match self.arena.take_payload(id)? {
            LoadedPayload::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Drops a request from the arena regardless of its status. Safe to
    /// call on an id that was already swept; returns whether anything was
    /// actually removed.
    pub fn forget_resource(&mut self, id: RequestId) -> bool {
        self.arena.forget(id)
    }

    /// Advances every in-flight request by one bounded unit of work, then
    /// drains any requests queued through a [`SubmissionHandle`] during
    /// signal emission. Returns the number of requests that reached a
    /// terminal status this call.
    pub fn update_and_process_all(&mut self) -> usize {
        let mut newly_terminal = 0;

        for id in self.arena.ids() {
            let Some(transition) = self.arena.drive(id, self.gl_ctx.as_ref()) else {
                continue;
            };
            newly_terminal += 1;

            // Decided emission order: the typed `<kind>_loaded` signal fires
            // before the generic `StatusChanged` event, and the request is
            // only considered finished once both have gone out.
            if let Transition::Loaded = transition {
                self.emit_typed_loaded(id);
            }

            let status = self.arena.status(id).unwrap_or(ResourceStatus::Error);
            self.signals
                .emit(LoadEvent::StatusChanged { request_id: id, status });
        }

        let queued: Vec<Submission> = self.submissions.queue.borrow_mut().drain(..).collect();
        for (_, kind, params) in queued {
            self.submit(kind, params);
        }

        newly_terminal
    }

    fn emit_typed_loaded(&mut self, id: RequestId) {
        // Peek without consuming: the caller's own `take_*` call is the one
        // that actually removes the payload from the arena.
        match self.arena.kind(id) {
            Some(ResourceKind::PlainText) => {
                if let Some(text) = self.arena.peek_plain_text(id) {
                    self.signals
                        .emit(LoadEvent::PlainTextLoaded { request_id: id, text });
                }
            }
            Some(ResourceKind::StringList) => {
                if let Some(lines) = self.arena.peek_string_list(id) {
                    for line in lines {
                        self.signals
                            .emit(LoadEvent::StringLineLoaded { request_id: id, line });
                    }
                    self.signals
                        .emit(LoadEvent::StringListLoaded { request_id: id, lines });
                }
            }
            Some(ResourceKind::UrlList) => {
                if let Some(urls) = self.arena.peek_url_list(id) {
                    self.signals
                        .emit(LoadEvent::UrlListLoaded { request_id: id, urls });
                }
            }
            Some(ResourceKind::FloatVector) => {
                if let Some(values) = self.arena.peek_float_vector(id) {
                    self.signals
                        .emit(LoadEvent::FloatVectorLoaded { request_id: id, values });
                }
            }
            Some(ResourceKind::Vec3Vector) => {
                if let Some(values) = self.arena.peek_vec3_vector(id) {
                    self.signals
                        .emit(LoadEvent::Vec3VectorLoaded { request_id: id, values });
                }
            }
            Some(ResourceKind::SmoothVec3Curve) => {
                if let Some(values) = self.arena.peek_vec3_vector(id) {
                    self.signals
                        .emit(LoadEvent::SmoothVec3CurveLoaded { request_id: id, values });
                }
            }
            Some(ResourceKind::Mat4Vector) => {
                if let Some(values) = self.arena.peek_mat4_vector(id) {
                    self.signals
                        .emit(LoadEvent::Mat4VectorLoaded { request_id: id, values });
                }
            }
            Some(ResourceKind::ValueTree) => {
                if let Some(value) = self.arena.peek_value_tree(id) {
                    self.signals
                        .emit(LoadEvent::ValueTreeLoaded { request_id: id, value });
                }
            }
            Some(ResourceKind::MappedStruct) => {
                if let Some(value) = self.arena.peek_value_tree(id) {
                    self.signals
                        .emit(LoadEvent::MappedStructLoaded { request_id: id, value });
                }
            }
            Some(ResourceKind::GlslSource) => {
                if let Some(text) = self.arena.peek_plain_text(id) {
                    self.signals
                        .emit(LoadEvent::GlslSourceLoaded { request_id: id, text });
                }
            }
            Some(ResourceKind::GlShaderInclude) => {
                if let Some(text) = self.arena.peek_plain_text(id) {
                    self.signals
                        .emit(LoadEvent::GlShaderIncludeLoaded { request_id: id, text });
                }
            }
            Some(ResourceKind::GlShader) => {
                if let Some(shader) = self.arena.peek_gl_object(id) {
                    self.signals
                        .emit(LoadEvent::GlShaderLoaded { request_id: id, shader });
                }
            }
            Some(ResourceKind::GlProgram) => {
                if let Some(program) = self.arena.peek_gl_object(id) {
                    self.signals
                        .emit(LoadEvent::GlProgramLoaded { request_id: id, program });
                }
            }
            Some(ResourceKind::GlBuffer) => {
                if let Some(buffer) = self.arena.peek_gl_object(id) {
                    self.signals
                        .emit(LoadEvent::GlBufferLoaded { request_id: id, buffer });
                }
            }
            Some(ResourceKind::GlTexture) => {
                if let Some((texture, _params)) = self.arena.peek_gl_texture(id) {
                    self.signals
                        .emit(LoadEvent::GlTextureLoaded { request_id: id, texture });
                }
            }
            Some(ResourceKind::GlTextureImage) => {
                self.signals
                    .emit(LoadEvent::GlTextureImagesLoaded { request_id: id });
            }
            Some(ResourceKind::ShapeGenerator) => {
                if let Some(bytes) = self.arena.peek_bytes(id) {
                    self.signals
                        .emit(LoadEvent::ShapeGeneratorLoaded { request_id: id, bytes });
                }
            }
            Some(ResourceKind::GlShape) => {
                if let Some(bytes) = self.arena.peek_bytes(id) {
                    self.signals
                        .emit(LoadEvent::GlShapeLoaded { request_id: id, bytes });
                }
            }
            Some(ResourceKind::GeometryAndBindings) => {
                if let Some(bytes) = self.arena.peek_bytes(id) {
                    self.signals
                        .emit(LoadEvent::GlGeometryAndBindingsLoaded { request_id: id, bytes });
                }
            }
            Some(ResourceKind::Finished) | None => {}
        }
    }
}

/// Synchronously drains a blob expected to resolve eagerly (a file or
/// fixed-buffer body, never a multi-step generator): pumps `prepare()` in a
/// bounded loop and reads out every byte once finished. See
/// [`Loader::request_gl_program`] for why this one call can't simply wait
/// for the cooperative pump like every other `request_*`.
fn read_blob_fully(blob: &mut dyn BlobIo) -> Result<Vec<u8>, LoaderError> {
    const MAX_PUMPS: u32 = 10_000;
    for _ in 0..MAX_PUMPS {
        match blob.prepare()? {
            PrepareStatus::Working { .. } => continue,
            PrepareStatus::Finished => {
                let total = blob.total_size() as usize;
                let mut buffer = vec![0_u8; total];
                let mut offset = 0_usize;
                while offset < total {
                    match blob.fetch_fragment(offset as u64, &mut buffer[offset..])? {
                        0 => break,
                        n => offset += n,
                    }
                }
                buffer.truncate(offset);
                return Ok(buffer);
            }
            PrepareStatus::Failed => {
                return Err(LoaderError::ParseError {
                    reason: "blob source reported failure".to_string(),
                });
            }
        }
    }
    Err(LoaderError::ParseError {
        reason: "gl program descriptor did not resolve eagerly".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::test_support::FakeGlContext;
    use crate::gl::ShaderType;
    use crate::providers::{EmbeddedProvider, LoremIpsumProvider};
    use crate::request::RequestParams;

    #[test]
    fn plain_text_request_pumps_to_loaded_and_is_readable_once() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(LoremIpsumProvider));
        let mut loader = Loader::new(registry);

        let locator: Locator = "txt:///lorem_ipsum?repeat=1".parse().unwrap();
        let result = loader.request_plain_text(RequestParams::new(locator));
        assert!(!result.was_cancelled);

        loader.update_and_process_all();
        assert_eq!(loader.status(result.request_id), Some(ResourceStatus::Loaded));

        let text = loader.take_plain_text(result.request_id).unwrap();
        assert!(text.starts_with("Lorem ipsum"));
    }

    #[test]
    fn unclaimed_locator_is_immediately_not_found() {
        let registry = ProviderRegistry::new();
        let mut loader = Loader::new(registry);
        let locator: Locator = "txt:///nothing_here".parse().unwrap();

        let result = loader.request_plain_text(RequestParams::new(locator));
        assert!(result.was_cancelled);
        assert_eq!(loader.status(result.request_id), Some(ResourceStatus::NotFound));
    }

    #[test]
    fn signal_handler_can_queue_a_follow_up_request_via_submission_handle() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(LoremIpsumProvider));
        let mut loader = Loader::new(registry);

        let handle = loader.submission_handle();
        let triggered = Rc::new(RefCell::new(false));
        let triggered_clone = Rc::clone(&triggered);
        loader.subscribe(move |event| {
            if let LoadEvent::StatusChanged { status: ResourceStatus::Loaded, .. } = event {
                if !*triggered_clone.borrow() {
                    *triggered_clone.borrow_mut() = true;
                    handle.submit(
                        ResourceKind::PlainText,
                        RequestParams::new("txt:///lorem_ipsum?repeat=1".parse().unwrap()),
                    );
                }
            }
        });

        let first: Locator = "txt:///lorem_ipsum?repeat=1".parse().unwrap();
        loader.request_plain_text(RequestParams::new(first));
        loader.update_and_process_all();

        assert!(*triggered.borrow());
    }

    fn gl_registry() -> ProviderRegistry {
        let mut embedded = EmbeddedProvider::new();
        embedded.insert("vert", b"void main(){}");
        embedded.insert("frag", b"void main(){}");
        embedded.insert(
            "prog",
            br#"{"shaders":[{"url":"embedded:///vert","type":"vertex"},{"url":"embedded:///frag","type":"fragment"}]}"#,
        );
        embedded.insert("buf", br#"{"label":"vertices","data":[1,2,3,4]}"#);
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(embedded));
        registry
    }

    #[test]
    fn request_gl_program_resolves_children_and_links() {
        let mut loader = Loader::new(gl_registry()).with_gl_context(Rc::new(FakeGlContext::default()));

        let locator: Locator = "embedded:///prog".parse().unwrap();
        let result = loader.request_gl_program(RequestParams::new(locator));
        assert!(!result.was_cancelled);

        // Two bounded pumps: one to finish the shader children's blobs, one
        // to let the program's `AwaitingShaders` body observe them terminal.
        loader.update_and_process_all();
        loader.update_and_process_all();

        assert_eq!(loader.status(result.request_id), Some(ResourceStatus::Loaded));
        let program = loader.take_gl_object(result.request_id).unwrap();
        assert_eq!(program.kind(), crate::gl::GlObjectKind::Program);
    }

    #[test]
    fn request_gl_shader_honors_explicit_shader_type() {
        let mut loader = Loader::new(gl_registry()).with_gl_context(Rc::new(FakeGlContext::default()));

        let locator: Locator = "embedded:///frag".parse().unwrap();
        let result = loader.request_gl_shader(RequestParams::new(locator).with_shader_type(ShaderType::Fragment));
        loader.update_and_process_all();

        assert_eq!(loader.status(result.request_id), Some(ResourceStatus::Loaded));
        assert!(loader.take_gl_object(result.request_id).is_some());
    }

    #[test]
    fn request_gl_buffer_uploads_through_context() {
        let fake = Rc::new(FakeGlContext::default());
        let mut loader = Loader::new(gl_registry()).with_gl_context(Rc::clone(&fake) as Rc<dyn GlContext>);

        let locator: Locator = "embedded:///buf".parse().unwrap();
        let result = loader.request_gl_buffer(RequestParams::new(locator));
        loader.update_and_process_all();

        assert_eq!(loader.status(result.request_id), Some(ResourceStatus::Loaded));
        assert_eq!(fake.uploaded_buffers.borrow()[0].1, vec![1, 2, 3, 4]);
    }
}
