//! Resource loader: single-threaded, cooperatively pumped loading of typed
//! runtime resources (text, vectors, value trees, and GL objects) from a
//! registry of pluggable providers.
//!
//! Nothing in this crate spawns a thread, takes a lock, or uses an atomic.
//! [`Loader::update_and_process_all`] does a bounded amount of work per call
//! and is meant to be driven once per frame/tick by the owning application;
//! see the crate's design notes for why this shape was chosen over the
//! thread-pool-backed asset streaming it replaces.

#![warn(missing_docs)]

mod builders;
mod error;
mod gl;
mod handle;
mod loader;
mod locator;
mod pending;
mod providers;
mod request;
mod signals;

pub use builders::{
    CameraBuilder, CameraParams, FeedbackRule, FloatVectorBuilder, GlBufferBuilder,
    GlProgramBuilder, GlProgramDescriptor, GlTextureBuilder, GlTextureImageBuilder,
    InputSetupBuilder, Mat4, Mat4VectorBuilder, MappedStructBuilder, MessageId, PathSegment,
    ProgramInputBinding, ScalarValue, ShaderRef, SlotBinding, StreamingBuilder, UiInput, Vec3,
    Vec3VectorBuilder, ValuePath, walk_value_tree,
};
pub use error::{LoaderError, Result};
pub use gl::{
    GlContext, GlName, GlObjectKind, GlTextureImageParams, GlTextureParams, ShaderType,
};
pub use handle::OwnedGlName;
pub use loader::{Loader, SubmissionHandle};
pub use locator::Locator;
pub use pending::LoadedPayload;
pub use providers::{
    CubemapSkyProvider, EmbeddedProvider, FileProvider, GeneratedTextureProvider,
    LoremIpsumProvider, ProviderRegistry, ResourceListProvider, ResourceProvider,
    TextureGenerator,
};
pub use request::{
    PendingResourceRequests, RequestId, RequestParams, ResourceKind, ResourceRequestResult,
    ResourceStatus,
};
pub use signals::{LoadEvent, SignalBus};

#[cfg(any(test, feature = "test-support"))]
pub use gl::test_support;
