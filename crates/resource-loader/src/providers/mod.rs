mod embedded;
mod file;
mod resource_list;
mod text;
mod texture_gen;

pub use embedded::EmbeddedProvider;
pub use file::FileProvider;
pub use resource_list::ResourceListProvider;
pub use text::LoremIpsumProvider;
pub use texture_gen::{CubemapSkyProvider, GeneratedTextureProvider, TextureGenerator};

use std::time::Duration;

use resource_store::BlobIo;

use crate::{Locator, RequestId};

/// Default timeout handed back when a provider does not override
/// `blob_timeout`.
pub const DEFAULT_BLOB_TIMEOUT: Duration = Duration::from_secs(30);
/// Default priority handed back when a provider does not override
/// `blob_priority`.
pub const DEFAULT_BLOB_PRIORITY: i32 = 0;

/// A component that claims URLs and produces [`BlobIo`] for them.
///
/// Every provider answers four questions: does it serve this URL
/// (`has_resource`), can it build a byte source for it (`get_resource_io`),
/// what timeout/priority should the transport use, and which canonical URLs
/// does it expose (`for_each_locator`, for the resource-list provider and
/// for discovery/debugging).
pub trait ResourceProvider {
    fn has_resource(&self, locator: &Locator) -> bool;

    /// Builds a [`BlobIo`] for `locator`. Only called after `has_resource`
    /// returned `true` for the same locator; returning `None` here (rather
    /// than from `has_resource`) signals a transient failure, not a
    /// not-found.
    fn get_resource_io(
        &self,
        request_id: RequestId,
        locator: &Locator,
    ) -> Option<Box<dyn BlobIo>>;

    fn blob_timeout(&self, _request_id: RequestId, _locator: &Locator, _size: u64) -> Duration {
        DEFAULT_BLOB_TIMEOUT
    }

    fn blob_priority(&self, _request_id: RequestId, _locator: &Locator, default: i32) -> i32 {
        default
    }

    /// Invokes `callback` once per canonical URL this provider can serve.
    /// The default no-op is appropriate for providers whose URL space is
    /// open-ended (e.g. the file provider over a large tree can override
    /// this; providers with a small, fixed surface should implement it).
    fn for_each_locator(&self, callback: &mut dyn FnMut(&str)) {
        let _ = callback;
    }
}

/// An ordered list of [`ResourceProvider`]s. Registration order is
/// precedence order: the first provider whose `has_resource` matches wins,
/// with no fallback if it later fails mid-stream.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn ResourceProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Box<dyn ResourceProvider>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    pub fn has_resource(&self, locator: &Locator) -> bool {
        self.providers.iter().any(|p| p.has_resource(locator))
    }

    pub fn get_resource_io(
        &self,
        request_id: RequestId,
        locator: &Locator,
    ) -> Option<Box<dyn BlobIo>> {
        self.providers
            .iter()
            .find(|p| p.has_resource(locator))
            .and_then(|p| p.get_resource_io(request_id, locator))
    }

    pub fn blob_timeout(&self, request_id: RequestId, locator: &Locator, size: u64) -> Duration {
        self.providers
            .iter()
            .find(|p| p.has_resource(locator))
            .map_or(DEFAULT_BLOB_TIMEOUT, |p| {
                p.blob_timeout(request_id, locator, size)
            })
    }

    pub fn blob_priority(&self, request_id: RequestId, locator: &Locator, default: i32) -> i32 {
        self.providers
            .iter()
            .find(|p| p.has_resource(locator))
            .map_or(default, |p| p.blob_priority(request_id, locator, default))
    }

    pub fn for_each_locator(&self, mut callback: impl FnMut(&str)) {
        for provider in &self.providers {
            provider.for_each_locator(&mut callback);
        }
    }

    pub fn providers(&self) -> &[Box<dyn ResourceProvider>] {
        &self.providers
    }
}
