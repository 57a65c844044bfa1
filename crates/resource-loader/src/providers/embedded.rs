use std::collections::BTreeMap;

use resource_store::{BlobIo, FixedBufferBlob};

use crate::{Locator, RequestId};

use super::ResourceProvider;

/// Serves resources baked into the binary at build time.
///
/// The URL's first path segment is an identifier looked up in the embedded
/// table; anything after that is ignored, matching the "first path segment
/// is an identifier" rule.
#[derive(Default)]
pub struct EmbeddedProvider {
    table: BTreeMap<String, &'static [u8]>,
}

impl EmbeddedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: &'static [u8]) -> &mut Self {
        self.table.insert(name.into(), data);
        self
    }

    fn key_for(locator: &Locator) -> &str {
        locator
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or("")
    }
}

impl ResourceProvider for EmbeddedProvider {
    fn has_resource(&self, locator: &Locator) -> bool {
        self.table.contains_key(Self::key_for(locator))
    }

    fn get_resource_io(&self, _request_id: RequestId, locator: &Locator) -> Option<Box<dyn BlobIo>> {
        self.table
            .get(Self::key_for(locator))
            .map(|data| Box::new(FixedBufferBlob::new(*data)) as Box<_>)
    }

    fn for_each_locator(&self, callback: &mut dyn FnMut(&str)) {
        for name in self.table.keys() {
            callback(&format!("embedded:///{name}"));
        }
    }
}
