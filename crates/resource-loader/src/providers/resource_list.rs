use resource_store::{BlobIo, FixedBufferBlob};

use crate::{Locator, RequestId};

use super::ResourceProvider;

/// A self-describing index: serves `text:///resource_list`, whose body is
/// the newline-separated set of canonical URLs offered by every other
/// registered provider.
///
/// Built from a snapshot taken via [`super::ProviderRegistry::for_each_locator`]
/// over the providers registered *before* this one — register it last so the
/// snapshot is complete. (The original app streams this list progressively,
/// one provider per `prepare()` call; here the full list is small enough to
/// materialize up front as a `FixedBufferBlob`, which keeps the common case
/// — a handful of generated-texture and text providers — a single frame of
/// work instead of a multi-pump streaming process.)
pub struct ResourceListProvider {
    body: String,
}

impl ResourceListProvider {
    pub fn from_registry(registry: &super::ProviderRegistry) -> Self {
        let mut body = String::new();
        registry.for_each_locator(|url| {
            body.push_str(url);
            body.push('\n');
        });
        Self { body }
    }
}

impl ResourceProvider for ResourceListProvider {
    fn has_resource(&self, locator: &Locator) -> bool {
        locator.has_path("/resource_list")
    }

    fn get_resource_io(&self, _request_id: RequestId, _locator: &Locator) -> Option<Box<dyn BlobIo>> {
        Some(Box::new(FixedBufferBlob::from_str(self.body.clone())))
    }

    fn for_each_locator(&self, callback: &mut dyn FnMut(&str)) {
        callback("text:///resource_list");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LoremIpsumProvider;

    #[test]
    fn aggregates_preceding_providers_locators() {
        let mut registry = super::super::ProviderRegistry::new();
        registry.register(Box::new(LoremIpsumProvider));

        let list = ResourceListProvider::from_registry(&registry);
        let locator: Locator = "text:///resource_list".parse().unwrap();
        assert!(list.has_resource(&locator));

        let mut dummy: slotmap::SlotMap<RequestId, ()> = slotmap::SlotMap::with_key();
        let id = dummy.insert(());
        let blob = list.get_resource_io(id, &locator).unwrap();
        assert_eq!(blob.total_size(), 0, "LoremIpsumProvider has an open-ended URL space and contributes no canonical locators");
    }
}
