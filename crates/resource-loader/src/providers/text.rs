use resource_store::{BlobIo, FixedBufferBlob};

use crate::{Locator, RequestId};

use super::ResourceProvider;

const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \
Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris \
nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor \
in reprehenderit in voluptate velit esse cillum dolore eu fugiat \
nulla pariatur. Excepteur sint occaecat cupidatat non proident, \
sunt in culpa qui officia deserunt mollit anim id est laborum.";

/// Serves a fixed text, optionally repeated `repeat=N` times.
///
/// Matches `lorem_ipsum_provider` in the original app: any locator whose
/// path is `/lorem_ipsum` and whose `repeat` argument (default 1) is
/// positive is served.
pub struct LoremIpsumProvider;

impl LoremIpsumProvider {
    pub fn text() -> &'static str {
        LOREM_IPSUM
    }
}

impl ResourceProvider for LoremIpsumProvider {
    fn has_resource(&self, locator: &Locator) -> bool {
        locator.has_path("/lorem_ipsum") && locator.arg_value_as::<i64>("repeat").unwrap_or(1) > 0
    }

    fn get_resource_io(&self, _request_id: RequestId, locator: &Locator) -> Option<Box<dyn BlobIo>> {
        let repeat = locator.arg_value_as::<usize>("repeat").unwrap_or(1);
        Some(Box::new(FixedBufferBlob::from_str(
            LOREM_IPSUM.repeat(repeat),
        )))
    }
}
