//! End-to-end seed scenarios driven through the public [`Loader`] facade
//! against an in-test fixture provider, not against any production
//! provider.

use resource_loader::{
    Loader, Locator, ProviderRegistry, RequestId, RequestParams, ResourceProvider, ResourceStatus,
};
use resource_store::{BlobIo, FixedBufferBlob};

const CANONICAL_LINES: [&str; 6] = [
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
    "Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.",
    "Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris.",
    "Nisi ut aliquip ex ea commodo consequat duis aute irure dolor.",
    "In reprehenderit in voluptate velit esse cillum dolore eu fugiat.",
    "Sunt in culpa qui officia deserunt mollit anim id est laborum.",
];

fn test_text() -> String {
    CANONICAL_LINES.repeat(10).join("\n")
}

fn test_urls() -> &'static str {
    "file:///proc/cpuinfo\nfile:///etc/hosts\nftp://example.com/file.txt\nhttps://oglplus.org/"
}

/// Serves the seed-test fixtures named in the spec's worked scenarios.
/// Registered ahead of any production provider in these tests only.
struct FixtureProvider;

impl ResourceProvider for FixtureProvider {
    fn has_resource(&self, locator: &Locator) -> bool {
        matches!(
            (locator.scheme(), locator.path()),
            ("txt", "/TestText") | ("txt", "/TestURLs")
                | ("json", "/TestInts")
                | ("json", "/TestVec3")
                | ("json", "/TestMat4")
        )
    }

    fn get_resource_io(&self, _id: RequestId, locator: &Locator) -> Option<Box<dyn BlobIo>> {
        let body = match (locator.scheme(), locator.path()) {
            ("txt", "/TestText") => test_text(),
            ("txt", "/TestURLs") => test_urls().to_string(),
            ("json", "/TestInts") => "{\"values\": [1,2,3,5,8,13,21]}".to_string(),
            ("json", "/TestVec3") => {
                "{\"values\": [[1,0,0],[0,2,0],[0,0,3],[4,5,6]]}".to_string()
            }
            ("json", "/TestMat4") => serde_json::json!({
                "values": [
                    [1,0,0,0, 0,2,0,0, 0,0,3,0, 0,0,0,4],
                    [5,0,0,0, 0,6,0,0, 0,0,7,0, 0,0,0,8],
                    (0..16).collect::<Vec<i64>>(),
                ]
            })
            .to_string(),
            _ => return None,
        };
        Some(Box::new(FixedBufferBlob::from_str(body)))
    }
}

fn loader_with_fixtures() -> Loader {
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(FixtureProvider));
    Loader::new(registry)
}

fn pump_until_terminal(loader: &mut Loader, id: RequestId) -> ResourceStatus {
    for _ in 0..16 {
        if let Some(status) = loader.status(id) {
            if status.is_terminal() {
                return status;
            }
        }
        loader.update_and_process_all();
    }
    loader.status(id).expect("request vanished before reaching a terminal status")
}

#[test]
fn plain_text_request_matches_canonical_prefix_and_suffix() {
    let mut loader = loader_with_fixtures();
    let locator: Locator = "txt:///TestText".parse().unwrap();
    assert!(locator.has_scheme("txt") && locator.has_path("/TestText"));

    let result = loader.request_plain_text(RequestParams::new(locator));
    assert_eq!(pump_until_terminal(&mut loader, result.request_id), ResourceStatus::Loaded);

    let text = loader.take_plain_text(result.request_id).unwrap();
    assert!(text.starts_with("Lorem ipsum dolor sit amet"));
    assert!(text.ends_with("deserunt mollit anim id est laborum."));
}

#[test]
fn string_list_request_yields_sixty_lines() {
    let mut loader = loader_with_fixtures();
    let locator: Locator = "txt:///TestText".parse().unwrap();
    let result = loader.request_string_list(RequestParams::new(locator));
    assert_eq!(pump_until_terminal(&mut loader, result.request_id), ResourceStatus::Loaded);

    let lines = loader.take_string_list(result.request_id).unwrap();
    assert_eq!(lines.len(), 60);
    assert_eq!(&lines[0..6], &CANONICAL_LINES);
}

#[test]
fn url_list_request_parses_four_locators() {
    let mut loader = loader_with_fixtures();
    let locator: Locator = "txt:///TestURLs".parse().unwrap();
    let result = loader.request_url_list(RequestParams::new(locator));
    assert_eq!(pump_until_terminal(&mut loader, result.request_id), ResourceStatus::Loaded);

    let urls = loader.take_url_list(result.request_id).unwrap();
    assert_eq!(urls.len(), 4);
    assert!(urls[0].has_scheme("file") && urls[0].has_path("/proc/cpuinfo"));
    assert!(urls[1].has_scheme("file") && urls[1].has_path("/etc/hosts"));
    assert!(urls[2].has_scheme("ftp"));
    assert!(urls[3].has_scheme("https"));
}

#[test]
fn float_vector_request_matches_fibonacci_fixture() {
    let mut loader = loader_with_fixtures();
    let locator: Locator = "json:///TestInts".parse().unwrap();
    let result = loader.request_float_vector(RequestParams::new(locator));
    assert_eq!(pump_until_terminal(&mut loader, result.request_id), ResourceStatus::Loaded);

    let values = loader.take_float_vector(result.request_id).unwrap();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0]);
}

#[test]
fn vec3_vector_request_matches_axis_fixture() {
    let mut loader = loader_with_fixtures();
    let locator: Locator = "json:///TestVec3".parse().unwrap();
    let result = loader.request_vec3_vector(RequestParams::new(locator));
    assert_eq!(pump_until_terminal(&mut loader, result.request_id), ResourceStatus::Loaded);

    let vecs = loader.take_vec3_vector(result.request_id).unwrap();
    assert_eq!(vecs.len(), 4);
    assert_eq!((vecs[0].x, vecs[0].y, vecs[0].z), (1.0, 0.0, 0.0));
    assert_eq!((vecs[3].x, vecs[3].y, vecs[3].z), (4.0, 5.0, 6.0));
}

#[test]
fn mat4_vector_request_matches_diagonal_and_sequential_fixtures() {
    let mut loader = loader_with_fixtures();
    let locator: Locator = "json:///TestMat4".parse().unwrap();
    let result = loader.request_mat4_vector(RequestParams::new(locator));
    assert_eq!(pump_until_terminal(&mut loader, result.request_id), ResourceStatus::Loaded);

    let mats = loader.take_mat4_vector(result.request_id).unwrap();
    assert_eq!(mats.len(), 3);
    assert_eq!(mats[0], resource_loader::Mat4::diag(1.0, 2.0, 3.0, 4.0));
    assert_eq!(mats[1], resource_loader::Mat4::diag(5.0, 6.0, 7.0, 8.0));
    for (i, v) in mats[2].0.iter().enumerate() {
        assert_eq!(*v, i as f64);
    }
}
