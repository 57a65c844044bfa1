use std::path::{Path, PathBuf};

use resource_store::{BlobIo, FileBlob};

use crate::{Locator, RequestId};

use super::ResourceProvider;

/// Serves regular files under one or more configured root directories.
///
/// Maps `file:` URLs (and bare path-bearing URLs) by joining the locator's
/// path onto each root in turn and refusing anything that resolves outside
/// the root (defense against `../` escapes) or that turns out to be a
/// symlink — `FileBlob::open` enforces the latter.
pub struct FileProvider {
    roots: Vec<PathBuf>,
}

impl FileProvider {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    fn resolve(&self, locator: &Locator) -> Option<PathBuf> {
        if !locator.has_scheme("file") {
            return None;
        }
        let relative = locator.path().trim_start_matches('/');
        self.roots.iter().find_map(|root| {
            let candidate = root.join(relative);
            is_within(root, &candidate).then_some(candidate)
        })
    }
}

fn is_within(root: &Path, candidate: &Path) -> bool {
    let root = root.canonicalize().ok();
    let parent = candidate.parent().and_then(|p| p.canonicalize().ok());
    match (root, parent) {
        (Some(root), Some(parent)) => parent.starts_with(root),
        // Parent may not exist yet only for write paths; this provider is
        // read-only, so a missing parent simply means "not found" downstream.
        _ => false,
    }
}

impl ResourceProvider for FileProvider {
    fn has_resource(&self, locator: &Locator) -> bool {
        self.resolve(locator)
            .map(|p| resource_store::FileBlob::open(&p).is_ok())
            .unwrap_or(false)
    }

    fn get_resource_io(&self, _request_id: RequestId, locator: &Locator) -> Option<Box<dyn BlobIo>> {
        let path = self.resolve(locator)?;
        FileBlob::open(&path).ok().map(|b| Box::new(b) as Box<_>)
    }

    fn for_each_locator(&self, callback: &mut dyn FnMut(&str)) {
        for root in &self.roots {
            visit(root, root, callback);
        }
    }
}

fn visit(root: &Path, dir: &Path, callback: &mut dyn FnMut(&str)) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            visit(root, &path, callback);
        } else if file_type.is_file() {
            if let Ok(relative) = path.strip_prefix(root) {
                callback(&format!("file:///{}", relative.display()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_regular_files_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi there").unwrap();

        let provider = FileProvider::new([dir.path().to_path_buf()]);
        let locator: Locator = "file:///hello.txt".parse().unwrap();
        assert!(provider.has_resource(&locator));

        let mut dummy: slotmap::SlotMap<RequestId, ()> = slotmap::SlotMap::with_key();
        let id = dummy.insert(());
        let blob = provider.get_resource_io(id, &locator).unwrap();
        let mut buf = vec![0_u8; blob.total_size() as usize];
        blob.fetch_fragment(0, &mut buf).unwrap();
        assert_eq!(buf, b"hi there");
    }

    #[test]
    fn rejects_path_escape_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileProvider::new([dir.path().to_path_buf()]);
        let locator: Locator = "file:///../../etc/passwd".parse().unwrap();
        assert!(!provider.has_resource(&locator));
    }

    #[test]
    fn enumerates_regular_files_as_canonical_urls() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.txt"), b"b").unwrap();

        let provider = FileProvider::new([dir.path().to_path_buf()]);
        let mut urls = Vec::new();
        provider.for_each_locator(&mut |u| urls.push(u.to_string()));
        urls.sort();
        assert_eq!(urls, vec!["file:///a.txt".to_string(), "file:///sub/b.txt".to_string()]);
    }

    #[test]
    #[cfg(unix)]
    fn rejects_symlinked_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.txt");
        std::fs::write(&target, b"data").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

        let provider = FileProvider::new([dir.path().to_path_buf()]);
        let locator: Locator = "file:///link.txt".parse().unwrap();
        assert!(!provider.has_resource(&locator));
    }
}
