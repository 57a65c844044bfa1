use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use crate::{Error, Result};

/// Outcome of a single [`BlobIo::prepare`] call.
///
/// `prepare` is the cooperative pump hook: generating sources use it to push
/// their internal pipeline forward by one bounded unit of work per call, and
/// report how far along they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrepareStatus {
    /// Still producing data; `progress` is a monotonically non-decreasing
    /// estimate in `[0, 1]`.
    Working { progress: f32 },
    /// All data has been produced; `total_size()` will not grow further.
    Finished,
    /// Production failed; the blob will never finish.
    Failed,
}

impl PrepareStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }

    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// A polymorphic, random-access byte source.
///
/// `fetch_fragment` must be safe to call at any time, even before `prepare`
/// reports [`PrepareStatus::Finished`] — it returns whatever prefix of the
/// requested window is currently materialized. Implementations must never
/// block the calling thread; long-running work belongs in `prepare`, chunked
/// so a single call does bounded work.
pub trait BlobIo {
    /// Currently known size of the blob. May grow between calls for a
    /// still-preparing source.
    fn total_size(&self) -> u64;

    /// Copies up to `dst.len()` bytes starting at `offset` into `dst` without
    /// consuming them. Returns the number of bytes actually written, which
    /// may be less than `dst.len()` if the window exceeds materialized data.
    fn fetch_fragment(&self, offset: u64, dst: &mut [u8]) -> Result<usize>;

    /// Advances the source's internal pipeline by one bounded unit of work.
    /// Idempotent once `Finished` or `Failed` has been reported.
    fn prepare(&mut self) -> Result<PrepareStatus>;
}

/// A blob whose entire content is already materialized in memory.
pub struct FixedBufferBlob {
    data: Vec<u8>,
}

impl FixedBufferBlob {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn from_str(s: impl Into<String>) -> Self {
        Self::new(s.into().into_bytes())
    }
}

impl BlobIo for FixedBufferBlob {
    fn total_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn fetch_fragment(&self, offset: u64, dst: &mut [u8]) -> Result<usize> {
        fetch_from_slice(&self.data, offset, dst)
    }

    fn prepare(&mut self) -> Result<PrepareStatus> {
        Ok(PrepareStatus::Finished)
    }
}

/// A blob whose bytes are appended incrementally by a generating producer
/// (e.g. a procedural texture generator) while consumers read the prefix
/// that has materialized so far.
#[derive(Default)]
pub struct AppendableBufferBlob {
    data: Vec<u8>,
    finished: bool,
    failed: bool,
}

impl AppendableBufferBlob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk produced by the generator driving this blob.
    pub fn append(&mut self, chunk: &[u8]) {
        debug_assert!(!self.finished, "append after finish");
        self.data.extend_from_slice(chunk);
    }

    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }
}

impl BlobIo for AppendableBufferBlob {
    fn total_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn fetch_fragment(&self, offset: u64, dst: &mut [u8]) -> Result<usize> {
        fetch_from_slice(&self.data, offset, dst)
    }

    fn prepare(&mut self) -> Result<PrepareStatus> {
        Ok(if self.failed {
            PrepareStatus::Failed
        } else if self.finished {
            PrepareStatus::Finished
        } else {
            PrepareStatus::Working { progress: 0.0 }
        })
    }
}

/// Like [`AppendableBufferBlob`], but every appended chunk is first
/// compressed with zlib; readers therefore see the framed compressed stream,
/// matching the on-disk shape of a `data_filter: "zlib"` `.eagitexi` body.
pub struct CompressedAppendableBufferBlob {
    encoder: flate2::write::ZlibEncoder<Vec<u8>>,
    finished: bool,
    failed: bool,
}

impl Default for CompressedAppendableBufferBlob {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressedAppendableBufferBlob {
    pub fn new() -> Self {
        Self {
            encoder: flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default()),
            finished: false,
            failed: false,
        }
    }

    pub fn append(&mut self, chunk: &[u8]) -> Result<()> {
        use std::io::Write;
        self.encoder.write_all(chunk).map_err(Error::Io)
    }

    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }
}

impl BlobIo for CompressedAppendableBufferBlob {
    fn total_size(&self) -> u64 {
        self.encoder.get_ref().len() as u64
    }

    fn fetch_fragment(&self, offset: u64, dst: &mut [u8]) -> Result<usize> {
        fetch_from_slice(self.encoder.get_ref(), offset, dst)
    }

    fn prepare(&mut self) -> Result<PrepareStatus> {
        Ok(if self.failed {
            PrepareStatus::Failed
        } else if self.finished {
            PrepareStatus::Finished
        } else {
            PrepareStatus::Working { progress: 0.0 }
        })
    }
}

/// A blob backed by a regular file on disk, read with random `seek`+`read`.
///
/// Rejects symlinks at construction time, matching the file provider's
/// "regular files only" policy.
pub struct FileBlob {
    file: File,
    size: u64,
}

impl FileBlob {
    pub fn open(path: &Path) -> Result<Self> {
        let metadata = std::fs::symlink_metadata(path)?;
        if metadata.file_type().is_symlink() {
            return Err(Error::Corrupt {
                reason: format!("refusing to serve symlink {}", path.display()),
            });
        }
        if !metadata.is_file() {
            return Err(Error::Corrupt {
                reason: format!("not a regular file: {}", path.display()),
            });
        }

        let file = File::open(path)?;
        Ok(Self {
            file,
            size: metadata.len(),
        })
    }

    pub fn path_buf_is_regular_file(path: &PathBuf) -> bool {
        std::fs::symlink_metadata(path)
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}

impl BlobIo for FileBlob {
    fn total_size(&self) -> u64 {
        self.size
    }

    fn fetch_fragment(&self, offset: u64, dst: &mut [u8]) -> Result<usize> {
        if offset >= self.size {
            return Ok(0);
        }
        // `File` is not `Sync`-free-of-interior-mutability here; the loader
        // is single-threaded per the concurrency model so a plain clone of
        // the handle via `try_clone` keeps `fetch_fragment` a `&self` method.
        let mut file = self.file.try_clone()?;
        file.seek(SeekFrom::Start(offset))?;
        let max = ((self.size - offset) as usize).min(dst.len());
        let read = file.read(&mut dst[..max])?;
        Ok(read)
    }

    fn prepare(&mut self) -> Result<PrepareStatus> {
        Ok(PrepareStatus::Finished)
    }
}

fn fetch_from_slice(data: &[u8], offset: u64, dst: &mut [u8]) -> Result<usize> {
    let offset = offset as usize;
    if offset >= data.len() {
        return Ok(0);
    }
    let n = (data.len() - offset).min(dst.len());
    dst[..n].copy_from_slice(&data[offset..offset + n]);
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_buffer_reports_full_size_immediately() {
        let mut blob = FixedBufferBlob::from_str("hello world");
        assert_eq!(blob.total_size(), 11);
        assert_eq!(blob.prepare().unwrap(), PrepareStatus::Finished);

        let mut buf = [0_u8; 5];
        let n = blob.fetch_fragment(6, &mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn fetch_fragment_past_end_returns_empty() {
        let blob = FixedBufferBlob::from_str("abc");
        let mut buf = [0_u8; 4];
        assert_eq!(blob.fetch_fragment(10, &mut buf).unwrap(), 0);
    }

    #[test]
    fn zero_length_blob_finishes_immediately() {
        let mut blob = FixedBufferBlob::new(Vec::new());
        assert_eq!(blob.total_size(), 0);
        assert_eq!(blob.prepare().unwrap(), PrepareStatus::Finished);
        let mut buf = [0_u8; 1];
        assert_eq!(blob.fetch_fragment(0, &mut buf).unwrap(), 0);
    }

    #[test]
    fn appendable_buffer_materializes_prefix_before_finished() {
        let mut blob = AppendableBufferBlob::new();
        blob.append(b"abc");
        assert_eq!(blob.total_size(), 3);
        assert_eq!(
            blob.prepare().unwrap(),
            PrepareStatus::Working { progress: 0.0 }
        );

        blob.append(b"def");
        blob.mark_finished();
        assert_eq!(blob.prepare().unwrap(), PrepareStatus::Finished);

        let mut buf = [0_u8; 6];
        assert_eq!(blob.fetch_fragment(0, &mut buf).unwrap(), 6);
        assert_eq!(&buf, b"abcdef");
    }

    #[test]
    fn compressed_appendable_buffer_round_trips() {
        let mut blob = CompressedAppendableBufferBlob::new();
        blob.append(b"some pixel bytes, repeated, repeated, repeated")
            .unwrap();
        blob.mark_finished();
        assert_eq!(blob.prepare().unwrap(), PrepareStatus::Finished);

        let size = blob.total_size() as usize;
        let mut compressed = vec![0_u8; size];
        blob.fetch_fragment(0, &mut compressed).unwrap();

        let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"some pixel bytes, repeated, repeated, repeated");
    }

    #[test]
    fn file_blob_rejects_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.bin");
        std::fs::write(&target, b"data").unwrap();
        let link = dir.path().join("link.bin");
        #[cfg(unix)]
        std::os::unix::fs::symlink(&target, &link).unwrap();
        #[cfg(unix)]
        assert!(FileBlob::open(&link).is_err());
    }

    #[test]
    fn file_blob_random_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let blob = FileBlob::open(&path).unwrap();
        assert_eq!(blob.total_size(), 10);

        let mut buf = [0_u8; 4];
        assert_eq!(blob.fetch_fragment(3, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"3456");
    }
}
