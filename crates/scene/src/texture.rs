//! RGBA8 texture images and the procedural earth / cloud generators used when the remote
//! earth image is unavailable.

use std::fmt;

use foundation::color::Rgb;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureKey(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLoadError {
    Fetch(String),
    Decode(String),
    Dimensions { width: u32, height: u32, len: usize },
}

impl fmt::Display for AssetLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLoadError::Fetch(e) => write!(f, "texture fetch failed: {e}"),
            AssetLoadError::Decode(e) => write!(f, "texture decode failed: {e}"),
            AssetLoadError::Dimensions { width, height, len } => write!(
                f,
                "texture buffer of {len} bytes does not match {width}x{height} RGBA"
            ),
        }
    }
}

impl std::error::Error for AssetLoadError {}

/// Where a texture came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureOrigin {
    Procedural,
    Remote,
}

impl TextureImage {
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AssetLoadError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(AssetLoadError::Dimensions {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Source-over composite of `color` at `alpha` onto one pixel.
    fn blend(&mut self, x: u32, y: u32, color: Rgb, alpha: f64) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let sa = alpha.clamp(0.0, 1.0);
        let da = f64::from(self.pixels[i + 3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (c, s) in src.iter().enumerate() {
            let dc = f64::from(self.pixels[i + c]);
            let v = (f64::from(*s) * sa + dc * da * (1.0 - sa)) / out_a;
            self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb, alpha: f64) {
        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil().max(0.0) as u32).min(self.width - 1);
        let y1 = ((cy + radius).ceil().max(0.0) as u32).min(self.height - 1);
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = f64::from(x) + 0.5 - cx;
                let dy = f64::from(y) + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }
}

const EARTH_WIDTH: u32 = 512;
const EARTH_HEIGHT: u32 = 256;
const EARTH_LAND: Rgb = Rgb::from_hex(0x059669);
const EARTH_GRADIENT: [(f64, Rgb); 5] = [
    (0.0, Rgb::from_hex(0x1e3a8a)),
    (0.3, Rgb::from_hex(0x3b82f6)),
    (0.5, Rgb::from_hex(0x10b981)),
    (0.7, Rgb::from_hex(0x059669)),
    (1.0, Rgb::from_hex(0x1e3a8a)),
];
const EARTH_BLOBS: usize = 20;

const CLOUD_WIDTH: u32 = 256;
const CLOUD_HEIGHT: u32 = 128;
const CLOUD_BLOBS: usize = 50;

fn gradient_at(t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    for pair in EARTH_GRADIENT.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
            return Rgb::new(lerp(c0.r, c1.r), lerp(c0.g, c1.g), lerp(c0.b, c1.b));
        }
    }
    EARTH_GRADIENT[EARTH_GRADIENT.len() - 1].1
}

/// Ocean-to-land vertical gradient with scattered land masses.
pub fn procedural_earth(seed: u64) -> TextureImage {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut img = TextureImage::filled(EARTH_WIDTH, EARTH_HEIGHT, [0, 0, 0, 255]);

    for y in 0..EARTH_HEIGHT {
        let c = gradient_at((f64::from(y) + 0.5) / f64::from(EARTH_HEIGHT));
        for x in 0..EARTH_WIDTH {
            let i = (y as usize * EARTH_WIDTH as usize + x as usize) * 4;
            img.pixels[i] = c.r;
            img.pixels[i + 1] = c.g;
            img.pixels[i + 2] = c.b;
        }
    }

    for _ in 0..EARTH_BLOBS {
        let x = rng.gen_range(0.0..f64::from(EARTH_WIDTH));
        let y = rng.gen_range(0.0..f64::from(EARTH_HEIGHT));
        let radius = rng.gen_range(10.0..40.0);
        img.fill_circle(x, y, radius, EARTH_LAND, 1.0);
    }
    img
}

/// Faint white veil with denser translucent puffs.
pub fn procedural_clouds(seed: u64) -> TextureImage {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut img = TextureImage::filled(CLOUD_WIDTH, CLOUD_HEIGHT, [255, 255, 255, 26]);

    for _ in 0..CLOUD_BLOBS {
        let x = rng.gen_range(0.0..f64::from(CLOUD_WIDTH));
        let y = rng.gen_range(0.0..f64::from(CLOUD_HEIGHT));
        let radius = rng.gen_range(5.0..25.0);
        img.fill_circle(x, y, radius, Rgb::WHITE, 0.3);
    }
    img
}

/// Picks the remote earth image when it loaded, the procedural one otherwise.
pub fn resolve_earth_texture(
    remote: Result<TextureImage, AssetLoadError>,
    seed: u64,
) -> (TextureImage, TextureOrigin) {
    match remote {
        Ok(img) => (img, TextureOrigin::Remote),
        Err(err) => {
            debug!(error = %err, "using procedural earth texture");
            (procedural_earth(seed), TextureOrigin::Procedural)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AssetLoadError, TextureImage, TextureOrigin, procedural_clouds, procedural_earth,
        resolve_earth_texture,
    };

    #[test]
    fn earth_texture_has_expected_shape() {
        let img = procedural_earth(7);
        assert_eq!((img.width(), img.height()), (512, 256));
        assert_eq!(img.pixels().len(), 512 * 256 * 4);
        // Opaque everywhere.
        assert!(img.pixels().chunks(4).all(|p| p[3] == 255));
    }

    #[test]
    fn earth_texture_is_deterministic_per_seed() {
        assert_eq!(procedural_earth(1), procedural_earth(1));
        assert_ne!(procedural_earth(1), procedural_earth(2));
    }

    #[test]
    fn clouds_are_translucent() {
        let img = procedural_clouds(3);
        assert_eq!((img.width(), img.height()), (256, 128));
        let max_alpha = img.pixels().chunks(4).map(|p| p[3]).max().unwrap_or(0);
        let min_alpha = img.pixels().chunks(4).map(|p| p[3]).min().unwrap_or(0);
        assert_eq!(min_alpha, 26);
        assert!(max_alpha > 26 && max_alpha < 255);
    }

    #[test]
    fn rgba_buffer_must_match_dimensions() {
        let err = TextureImage::from_rgba8(2, 2, vec![0; 15]).expect_err("short buffer");
        assert!(matches!(err, AssetLoadError::Dimensions { len: 15, .. }));
        assert!(TextureImage::from_rgba8(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn failed_remote_load_falls_back_to_procedural() {
        let (img, origin) = resolve_earth_texture(Err(AssetLoadError::Fetch("404".into())), 5);
        assert_eq!(origin, TextureOrigin::Procedural);
        assert_eq!(img, procedural_earth(5));

        let remote = TextureImage::filled(4, 2, [1, 2, 3, 255]);
        let (img, origin) = resolve_earth_texture(Ok(remote.clone()), 5);
        assert_eq!(origin, TextureOrigin::Remote);
        assert_eq!(img, remote);
    }
}
