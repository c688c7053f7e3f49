use gloo_net::http::Request;
use scene::texture::{AssetLoadError, TextureImage};
use tracing::debug;

pub fn decode_texture(bytes: &[u8]) -> Result<TextureImage, AssetLoadError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AssetLoadError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    TextureImage::from_rgba8(width, height, img.into_raw())
}

/// Downloads and decodes an image. Errors are returned for the caller to fall back on.
pub async fn fetch_texture(url: &str) -> Result<TextureImage, AssetLoadError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| AssetLoadError::Fetch(e.to_string()))?;
    if !resp.ok() {
        return Err(AssetLoadError::Fetch(format!(
            "{url} answered {}",
            resp.status()
        )));
    }
    let bytes = resp
        .binary()
        .await
        .map_err(|e| AssetLoadError::Fetch(e.to_string()))?;
    debug!(url, bytes = bytes.len(), "texture downloaded");
    decode_texture(&bytes)
}

#[cfg(test)]
mod tests {
    use super::decode_texture;
    use image::{ImageFormat, Rgba, RgbaImage};
    use scene::texture::AssetLoadError;
    use std::io::Cursor;

    #[test]
    fn decodes_png_into_rgba() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(2, 1, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode");

        let tex = decode_texture(&bytes).expect("decode");
        assert_eq!((tex.width(), tex.height()), (3, 2));
        assert_eq!(tex.pixel(2, 1), Some([10, 20, 30, 255]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode_texture(b"not an image"),
            Err(AssetLoadError::Decode(_))
        ));
    }
}
