//! 埋め込み用画像ペイロード
//!
//! 取得した画像は縮小・再エンコードしたうえで Data URL 形式で保持する。
//! 描画時に Data URL から画素へ戻す。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use catalog_export_common::ImageFormatTag;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Data URLの形式が不正です")]
    MalformedDataUrl,

    #[error("未対応のMIMEタイプ: {0}")]
    UnsupportedMime(String),

    #[error("Base64デコードエラー: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("画像変換エラー: {0}")]
    Image(#[from] image::ImageError),
}

/// 行ごとの画像（取得成功 or なし）
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    Decoded(EmbeddedImage),
    Absent,
}

impl ImagePayload {
    pub fn is_decoded(&self) -> bool {
        matches!(self, ImagePayload::Decoded(_))
    }

    pub fn as_embedded(&self) -> Option<&EmbeddedImage> {
        match self {
            ImagePayload::Decoded(image) => Some(image),
            ImagePayload::Absent => None,
        }
    }
}

/// 埋め込み可能な画像
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub format: ImageFormatTag,
    /// "data:image/png;base64,..." 形式
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

impl EmbeddedImage {
    /// 画像バイト列を検証し、最大辺 `max_edge_px` に縮小して Data URL 化
    ///
    /// 形式はバイト列から判定してデコードし、`format` で再エンコードする。
    pub fn from_bytes(bytes: &[u8], format: ImageFormatTag, max_edge_px: u32) -> Result<Self, PayloadError> {
        let decoded = image::load_from_memory(bytes)?;
        let max_edge_px = max_edge_px.max(1);
        let resized = if decoded.width() > max_edge_px || decoded.height() > max_edge_px {
            decoded.thumbnail(max_edge_px, max_edge_px)
        } else {
            decoded
        };

        let mut buffer = Cursor::new(Vec::new());
        match format {
            // JPEGはアルファ非対応
            ImageFormatTag::Jpeg => {
                DynamicImage::ImageRgb8(flatten_on_white(&resized)).write_to(&mut buffer, ImageFormat::Jpeg)?
            }
            ImageFormatTag::Png => resized.write_to(&mut buffer, ImageFormat::Png)?,
            ImageFormatTag::Webp => {
                DynamicImage::ImageRgba8(resized.to_rgba8()).write_to(&mut buffer, ImageFormat::WebP)?
            }
        }

        Ok(Self {
            format,
            data_url: to_data_url(format, buffer.get_ref()),
            width: resized.width(),
            height: resized.height(),
        })
    }

    /// Data URL から画素へ戻す
    pub fn decode(&self) -> Result<DynamicImage, PayloadError> {
        let (_, bytes) = parse_data_url(&self.data_url)?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

/// "data:{mime};base64,{data}" を生成
pub fn to_data_url(format: ImageFormatTag, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
}

/// Data URL を形式タグとバイト列に分解
pub fn parse_data_url(data_url: &str) -> Result<(ImageFormatTag, Vec<u8>), PayloadError> {
    let rest = data_url.strip_prefix("data:").ok_or(PayloadError::MalformedDataUrl)?;
    let (header, data) = rest.split_once(',').ok_or(PayloadError::MalformedDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(PayloadError::MalformedDataUrl)?;
    let format = ImageFormatTag::from_mime_type(mime)
        .ok_or_else(|| PayloadError::UnsupportedMime(mime.to_string()))?;
    let bytes = STANDARD.decode(data)?;
    Ok((format, bytes))
}

/// 透過部分を白で塗りつぶしてRGB化
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
