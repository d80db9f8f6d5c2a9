//! Card image embedding
//!
//! Baseline and progressive 8-bit JPEG files are embedded as-is with the
//! DCTDecode filter, after a full decode has shown they are intact. Everything
//! else the `image` crate can decode is flattened onto white, stored as 8-bit
//! RGB or gray and compressed with FlateDecode.

use crate::types::{ImageRef, Result, SheetError};
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

/// Image data ready to be stored as a PDF image XObject
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color space name ("DeviceRGB", "DeviceGray", "DeviceCMYK")
    pub color_space: &'static str,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" otherwise)
    pub filter: &'static str,
    /// Adobe CMYK JPEGs are stored inverted
    pub invert_cmyk: bool,
    /// Encoded image data
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    /// Read and prepare the image behind `image_ref`
    pub fn load(image_ref: &ImageRef) -> Result<Self> {
        let bytes = image_ref.read_bytes().map_err(|e| image_error(image_ref, e))?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            SheetError::Image { message, .. } => SheetError::Image {
                image: image_ref.to_string(),
                message,
            },
            other => other,
        })
    }

    /// Prepare encoded JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if is_jpeg(data) {
            Self::from_jpeg(data)
        } else {
            Self::from_decoded(data)
        }
    }

    /// JPEG images can be embedded directly with DCTDecode filter.
    fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = jpeg_info(data)?;

        // Headers alone say nothing about the scan data
        let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
            .map_err(|e| invalid(e.to_string()))?;

        if !info.dct_decodable() {
            log::debug!(
                "JPEG frame 0x{:02X} with {}-bit samples is re-encoded",
                info.frame,
                info.precision
            );
            return Self::from_image(&image);
        }

        let (color_space, invert_cmyk) = match info.components {
            1 => ("DeviceGray", false),
            3 => ("DeviceRGB", false),
            4 => ("DeviceCMYK", info.adobe),
            n => {
                return Err(invalid(format!("unsupported JPEG with {} components", n)));
            }
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space,
            filter: "DCTDecode",
            invert_cmyk,
            data: data.to_vec(),
        })
    }

    /// Decode, blend alpha onto white, re-encode with FlateDecode.
    fn from_decoded(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| invalid(e.to_string()))?;
        let image = reader.decode().map_err(|e| invalid(e.to_string()))?;
        Self::from_image(&image)
    }

    fn from_image(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());

        let (raw, color_space) = flatten(image);

        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            invert_cmyk: false,
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set("ColorSpace", Object::Name(self.color_space.as_bytes().to_vec()));
        dict.set("BitsPerComponent", 8i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));
        if self.invert_cmyk {
            dict.set(
                "Decode",
                Object::Array(
                    [1, 0, 1, 0, 1, 0, 1, 0]
                        .into_iter()
                        .map(Object::Integer)
                        .collect(),
                ),
            );
        }

        // Already encoded; lopdf must not compress it again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

/// Flatten to 8-bit gray or RGB, blending any alpha channel onto white
fn flatten(image: &DynamicImage) -> (Vec<u8>, &'static str) {
    match image.color() {
        ColorType::L8 | ColorType::L16 => (image.to_luma8().into_raw(), "DeviceGray"),
        ColorType::La8 | ColorType::La16 => {
            let la = image.to_luma_alpha8();
            let gray: Vec<u8> = la
                .pixels()
                .map(|p| blend_on_white(p[0], p[1]))
                .collect();
            (gray, "DeviceGray")
        }
        color if color.has_alpha() => {
            let rgba = image.to_rgba8();
            let mut rgb = Vec::with_capacity((rgba.width() * rgba.height() * 3) as usize);
            for p in rgba.pixels() {
                rgb.push(blend_on_white(p[0], p[3]));
                rgb.push(blend_on_white(p[1], p[3]));
                rgb.push(blend_on_white(p[2], p[3]));
            }
            (rgb, "DeviceRGB")
        }
        _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
    }
}

fn blend_on_white(value: u8, alpha: u8) -> u8 {
    let alpha = alpha as f32 / 255.0;
    (value as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF
}

/// JPEG frame info
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    /// SOFn marker byte
    frame: u8,
    /// Bits per sample
    precision: u8,
    width: u32,
    height: u32,
    components: u8,
    /// An APP14 "Adobe" segment was seen before the frame header
    adobe: bool,
}

impl JpegInfo {
    /// DCTDecode reads 8-bit Huffman-coded baseline, extended and progressive
    /// frames only; lossless and arithmetic-coded frames are not supported.
    fn dct_decodable(&self) -> bool {
        self.precision == 8 && matches!(self.frame, 0xC0..=0xC2)
    }
}

/// Read the frame header of a JPEG without decoding it.
///
/// Walks the marker segments up to the first SOFn marker:
/// - 2 bytes: marker (0xFF, 0xC0-0xCF except C4, C8, CC)
/// - 2 bytes: segment length
/// - 1 byte: precision
/// - 2 bytes: height
/// - 2 bytes: width
/// - 1 byte: number of components
fn jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    let mut adobe = false;
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        if marker == 0xFF {
            // Fill byte
            i += 1;
            continue;
        }

        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let precision = data[i + 4];
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let components = data[i + 9];
            if width == 0 || height == 0 {
                break;
            }
            return Ok(JpegInfo {
                frame: marker,
                precision,
                width,
                height,
                components,
                adobe,
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        if marker == 0xEE && data.get(i + 4..i + 9) == Some(b"Adobe".as_slice()) {
            adobe = true;
        }
        i += 2 + length;
    }

    Err(invalid("could not find JPEG frame header".to_string()))
}

fn invalid(message: String) -> SheetError {
    SheetError::Image {
        image: "<bytes>".to_string(),
        message,
    }
}

fn image_error(image_ref: &ImageRef, err: SheetError) -> SheetError {
    SheetError::Image {
        image: image_ref.to_string(),
        message: err.to_string(),
    }
}
