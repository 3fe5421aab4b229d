//! PageNormalizer transform: turns raw extracted entries into numbered
//! JPEG pages.
//!
//! Entries are classified by content, not extension. JPEGs are moved into
//! place untouched; other images are decoded and re-encoded as JPEG. An
//! entry that is not an image, or that fails to transcode, is dropped
//! without consuming a page number.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use comic_core::error::{ConvertError, Result};
use comic_core::options::{ConversionOptions, PageOrder};
use comic_core::page::{page_file_name, Page};
use comic_core::plugin::Transform;
use comic_core::workspace::WorkingSet;
use comic_utils::fsutil;

/// Bytes read to recognise an image format.
const SNIFF_LEN: u64 = 64;

pub struct PageNormalizer;

impl Transform for PageNormalizer {
    fn name(&self) -> &str {
        "PageNormalizer"
    }

    fn apply(&self, work: &WorkingSet, options: &ConversionOptions) -> Result<Vec<Page>> {
        let entries = ordered_entries(&work.raw_dir(), options.page_order)?;
        log::debug!("Normalizing {} raw entries", entries.len());
        normalize_entries(&entries, &work.pages_dir(), options.jpeg_quality)
    }
}

/// Regular files of `dir` in the requested order.
fn ordered_entries(dir: &Path, order: PageOrder) -> Result<Vec<PathBuf>> {
    let mut entries = fsutil::list_files(dir)?;
    match order {
        PageOrder::Natural => entries.sort_by(|a, b| {
            fsutil::natural_cmp(&file_name_of(a), &file_name_of(b))
        }),
        PageOrder::Lexical => entries.sort_by_key(|p| file_name_of(p)),
        PageOrder::Enumeration => {}
    }
    Ok(entries)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Number `entries` into `pages_dir` as `001.jpg`, `002.jpg`, ...
///
/// The counter advances only when a page is actually written, so the result
/// is always numbered `1..=n` without gaps.
pub fn normalize_entries(
    entries: &[PathBuf],
    pages_dir: &Path,
    jpeg_quality: u8,
) -> Result<Vec<Page>> {
    let mut pages = Vec::new();
    let mut next = 1u32;

    for entry in entries {
        let Some(format) = sniff_image(entry) else {
            log::debug!("Not an image, skipping: {}", entry.display());
            continue;
        };

        let target = pages_dir.join(page_file_name(next));
        if format == ImageFormat::Jpeg {
            fs::rename(entry, &target)?;
        } else {
            let jpeg = fs::read(entry)
                .map_err(ConvertError::from)
                .and_then(|data| transcode_to_jpeg(&data, jpeg_quality));
            match jpeg {
                Ok(bytes) => fs::write(&target, bytes)?,
                Err(e) => {
                    log::debug!(
                        "Dropping {} ({:?}): {}",
                        entry.display(),
                        format,
                        e
                    );
                    continue;
                }
            }
        }

        pages.push(Page {
            number: next,
            path: target,
        });
        next += 1;
    }

    Ok(pages)
}

/// Image format of a file judged from its first bytes, if it is an image.
fn sniff_image(path: &Path) -> Option<ImageFormat> {
    let file = File::open(path).ok()?;
    let mut prefix = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN).read_to_end(&mut prefix).ok()?;
    image::guess_format(&prefix).ok()
}

/// Decode any supported image and re-encode it as baseline JPEG.
///
/// Greyscale stays greyscale. Transparency is flattened onto white.
fn transcode_to_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    use image::codecs::jpeg::JpegEncoder;

    let img = image::load_from_memory(data)
        .map_err(|e| ConvertError::Image(format!("decode: {}", e)))?;
    let img = if img.color().has_alpha() {
        flatten_onto_white(&img)
    } else {
        img
    };

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    let encoded = if img.color().has_color() {
        encoder.encode_image(&img.to_rgb8())
    } else {
        encoder.encode_image(&img.to_luma8())
    };
    encoded.map_err(|e| ConvertError::Image(format!("encode: {}", e)))?;
    Ok(buf)
}

fn flatten_onto_white(img: &DynamicImage) -> DynamicImage {
    let rgba = img.to_rgba8();
    let mut rgb = image::RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(rgb.pixels_mut()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            let v = (src[c] as u32 * alpha + 255 * (255 - alpha)) / 255;
            dst[c] = v as u8;
        }
    }
    let flat = DynamicImage::ImageRgb8(rgb);
    if img.color().has_color() {
        flat
    } else {
        DynamicImage::ImageLuma8(flat.to_luma8())
    }
}
