//! Single-page PDFs holding one JPEG each.
//!
//! The JPEG bytes go into the PDF as-is behind a DCTDecode filter; nothing is
//! decoded or re-encoded. The page is exactly the image's pixel size, one
//! pixel per point.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::jpeg::{read_jpeg_info, JpegInfo};

/// Resource name of the page image.
const IMAGE_NAME: &str = "Im0";

/// Build the image XObject for `jpeg`.
fn image_xobject(jpeg: &[u8], info: &JpegInfo) -> Result<Stream, String> {
    let color_space = info
        .color_space()
        .ok_or_else(|| format!("unsupported component count {}", info.components))?;

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => info.width as i64,
        "Height" => info.height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => info.bits_per_component as i64,
        "Filter" => "DCTDecode",
    };
    if info.components == 4 && info.adobe {
        let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0]
            .iter()
            .map(|&v| Object::Integer(v))
            .collect();
        dict.set("Decode", decode);
    }

    Ok(Stream::new(dict, jpeg.to_vec()).with_compression(false))
}

/// Wrap JPEG bytes in a one-page document.
pub fn wrap_jpeg(jpeg: &[u8]) -> Result<Document, String> {
    let info = read_jpeg_info(jpeg)?;
    let (w, h) = (info.width as i64, info.height as i64);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(image_xobject(jpeg, &info)?);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content = content.encode().map_err(|e| e.to_string())?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(w),
            Object::Integer(h),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

/// Read a JPEG page and save it as a single-page PDF at `sheet_path`.
pub fn wrap_file(jpeg_path: &Path, sheet_path: &Path) -> Result<(), String> {
    let jpeg = std::fs::read(jpeg_path).map_err(|e| e.to_string())?;
    let mut doc = wrap_jpeg(&jpeg)?;
    doc.save(sheet_path).map_err(|e| e.to_string())?;
    Ok(())
}
