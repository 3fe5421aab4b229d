//! Just enough JPEG header parsing to describe the image to a PDF reader.

/// Frame parameters of a baseline or progressive JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
    pub components: u8,
    pub bits_per_component: u8,
    /// An Adobe APP14 segment is present. CMYK data from Adobe encoders is
    /// stored inverted.
    pub adobe: bool,
}

impl JpegInfo {
    /// PDF colour space name for the component count.
    pub fn color_space(&self) -> Option<&'static str> {
        match self.components {
            1 => Some("DeviceGray"),
            3 => Some("DeviceRGB"),
            4 => Some("DeviceCMYK"),
            _ => None,
        }
    }
}

const SOI: u8 = 0xD8;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;
const APP14: u8 = 0xEE;

/// Start-of-frame markers: C0-CF minus DHT (C4), JPG (C8) and DAC (CC).
fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Huffman-coded DCT frames: baseline, extended sequential and progressive.
/// Lossless, hierarchical and arithmetic-coded frames cannot go behind
/// DCTDecode.
fn is_dct_huffman(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xC2)
}

/// Markers that carry no length field.
fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD7 | SOI)
}

fn read_u16(data: &[u8], at: usize) -> Option<usize> {
    Some(u16::from_be_bytes([*data.get(at)?, *data.get(at + 1)?]) as usize)
}

/// Walk the marker segments up to the first scan.
pub fn read_jpeg_info(data: &[u8]) -> Result<JpegInfo, String> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != SOI {
        return Err("not a JPEG stream".to_string());
    }

    let mut adobe = false;
    let mut pos = 2;
    loop {
        // Any number of 0xFF fill bytes may precede a marker.
        while data.get(pos) == Some(&0xFF) && data.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        if data.get(pos) != Some(&0xFF) {
            return Err(format!("corrupt marker at offset {}", pos));
        }
        let marker = *data.get(pos + 1).ok_or("truncated header")?;
        pos += 2;

        if is_standalone(marker) {
            continue;
        }
        if marker == SOS || marker == EOI {
            return Err("no frame header before image data".to_string());
        }

        let len = read_u16(data, pos).ok_or("truncated header")?;
        if len < 2 || pos + len > data.len() {
            return Err(format!("bad segment length at offset {}", pos));
        }
        let segment = &data[pos + 2..pos + len];

        if marker == APP14 && segment.starts_with(b"Adobe") {
            adobe = true;
        } else if is_sof(marker) {
            if segment.len() < 6 {
                return Err("short frame header".to_string());
            }
            let info = JpegInfo {
                bits_per_component: segment[0],
                height: u16::from_be_bytes([segment[1], segment[2]]) as u32,
                width: u16::from_be_bytes([segment[3], segment[4]]) as u32,
                components: segment[5],
                adobe,
            };
            if !is_dct_huffman(marker) {
                return Err(format!("unsupported JPEG frame type 0x{:02X}", marker));
            }
            if info.bits_per_component != 8 {
                return Err(format!(
                    "unsupported sample precision {} bits",
                    info.bits_per_component
                ));
            }
            if info.width == 0 || info.height == 0 {
                return Err(format!("unsupported dimensions {}x{}", info.width, info.height));
            }
            if info.color_space().is_none() {
                return Err(format!("unsupported component count {}", info.components));
            }
            return Ok(info);
        }

        pos += len;
    }
}
