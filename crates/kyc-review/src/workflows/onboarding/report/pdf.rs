use super::layout::{DrawOp, Font, LayoutPage, ReportLayout, Rgb};
use super::ReportError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::Path;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const LOGO_NAME: &str = "Logo";

/// JPEG image embedded in the header band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoAsset {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    components: u8,
}

impl LogoAsset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let bytes = std::fs::read(path)?;
        Self::from_jpeg(bytes)
    }

    /// Reads dimensions from the first start-of-frame segment.
    pub fn from_jpeg(bytes: Vec<u8>) -> Result<Self, ReportError> {
        if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
            return Err(ReportError::InvalidLogo("missing JPEG signature".to_string()));
        }

        let mut offset = 2;
        while offset + 3 < bytes.len() {
            if bytes[offset] != 0xFF {
                return Err(ReportError::InvalidLogo(format!(
                    "unexpected byte at offset {offset}"
                )));
            }
            let marker = bytes[offset + 1];
            if marker == 0xFF {
                offset += 1;
                continue;
            }
            if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
                offset += 2;
                continue;
            }

            let length = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
            let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
            if is_frame {
                let frame = bytes
                    .get(offset + 4..offset + 10)
                    .ok_or_else(|| ReportError::InvalidLogo("truncated frame header".to_string()))?;
                let height = u16::from_be_bytes([frame[1], frame[2]]) as u32;
                let width = u16::from_be_bytes([frame[3], frame[4]]) as u32;
                let components = frame[5];
                if width == 0 || height == 0 || !matches!(components, 1 | 3 | 4) {
                    return Err(ReportError::InvalidLogo(format!(
                        "unsupported frame {width}x{height} with {components} components"
                    )));
                }
                return Ok(Self {
                    bytes,
                    width,
                    height,
                    components,
                });
            }
            if marker == 0xDA || length < 2 {
                break;
            }
            offset += 2 + length;
        }

        Err(ReportError::InvalidLogo("no frame header found".to_string()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }
}

/// Encodes a paginated layout as a PDF document.
pub(crate) fn encode(
    layout: &ReportLayout,
    title: &str,
    logo: Option<&LogoAsset>,
) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));

    let mut xobjects = Dictionary::new();
    if let Some(logo) = logo {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => logo.width as i64,
                "Height" => logo.height as i64,
                "ColorSpace" => logo.color_space(),
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            logo.bytes.clone(),
        );
        let image_id = doc.add_object(image);
        xobjects.set(LOGO_NAME, image_id);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
        "XObject" => xobjects,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(page, logo.is_some()),
        };
        let encoded = content
            .encode()
            .map_err(|err| ReportError::Encode(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => layout.pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.geometry_width),
            Object::Real(layout.geometry_height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi(title)),
        "Producer" => Object::string_literal("kyc-review"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| ReportError::Encode(err.to_string()))?;
    Ok(bytes)
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

fn fill(color: Rgb) -> Operation {
    Operation::new("rg", vec![real(color.0), real(color.1), real(color.2)])
}

fn page_operations(page: &LayoutPage, has_logo: bool) -> Vec<Operation> {
    let mut operations = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                let name = match font {
                    Font::Regular => REGULAR_FONT,
                    Font::Bold => BOLD_FONT,
                };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![name.into(), real(*size)]));
                operations.push(fill(*color));
                operations.push(Operation::new("Td", vec![real(*x), real(*y)]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(win_ansi(text))],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                operations.push(fill(*color));
                operations.push(Operation::new(
                    "re",
                    vec![real(*x), real(*y), real(*width), real(*height)],
                ));
                operations.push(Operation::new("f", vec![]));
            }
            DrawOp::Line {
                from,
                to,
                width,
                color,
            } => {
                operations.push(Operation::new(
                    "RG",
                    vec![real(color.0), real(color.1), real(color.2)],
                ));
                operations.push(Operation::new("w", vec![real(*width)]));
                operations.push(Operation::new("m", vec![real(from.0), real(from.1)]));
                operations.push(Operation::new("l", vec![real(to.0), real(to.1)]));
                operations.push(Operation::new("S", vec![]));
            }
            DrawOp::Logo {
                x,
                y,
                width,
                height,
            } => {
                if !has_logo {
                    continue;
                }
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        real(*width),
                        real(0.0),
                        real(0.0),
                        real(*height),
                        real(*x),
                        real(*y),
                    ],
                ));
                operations.push(Operation::new("Do", vec![LOGO_NAME.into()]));
                operations.push(Operation::new("Q", vec![]));
            }
        }
    }
    operations
}

/// Maps text onto the WinAnsi code page used by the standard fonts.
/// Characters outside it become `?`.
pub(crate) fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{A0}'..='\u{FF}' => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_header(width: u16, height: u16, components: u8) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.push(components);
        bytes.extend_from_slice(&[0u8; 9]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn logo_reads_frame_dimensions() {
        let logo = LogoAsset::from_jpeg(jpeg_header(240, 80, 3)).expect("valid jpeg header");
        assert_eq!((logo.width(), logo.height()), (240, 80));
        assert_eq!(logo.aspect(), 3.0);
        assert_eq!(logo.color_space(), "DeviceRGB");
    }

    #[test]
    fn logo_rejects_non_jpeg_data() {
        assert!(matches!(
            LogoAsset::from_jpeg(b"\x89PNG\r\n\x1a\n".to_vec()),
            Err(ReportError::InvalidLogo(_))
        ));
        assert!(matches!(
            LogoAsset::from_jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9]),
            Err(ReportError::InvalidLogo(_))
        ));
    }

    #[test]
    fn win_ansi_maps_dashes_and_replaces_unknown_characters() {
        assert_eq!(win_ansi("a\u{2014}b"), vec![b'a', 0x97, b'b']);
        assert_eq!(win_ansi("Zo\u{eb}"), vec![b'Z', b'o', 0xEB]);
        assert_eq!(win_ansi("\u{4E2D}"), vec![b'?']);
    }
}
