// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — assembles finished JPEG pages into a PDF 1.4 file without an
// encoding library.
//
// The document is first described as a list of typed objects with ids
// allocated from the final page order. Serialisation then writes each object
// to raw bytes, and the cross-reference table is built from the byte length
// of what has actually been written, never from text lengths.

use std::io::Write;

use scanwerk_core::error::{Result, ScanError};
use tracing::{debug, info, instrument};

use super::page::{DocumentBytes, Page};

/// Version line followed by a comment of non-ASCII bytes, which marks the
/// file as binary for transfer tools.
pub const HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";

const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;
/// Objects emitted per page: page dictionary, image, content stream.
const OBJECTS_PER_PAGE: u32 = 3;

/// Object ids reserved for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageObjectIds {
    pub page: u32,
    pub image: u32,
    pub content: u32,
}

impl PageObjectIds {
    /// Ids for the page at `index` in final document order.
    pub fn for_index(index: usize) -> Self {
        let page = PAGES_ID + 1 + index as u32 * OBJECTS_PER_PAGE;
        Self {
            page,
            image: page + 1,
            content: page + 2,
        }
    }
}

/// One indirect object, before serialisation.
#[derive(Debug)]
enum PdfObject<'a> {
    Catalog {
        pages: u32,
    },
    Pages {
        kids: Vec<u32>,
    },
    Page {
        parent: u32,
        resource: String,
        image: u32,
        contents: u32,
        width: u32,
        height: u32,
    },
    Image {
        width: u32,
        height: u32,
        data: &'a [u8],
    },
    Content {
        data: Vec<u8>,
    },
}

impl PdfObject<'_> {
    /// Write `<id> 0 obj ... endobj` for this object.
    fn write_to(&self, id: u32, out: &mut Vec<u8>) -> std::io::Result<()> {
        write!(out, "{id} 0 obj\n")?;
        match self {
            Self::Catalog { pages } => {
                write!(out, "<< /Type /Catalog /Pages {pages} 0 R >>\n")?;
            }
            Self::Pages { kids } => {
                let refs: Vec<String> = kids.iter().map(|k| format!("{k} 0 R")).collect();
                write!(
                    out,
                    "<< /Type /Pages /Kids [{}] /Count {} >>\n",
                    refs.join(" "),
                    kids.len()
                )?;
            }
            Self::Page {
                parent,
                resource,
                image,
                contents,
                width,
                height,
            } => {
                write!(
                    out,
                    "<< /Type /Page /Parent {parent} 0 R \
                     /Resources << /XObject << /{resource} {image} 0 R >> >> \
                     /MediaBox [0 0 {width} {height}] /Contents {contents} 0 R >>\n"
                )?;
            }
            Self::Image {
                width,
                height,
                data,
            } => {
                write!(
                    out,
                    "<< /Type /XObject /Subtype /Image /Width {width} /Height {height} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode \
                     /Length {} >>\n",
                    data.len()
                )?;
                write_stream(out, data)?;
            }
            Self::Content { data } => {
                write!(out, "<< /Length {} >>\n", data.len())?;
                write_stream(out, data)?;
            }
        }
        out.write_all(b"endobj\n")
    }
}

fn write_stream(out: &mut Vec<u8>, data: &[u8]) -> std::io::Result<()> {
    out.write_all(b"stream\n")?;
    out.write_all(data)?;
    out.write_all(b"\nendstream\n")
}

/// Drawing program that stretches the unit square over the whole page and
/// paints `resource` into it.
pub fn content_stream(resource: &str, width: u32, height: u32) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} 0 0 cm\n/{resource} Do\nQ\n").into_bytes()
}

/// Accumulates the object graph for a document and serialises it.
#[derive(Debug, Default)]
struct ObjectGraph<'a> {
    /// Object `i + 1` lives at index `i`.
    objects: Vec<PdfObject<'a>>,
}

impl<'a> ObjectGraph<'a> {
    fn for_pages(pages: &'a [Page]) -> Self {
        let mut graph = Self::default();
        let ids: Vec<PageObjectIds> = (0..pages.len()).map(PageObjectIds::for_index).collect();

        graph.push(CATALOG_ID, PdfObject::Catalog { pages: PAGES_ID });
        graph.push(
            PAGES_ID,
            PdfObject::Pages {
                kids: ids.iter().map(|ids| ids.page).collect(),
            },
        );

        for (index, (page, ids)) in pages.iter().zip(ids).enumerate() {
            let resource = format!("Im{index}");
            let (width, height) = (page.width(), page.height());
            graph.push(
                ids.page,
                PdfObject::Page {
                    parent: PAGES_ID,
                    resource: resource.clone(),
                    image: ids.image,
                    contents: ids.content,
                    width,
                    height,
                },
            );
            graph.push(
                ids.image,
                PdfObject::Image {
                    width,
                    height,
                    data: page.jpeg_bytes(),
                },
            );
            graph.push(
                ids.content,
                PdfObject::Content {
                    data: content_stream(&resource, width, height),
                },
            );
        }
        graph
    }

    /// Append an object whose id was allocated up front.
    fn push(&mut self, id: u32, object: PdfObject<'a>) {
        debug_assert_eq!(id as usize, self.objects.len() + 1, "object ids must be sequential");
        self.objects.push(object);
    }

    /// Serialise header, objects, cross-reference table, and trailer.
    fn finish(&self) -> std::io::Result<Vec<u8>> {
        let body_estimate: usize = self
            .objects
            .iter()
            .map(|o| match o {
                PdfObject::Image { data, .. } => data.len() + 256,
                _ => 256,
            })
            .sum();
        let mut out = Vec::with_capacity(HEADER.len() + body_estimate);
        out.extend_from_slice(HEADER);

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (index, object) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            object.write_to(index as u32 + 1, &mut out)?;
        }

        let xref_offset = out.len();
        let size = self.objects.len() + 1;
        write!(out, "xref\n0 {size}\n")?;
        out.write_all(b"0000000000 65535 f \n")?;
        for offset in &offsets {
            write!(out, "{offset:010} 00000 n \n")?;
        }
        write!(
            out,
            "trailer\n<< /Size {size} /Root {CATALOG_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )?;
        Ok(out)
    }
}

/// Writes multi-page PDF documents from finished [`Page`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Assemble `pages` in order into one document.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn write(&self, pages: &[Page]) -> Result<DocumentBytes> {
        if pages.is_empty() {
            return Err(ScanError::InvalidInput("a document needs at least one page".into()));
        }

        let graph = ObjectGraph::for_pages(pages);
        debug!(objects = graph.objects.len(), "Object graph built");

        let bytes = graph
            .finish()
            .map_err(|err| ScanError::EncodeFailure(format!("PDF serialisation failed: {}", err)))?;

        info!(bytes = bytes.len(), "PDF assembled");
        Ok(DocumentBytes::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::processor::ImageProcessor;
    use crate::image::raster::RasterImage;
    use scanwerk_core::ScanConfig;

    fn jpeg_page(width: u32, height: u32, rgb: [u8; 3]) -> Page {
        let raster = RasterImage::filled(width, height, [rgb[0], rgb[1], rgb[2], 255]).unwrap();
        let jpeg = ImageProcessor::from_raster(raster).to_jpeg_bytes(92).unwrap();
        Page::from_encoded(jpeg, &ScanConfig::default()).unwrap()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).rposition(|w| w == needle)
    }

    /// Parse `startxref` and the xref table by hand, returning in-use offsets.
    fn xref_offsets(pdf: &[u8]) -> (usize, Vec<usize>) {
        let start = rfind(pdf, b"startxref\n").unwrap() + b"startxref\n".len();
        let end = start + find(&pdf[start..], b"\n").unwrap();
        let xref_offset: usize = std::str::from_utf8(&pdf[start..end]).unwrap().parse().unwrap();
        assert!(pdf[xref_offset..].starts_with(b"xref\n"));

        let table = std::str::from_utf8(&pdf[xref_offset..start]).unwrap();
        let mut lines = table.lines().skip(1);
        let count: usize = lines.next().unwrap().split(' ').nth(1).unwrap().parse().unwrap();
        let free = lines.next().unwrap();
        assert_eq!(free, "0000000000 65535 f ");
        let offsets = lines
            .take(count - 1)
            .map(|l| {
                assert_eq!(l.len(), 19);
                assert!(l.ends_with(" 00000 n "));
                l[..10].parse().unwrap()
            })
            .collect();
        (xref_offset, offsets)
    }

    #[test]
    fn header_carries_binary_marker() {
        let doc = PdfWriter::new().write(&[jpeg_page(8, 8, [0, 0, 0])]).unwrap();
        let bytes = doc.as_bytes();
        assert!(bytes.starts_with(b"%PDF-1.4\n%"));
        assert!(bytes[10..14].iter().all(|b| *b > 127));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn every_offset_points_at_its_object() {
        let pages = vec![
            jpeg_page(64, 48, [250, 10, 10]),
            jpeg_page(33, 71, [10, 250, 10]),
            jpeg_page(120, 90, [10, 10, 250]),
        ];
        let doc = PdfWriter::new().write(&pages).unwrap();
        let bytes = doc.as_bytes();

        let (_, offsets) = xref_offsets(bytes);
        assert_eq!(offsets.len(), 2 + 3 * pages.len());
        for (i, offset) in offsets.iter().enumerate() {
            let token = format!("{} 0 obj\n", i + 1);
            assert!(
                bytes[*offset..].starts_with(token.as_bytes()),
                "object {} offset {} is wrong",
                i + 1,
                offset
            );
        }
    }

    #[test]
    fn jpeg_payload_is_embedded_verbatim_with_byte_length() {
        let page = jpeg_page(50, 40, [128, 64, 32]);
        let doc = PdfWriter::new().write(std::slice::from_ref(&page)).unwrap();
        let bytes = doc.as_bytes();

        let jpeg = page.jpeg_bytes();
        let at = find(bytes, jpeg).expect("payload embedded");
        assert!(bytes[..at].ends_with(b">>\nstream\n"));
        assert!(bytes[at + jpeg.len()..].starts_with(b"\nendstream\nendobj\n"));
        let length = format!("/Filter /DCTDecode /Length {} >>", jpeg.len());
        assert!(find(bytes, length.as_bytes()).is_some());
    }

    #[test]
    fn content_stream_scales_image_to_page() {
        assert_eq!(content_stream("Im2", 640, 480), b"q\n640 0 0 480 0 0 cm\n/Im2 Do\nQ\n".to_vec());
    }

    #[test]
    fn page_ids_follow_final_order() {
        assert_eq!(
            PageObjectIds::for_index(0),
            PageObjectIds { page: 3, image: 4, content: 5 }
        );
        assert_eq!(
            PageObjectIds::for_index(2),
            PageObjectIds { page: 9, image: 10, content: 11 }
        );
    }

    #[test]
    fn kids_and_count_reflect_page_list() {
        let pages = vec![jpeg_page(10, 10, [0, 0, 0]), jpeg_page(20, 20, [255, 255, 255])];
        let doc = PdfWriter::new().write(&pages).unwrap();
        let bytes = doc.as_bytes();
        assert!(find(bytes, b"<< /Type /Pages /Kids [3 0 R 6 0 R] /Count 2 >>").is_some());
        assert!(find(bytes, b"/MediaBox [0 0 20 20] /Contents 8 0 R").is_some());
        assert!(find(bytes, b"trailer\n<< /Size 9 /Root 1 0 R >>").is_some());
    }

    #[test]
    fn reordering_pages_only_changes_page_content() {
        let a = jpeg_page(30, 20, [200, 0, 0]);
        let b = jpeg_page(20, 30, [0, 0, 200]);
        let ab = PdfWriter::new().write(&[a.clone(), b.clone()]).unwrap();
        let ba = PdfWriter::new().write(&[b, a]).unwrap();

        assert_eq!(ab.len(), ba.len());
        let (_, ab_offsets) = xref_offsets(ab.as_bytes());
        let (_, ba_offsets) = xref_offsets(ba.as_bytes());
        assert_eq!(ab_offsets.len(), ba_offsets.len());
        assert_eq!(ab_offsets[..2], ba_offsets[..2]);
        assert!(find(ab.as_bytes(), b"/MediaBox [0 0 30 20]").unwrap()
            < find(ab.as_bytes(), b"/MediaBox [0 0 20 30]").unwrap());
        assert!(find(ba.as_bytes(), b"/MediaBox [0 0 20 30]").unwrap()
            < find(ba.as_bytes(), b"/MediaBox [0 0 30 20]").unwrap());
    }

    #[test]
    fn empty_page_list_is_rejected() {
        assert!(matches!(PdfWriter::new().write(&[]), Err(ScanError::InvalidInput(_))));
    }

    #[test]
    fn output_parses_with_lopdf() {
        let pages = vec![jpeg_page(64, 32, [90, 90, 90]), jpeg_page(16, 48, [5, 5, 5])];
        let doc = PdfWriter::new().write(&pages).unwrap();

        let parsed = lopdf::Document::load_mem(doc.as_bytes()).expect("valid PDF");
        assert_eq!(parsed.get_pages().len(), 2);

        let size = parsed.trailer.get(b"Size").unwrap().as_i64().unwrap();
        assert_eq!(size, 9);

        let image = parsed.get_object((4, 0)).unwrap().as_stream().unwrap();
        assert_eq!(image.content, pages[0].jpeg_bytes());
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 64);
    }
}
