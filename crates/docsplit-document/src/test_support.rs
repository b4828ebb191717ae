// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixtures shared by the unit tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{Document, Object, Stream, dictionary};

/// Build an in-memory PDF with `page_count` pages. Page N draws the text
/// `Page N` (1-based). Font resources and the media box live on the `/Pages`
/// node so every page inherits them.
pub(crate) fn sample_pdf(page_count: usize) -> Vec<u8> {
    sample_pdf_with_links(page_count, &[])
}

/// Like [`sample_pdf`], with a Link annotation on page `from` whose `/Dest`
/// points at page `to` (both zero-based) for each `(from, to)` pair.
pub(crate) fn sample_pdf_with_links(page_count: usize, links: &[(usize, usize)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let page_ids: Vec<_> = (0..page_count).map(|_| doc.new_object_id()).collect();
    for (index, &page_id) in page_ids.iter().enumerate() {
        let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let annots: Vec<Object> = links
            .iter()
            .filter(|&&(from, _)| from == index)
            .map(|&(_, to)| {
                Object::Reference(doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => vec![72.into(), 700.into(), 200.into(), 730.into()],
                    "P" => page_id,
                    "Dest" => vec![Object::Reference(page_ids[to]), "Fit".into()],
                }))
            })
            .collect();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if !annots.is_empty() {
            page.set("Annots", annots);
        }
        doc.objects.insert(page_id, Object::Dictionary(page));
    }
    let kids: Vec<Object> = page_ids.iter().copied().map(Object::Reference).collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    doc.save_to(&mut output).expect("serialise sample PDF");
    output
}

/// The `Page N` label drawn on each page of a PDF, in page order.
pub(crate) fn page_labels(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).expect("load PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).expect("page content");
            let text = String::from_utf8_lossy(&content);
            let start = text.find("(Page ").expect("page label") + 1;
            let end = start + text[start..].find(')').expect("closing paren");
            text[start..end].to_string()
        })
        .collect()
}

/// Solid-colour PNG of the given size.
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 30, 30])));
    let mut buffer = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode PNG");
    buffer
}
