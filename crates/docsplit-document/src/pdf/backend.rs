// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF backend — the minimal page-level interface the extractor needs, and its
// `lopdf` implementation.

use std::collections::HashMap;

use docsplit_core::SplitConfig;
use docsplit_core::error::{DocsplitError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use tracing::{debug, instrument, warn};

/// Page-level access to a paginated document.
///
/// The extractor only needs to open bytes, count pages, and build a new
/// document from an ordered list of page indexes, so any PDF object model
/// that can do those three things plugs in here.
pub trait PageDocument: Sized {
    /// Parse a document from raw bytes.
    fn load(bytes: &[u8], config: &SplitConfig) -> Result<Self>;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Serialise a new, independent document containing the pages at
    /// `page_indexes` (zero-based) in exactly that order.
    fn new_document_from_pages(&self, page_indexes: &[usize]) -> Result<Vec<u8>>;
}

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees whose /Parent chain loops.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// `lopdf`-backed document.
pub struct LopdfDocument {
    /// The parsed source document. Never mutated after load.
    document: Document,
    /// Page object ids in page order, so index lookups are O(1).
    page_ids: Vec<ObjectId>,
    /// Header version written into extracted documents.
    output_version: String,
}

impl PageDocument for LopdfDocument {
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn load(bytes: &[u8], config: &SplitConfig) -> Result<Self> {
        let document = Document::load_mem(bytes).map_err(|err| {
            DocsplitError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        // get_pages() is keyed by 1-indexed page number, already sorted.
        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        debug!(pages = page_ids.len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            page_ids,
            output_version: config.pdf_version.clone(),
        })
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    #[instrument(skip_all, fields(pages = page_indexes.len()))]
    fn new_document_from_pages(&self, page_indexes: &[usize]) -> Result<Vec<u8>> {
        if page_indexes.is_empty() {
            return Err(DocsplitError::EmptyPageGroup { position: 0 });
        }
        let page_count = self.page_count();
        let source_ids = page_indexes
            .iter()
            .map(|&index| {
                self.page_ids
                    .get(index)
                    .copied()
                    .ok_or(DocsplitError::PageIndexOutOfRange {
                        index: index as i64,
                        page_count,
                    })
            })
            .collect::<Result<Vec<ObjectId>>>()?;

        let mut target = Document::with_version(self.output_version.clone());
        let pages_id = target.new_object_id();
        let new_ids: Vec<ObjectId> = source_ids.iter().map(|_| target.new_object_id()).collect();

        {
            let mut copier = ObjectCopier::new(&self.document, &mut target, &source_ids, &new_ids);
            for (&page_id, &new_id) in source_ids.iter().zip(&new_ids) {
                copier.copy_page(page_id, new_id, pages_id)?;
            }
        }
        let kids: Vec<Object> = new_ids.iter().copied().map(Object::Reference).collect();

        let kid_count = kids.len() as i64;
        target.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => kid_count,
            }),
        );
        let catalog_id = target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        target.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        target.save_to(&mut output).map_err(|err| {
            DocsplitError::PdfError(format!("failed to serialise extracted pages: {}", err))
        })?;

        debug!(output_bytes = output.len(), "Pages extracted");
        Ok(output)
    }
}

/// Copies objects from `source` into `target`, following references.
///
/// Every source object is copied at most once per extraction, so resources
/// shared between pages stay shared and reference cycles terminate. `/Parent`
/// keys are dropped; the caller points each copied page at its new page tree.
///
/// Page objects are never reached through references. A reference to a page
/// in the cut (a link destination, an annotation's `/P`) resolves to that
/// page's copy; a reference to any other page or page-tree node becomes
/// `Null`, so no content from outside the cut ends up in the output.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    copied: HashMap<ObjectId, ObjectId>,
    /// Source page id to the id of its first copy in the output.
    pages: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(
        source: &'a Document,
        target: &'a mut Document,
        source_pages: &[ObjectId],
        target_pages: &[ObjectId],
    ) -> Self {
        let mut pages = HashMap::with_capacity(source_pages.len());
        for (&source_id, &target_id) in source_pages.iter().zip(target_pages) {
            pages.entry(source_id).or_insert(target_id);
        }
        Self {
            source,
            target,
            copied: HashMap::new(),
            pages,
        }
    }

    /// Copy one page into the pre-allocated `new_id`, materialising
    /// inherited attributes on the copy.
    fn copy_page(&mut self, page_id: ObjectId, new_id: ObjectId, parent_id: ObjectId) -> Result<()> {
        let source = self.source;
        let page = source.get_dictionary(page_id).map_err(|err| {
            DocsplitError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let mut dict = self.copy_dictionary(page);
        for key in INHERITABLE_ATTRIBUTES {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page, key) {
                let copied = self.copy_object(value);
                dict.set(key.to_vec(), copied);
            }
        }
        dict.set("Parent", Object::Reference(parent_id));
        self.target.objects.insert(new_id, Object::Dictionary(dict));
        Ok(())
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            let cloned_value = self.copy_object(value);
            new_dict.set(key.clone(), cloned_value);
        }
        new_dict
    }

    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Reference(ref_id) => self.copy_reference(*ref_id),
            Object::Stream(stream) => {
                // Content bytes are kept as-is (still encoded); only the
                // dictionary needs its references rewritten.
                let mut new_stream = stream.clone();
                new_stream.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(new_stream)
            }
            // Boolean, Integer, Real, String, Name, Null.
            other => other.clone(),
        }
    }

    fn copy_reference(&mut self, ref_id: ObjectId) -> Object {
        if let Some(&page_copy) = self.pages.get(&ref_id) {
            return Object::Reference(page_copy);
        }
        if let Some(&existing) = self.copied.get(&ref_id) {
            return Object::Reference(existing);
        }

        let source = self.source;
        let referenced = match source.get_object(ref_id) {
            Ok(referenced) => referenced,
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                return Object::Null;
            }
        };
        if is_page_tree_node(referenced) {
            debug!(?ref_id, "Reference to a page outside the cut replaced by Null");
            return Object::Null;
        }

        // Reserve the id before recursing so cycles resolve to it.
        let new_id = self.target.new_object_id();
        self.copied.insert(ref_id, new_id);
        let copied = self.copy_object(referenced);
        self.target.objects.insert(new_id, copied);
        Object::Reference(new_id)
    }
}

/// `/Type /Page` or `/Type /Pages`.
fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|kind| kind.as_name().ok())
        .is_some_and(|kind| kind == b"Page" || kind == b"Pages")
}

/// Look up `key` on the ancestors of `page`, nearest first.
fn inherited_attribute<'a>(
    document: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = document.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
    }
    None
}
