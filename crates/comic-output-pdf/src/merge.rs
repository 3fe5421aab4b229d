//! Concatenate single-page PDFs into one document.

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Look up `key` on the nearest ancestor of `page` that defines it.
fn inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn type_name(object: &Object) -> Option<&[u8]> {
    match object {
        Object::Dictionary(dict) => dict.get(b"Type").and_then(Object::as_name).ok(),
        _ => None,
    }
}

/// Merges pages of several documents, in order, under a fresh page tree.
pub struct Merger {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl Merger {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append every page of `sheet`.
    ///
    /// Inheritable attributes are copied down onto each page, so pages keep
    /// their size and resources once detached from their old tree.
    pub fn append(&mut self, mut sheet: Document) -> Result<(), String> {
        sheet.renumber_objects_with(self.doc.max_id + 1);

        let page_ids: Vec<ObjectId> = sheet.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err("document has no pages".to_string());
        }

        for &page_id in &page_ids {
            let page = sheet.get_dictionary(page_id).map_err(|e| e.to_string())?;
            let missing: Vec<(&[u8], Object)> = INHERITABLE
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| inherited(&sheet, page, key).map(|v| (*key, v)))
                .collect();

            let page = sheet
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| e.to_string())?;
            for (key, value) in missing {
                page.set(key, value);
            }
            page.set("Parent", self.pages_id);
        }

        for (id, object) in sheet.objects {
            if matches!(type_name(&object), Some(b"Catalog") | Some(b"Pages")) {
                continue;
            }
            self.doc.objects.insert(id, object);
        }
        self.doc.max_id = self.doc.max_id.max(sheet.max_id);
        self.kids
            .extend(page_ids.into_iter().map(Object::Reference));
        Ok(())
    }

    /// Close the page tree and return the merged document.
    pub fn finish(mut self, title: Option<&str>) -> Document {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => Object::Integer(count),
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal(concat!("comic2pdf ", env!("CARGO_PKG_VERSION"))),
        };
        if let Some(title) = title {
            info.set("Title", Object::string_literal(title));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);
        self.doc
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and merge `sheets` in order. Every sheet must load.
pub fn concatenate(sheets: &[PathBuf], title: Option<&str>) -> Result<Document, String> {
    let mut merger = Merger::new();
    for sheet in sheets {
        let doc = load(sheet)?;
        merger
            .append(doc)
            .map_err(|e| format!("{}: {}", sheet.display(), e))?;
    }
    Ok(merger.finish(title))
}

fn load(path: &Path) -> Result<Document, String> {
    Document::load(path).map_err(|e| format!("{}: {}", path.display(), e))
}
