use super::*;

struct OutlineItem<'a> {
    id: ObjectId,
    node: &'a BookmarkNode,
    children: Vec<OutlineItem<'a>>,
}

/// Write the bookmark tree into the document as a PDF outline.
///
/// Every node becomes an outline dictionary linked to its parent and
/// siblings; containers carry `First`/`Last` and a negative `Count` so
/// viewers render them collapsed. Returns how many outline entries were
/// written.
pub fn write_outline_tree(document: &mut Document, tree: &[BookmarkNode]) -> Result<usize> {
    if tree.is_empty() {
        return Ok(0);
    }

    let page_ids = document.get_pages();
    let items = allocate_items(document, tree);
    let root_id = document.new_object_id();

    let first_id = items.first().map(|item| item.id).unwrap_or(root_id);
    let last_id = items.last().map(|item| item.id).unwrap_or(root_id);
    document.objects.insert(
        root_id,
        dictionary! {
            "Type" => "Outlines",
            "First" => first_id,
            "Last" => last_id,
            "Count" => items.len() as i64,
        }
        .into(),
    );

    let written = insert_outline_level(document, &items, root_id, &page_ids);
    attach_outline_root(document, root_id)?;

    Ok(written)
}

// Object ids are allocated up front so sibling and parent links can
// reference nodes that have not been inserted yet.
fn allocate_items<'a>(document: &mut Document, nodes: &'a [BookmarkNode]) -> Vec<OutlineItem<'a>> {
    nodes
        .iter()
        .map(|node| OutlineItem {
            id: document.new_object_id(),
            children: allocate_items(document, &node.children),
            node,
        })
        .collect()
}

fn insert_outline_level(
    document: &mut Document,
    items: &[OutlineItem<'_>],
    parent_id: ObjectId,
    page_ids: &BTreeMap<u32, ObjectId>,
) -> usize {
    let mut written = 0usize;

    for (index, item) in items.iter().enumerate() {
        let mut dict = dictionary! {
            "Title" => Object::String(encode_pdf_text(&item.node.title), StringFormat::Literal),
            "Parent" => parent_id,
        };

        match page_ids.get(&(item.node.page as u32)) {
            Some(&page_id) => {
                dict.set(
                    "Dest",
                    vec![Object::Reference(page_id), Object::Name(b"Fit".to_vec())],
                );
            }
            None => {
                warn!(
                    title = %item.node.title,
                    page = item.node.page,
                    "bookmark target page not found in document, writing without destination"
                );
            }
        }

        if index > 0 {
            dict.set("Prev", items[index - 1].id);
        }
        if index + 1 < items.len() {
            dict.set("Next", items[index + 1].id);
        }
        if let (Some(first), Some(last)) = (item.children.first(), item.children.last()) {
            dict.set("First", first.id);
            dict.set("Last", last.id);
            dict.set("Count", -(item.children.len() as i64));
            written += insert_outline_level(document, &item.children, item.id, page_ids);
        }

        document.objects.insert(item.id, dict.into());
        written += 1;
    }

    written
}

fn attach_outline_root(document: &mut Document, root_id: ObjectId) -> Result<()> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .context("pdf trailer has no Root entry")?
        .as_reference()
        .context("pdf Root entry is not a reference")?;

    let catalog = document
        .get_object_mut(catalog_id)
        .context("failed to load pdf catalog")?
        .as_dict_mut()
        .context("pdf catalog is not a dictionary")?;

    catalog.set("Outlines", Object::Reference(root_id));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

    Ok(())
}

// PDF text strings are either latin-1-ish bytes or UTF-16BE with a BOM.
fn encode_pdf_text(value: &str) -> Vec<u8> {
    if value.chars().all(|character| (character as u32) <= 0xFF) {
        return value.chars().map(|character| character as u8).collect();
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect::<Vec<u16>>();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&byte| byte as char).collect()
}

/// Flatten any existing outline into page-targeted entries.
pub fn read_existing_bookmarks(document: &Document) -> Vec<TocEntry> {
    let mut entries = Vec::new();

    let page_numbers = document
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number as i64))
        .collect::<HashMap<ObjectId, i64>>();

    let Some(first_id) = outline_first_id(document) else {
        return entries;
    };

    let mut visited = HashSet::new();
    collect_outline_entries(
        document,
        Some(first_id),
        1,
        &page_numbers,
        &mut entries,
        &mut visited,
    );

    entries
}

fn outline_first_id(document: &Document) -> Option<ObjectId> {
    let catalog_id = document.trailer.get(b"Root").ok()?.as_reference().ok()?;
    let catalog = document.get_object(catalog_id).ok()?.as_dict().ok()?;
    let root = deref(document, catalog.get(b"Outlines").ok()?).as_dict().ok()?;
    root.get(b"First").ok()?.as_reference().ok()
}

fn collect_outline_entries(
    document: &Document,
    mut current: Option<ObjectId>,
    level: u32,
    page_numbers: &HashMap<ObjectId, i64>,
    entries: &mut Vec<TocEntry>,
    visited: &mut HashSet<ObjectId>,
) {
    while let Some(id) = current {
        // Malformed outlines can link in cycles.
        if !visited.insert(id) {
            return;
        }

        let Ok(dict) = document.get_object(id).and_then(Object::as_dict) else {
            return;
        };

        let title = match dict.get(b"Title") {
            Ok(object) => match deref(document, object) {
                Object::String(bytes, _) => decode_pdf_text(bytes),
                _ => String::new(),
            },
            Err(_) => String::new(),
        };
        let page = destination_page(document, dict, page_numbers).unwrap_or(0);
        entries.push(TocEntry { level, title, page });

        if let Ok(first) = dict.get(b"First").and_then(Object::as_reference) {
            collect_outline_entries(
                document,
                Some(first),
                level + 1,
                page_numbers,
                entries,
                visited,
            );
        }

        current = dict.get(b"Next").and_then(Object::as_reference).ok();
    }
}

fn destination_page(
    document: &Document,
    outline_dict: &lopdf::Dictionary,
    page_numbers: &HashMap<ObjectId, i64>,
) -> Option<i64> {
    let dest = if let Ok(dest) = outline_dict.get(b"Dest") {
        deref(document, dest).clone()
    } else {
        let action = deref(document, outline_dict.get(b"A").ok()?).as_dict().ok()?;
        deref(document, action.get(b"D").ok()?).clone()
    };

    let Object::Array(elements) = dest else {
        return None;
    };
    let page_id = elements.first()?.as_reference().ok()?;
    page_numbers.get(&page_id).copied()
}

fn deref<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    if let Object::Reference(id) = object {
        if let Ok(resolved) = document.get_object(*id) {
            return resolved;
        }
    }
    object
}

/// Sanity-check an existing outline against the document.
///
/// Returns whether it looks correct plus the list of problems found.
pub fn verify_bookmarks(entries: &[TocEntry], pages: &[String]) -> (bool, Vec<String>) {
    let mut issues = Vec::new();
    if entries.is_empty() {
        return (true, issues);
    }

    let page_count = pages.len() as i64;

    let distinct_pages = entries
        .iter()
        .map(|entry| entry.page)
        .collect::<HashSet<i64>>();
    let all_level_one = entries.iter().all(|entry| entry.level == 1);
    if distinct_pages.len() == 1 && all_level_one && entries.len() <= 3 {
        issues.push(format!(
            "bookmarks lack structure: {} entries all pointing to page {}",
            entries.len(),
            entries[0].page
        ));
    }

    if entries.len() < 3 && page_count > 10 {
        issues.push(format!(
            "too few bookmarks ({}) for document size ({page_count} pages)",
            entries.len()
        ));
    }

    // Spot-check titles against the text of their target pages, preferring
    // entries that do not point at page 1.
    let sample_size = 5.min(entries.len());
    let mut sample = entries.iter().collect::<Vec<&TocEntry>>();
    sample.sort_by_key(|entry| (entry.page == 1, entry.page));
    sample.truncate(sample_size);

    let keyword = match Regex::new(r"[A-Za-z]{4,}") {
        Ok(keyword) => keyword,
        Err(_) => return (issues.is_empty(), issues),
    };

    let mut content_issues = 0usize;
    for entry in &sample {
        if entry.page < 1 || entry.page > page_count {
            issues.push(format!(
                "bookmark '{}' points to invalid page {}",
                entry.title, entry.page
            ));
            continue;
        }

        let Some(text) = pages.get((entry.page - 1) as usize) else {
            continue;
        };
        let lowered = text.to_lowercase();

        let keywords = keyword
            .find_iter(&entry.title)
            .map(|word| word.as_str().to_lowercase())
            .collect::<Vec<String>>();
        if keywords.len() < 2 {
            continue;
        }

        let matches = keywords
            .iter()
            .filter(|word| lowered.contains(word.as_str()))
            .count();
        if matches == 0 {
            content_issues += 1;
        }
    }

    if content_issues > sample_size / 2 {
        issues.push(format!(
            "{content_issues} of {sample_size} sampled bookmarks have content mismatch"
        ));
    }

    (issues.is_empty(), issues)
}
