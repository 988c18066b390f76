use super::*;

/// Normalize levels so the shallowest entry is level 1 and no level ever
/// exceeds its predecessor by more than one.
pub fn normalize_levels(entries: Vec<TocEntry>) -> Vec<TocEntry> {
    let Some(min_level) = entries.iter().map(|entry| entry.level).min() else {
        return Vec::new();
    };

    let mut normalized = Vec::with_capacity(entries.len());
    let mut previous_level = 0u32;
    for mut entry in entries {
        let shifted = entry.level - min_level + 1;
        entry.level = shifted.min(previous_level + 1);
        previous_level = entry.level;
        normalized.push(entry);
    }

    normalized
}

/// Assemble the flat, page-ordered entry list into a bookmark forest.
///
/// A stack of open ancestor levels decides where each entry attaches:
/// ancestors at the same or a deeper level are closed first, then the entry
/// becomes a child of whatever remains on top (or a new root).
pub fn build_bookmark_tree(entries: &[TocEntry]) -> Vec<BookmarkNode> {
    let mut roots = Vec::<BookmarkNode>::new();
    let mut open_levels = Vec::<u32>::new();

    for entry in entries {
        while let Some(&open_level) = open_levels.last() {
            if open_level >= entry.level {
                open_levels.pop();
            } else {
                break;
            }
        }

        let mut target = &mut roots;
        for _ in 0..open_levels.len() {
            if target.is_empty() {
                break;
            }
            target = &mut target.last_mut().unwrap().children;
        }

        target.push(BookmarkNode {
            title: entry.title.clone(),
            page: entry.page,
            children: Vec::new(),
        });
        open_levels.push(entry.level);
    }

    roots
}

pub fn count_bookmarks(nodes: &[BookmarkNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_bookmarks(&node.children))
        .sum()
}
