use super::*;

pub struct PageResolver {
    offset_keyword: Regex,
    search_keyword: Regex,
}

impl PageResolver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            offset_keyword: Regex::new(r"[A-Za-z]{5,}")
                .context("failed to compile offset keyword regex")?,
            search_keyword: Regex::new(r"[A-Za-z]{4,}")
                .context("failed to compile search keyword regex")?,
        })
    }

    /// Resolve every candidate to a concrete PDF page.
    ///
    /// Printed page numbers get the document-wide printed-to-PDF offset
    /// applied; candidates without any page token are searched for in the
    /// body text. Candidates neither strategy can place are dropped rather
    /// than inserted with a guessed page. Already-resolved candidates pass
    /// through unchanged, so resolution is idempotent.
    pub fn resolve(
        &self,
        candidates: &[TocCandidate],
        pages: &[String],
        toc_page_indices: &[usize],
        page_count: i64,
    ) -> Resolution {
        let skip_pages = toc_skip_set(toc_page_indices, pages.len());
        let offset = self.detect_page_offset(candidates, pages, &skip_pages);

        let mut resolution = Resolution::default();
        for candidate in candidates {
            let resolved = match candidate.page {
                PageRef::Pdf(page) => Some(page),
                PageRef::Printed(page) => Some(page + offset),
                PageRef::Unresolved => self.search_title_page(&candidate.title, pages, &skip_pages),
            };

            match resolved {
                Some(page) => resolution.entries.push(TocEntry {
                    level: candidate.level,
                    title: candidate.title.clone(),
                    page: page.clamp(1, page_count.max(1)),
                }),
                None => {
                    warn!(title = %candidate.title, "dropping unresolvable toc entry");
                    resolution.warnings.push(format!(
                        "dropped '{}': no page token and title not found in body text",
                        candidate.title
                    ));
                    resolution.dropped += 1;
                }
            }
        }

        resolution
    }

    /// Find the offset between printed page numbers and PDF page indices by
    /// locating distinctive entry titles in the body text and voting.
    fn detect_page_offset(
        &self,
        candidates: &[TocCandidate],
        pages: &[String],
        skip_pages: &HashSet<usize>,
    ) -> i64 {
        let printed = candidates
            .iter()
            .filter_map(|candidate| match candidate.page {
                PageRef::Printed(page) => Some((page, candidate)),
                _ => None,
            })
            .collect::<Vec<(i64, &TocCandidate)>>();

        // Entries deeper into the document give more distinctive anchors.
        let mut sample = printed
            .iter()
            .filter(|(page, _)| *page > 20)
            .copied()
            .collect::<Vec<(i64, &TocCandidate)>>();
        sample.sort_by_key(|(page, _)| *page);
        if sample.is_empty() {
            sample = printed
                .iter()
                .filter(|(page, _)| *page > 5)
                .copied()
                .collect();
        }
        sample.truncate(5);

        let mut votes = HashMap::<i64, usize>::new();
        for (printed_page, candidate) in sample {
            let words = self
                .offset_keyword
                .find_iter(&candidate.title)
                .map(|word| word.as_str().to_lowercase())
                .collect::<Vec<String>>();
            if words.len() < 2 {
                continue;
            }

            for test_offset in -20i64..30 {
                let page_index = printed_page + test_offset - 1;
                if page_index < 0 || page_index as usize >= pages.len() {
                    continue;
                }
                let page_index = page_index as usize;
                if skip_pages.contains(&page_index) {
                    continue;
                }

                let text = pages[page_index].to_lowercase();
                let matches = words.iter().filter(|word| text.contains(word.as_str())).count();
                if matches >= 2.min(words.len()) {
                    debug!(
                        title = %candidate.title,
                        page = page_index + 1,
                        offset = test_offset,
                        "matched toc entry in body text"
                    );
                    *votes.entry(test_offset).or_insert(0) += 1;
                    break;
                }
            }
        }

        let mut best_offset = 0i64;
        let mut best_count = 0usize;
        for (offset, count) in votes {
            let better = count > best_count
                || (count == best_count && (offset.abs(), offset) < (best_offset.abs(), best_offset));
            if better {
                best_offset = offset;
                best_count = count;
            }
        }

        if best_count == 0 {
            debug!("could not determine page offset, using 0");
        } else {
            debug!(offset = best_offset, votes = best_count, "detected page offset");
        }

        best_offset
    }

    fn search_title_page(
        &self,
        title: &str,
        pages: &[String],
        skip_pages: &HashSet<usize>,
    ) -> Option<i64> {
        let words = self
            .search_keyword
            .find_iter(title)
            .map(|word| word.as_str().to_lowercase())
            .collect::<Vec<String>>();
        if words.is_empty() {
            return None;
        }
        let needed = 2.min(words.len());

        for (index, text) in pages.iter().enumerate() {
            if skip_pages.contains(&index) {
                continue;
            }

            let lowered = text.to_lowercase();
            let matches = words
                .iter()
                .filter(|word| lowered.contains(word.as_str()))
                .count();
            if matches >= needed {
                return Some((index + 1) as i64);
            }
        }

        None
    }
}

// TOC pages and their neighbors repeat every entry title, so they must be
// excluded from any body-text search.
fn toc_skip_set(toc_page_indices: &[usize], page_total: usize) -> HashSet<usize> {
    let mut skip = HashSet::new();
    for &index in toc_page_indices {
        skip.insert(index.saturating_sub(1));
        for offset in 0..=2usize {
            let neighbor = index + offset;
            if neighbor < page_total {
                skip.insert(neighbor);
            }
        }
    }
    skip
}
