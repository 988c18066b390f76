use super::*;

const TOC_INDICATORS: &[&str] = &[
    "contents",
    "table of contents",
    "inhaltsverzeichnis",
    "índice",
    "sommaire",
];

/// Front-matter headings that are TOC entries even without a page token.
const FRONT_MATTER_HEADINGS: &[&str] = &[
    "preface",
    "foreword",
    "prologue",
    "epilogue",
    "introduction",
    "conclusion",
    "acknowledgements",
    "acknowledgments",
    "bibliography",
    "references",
    "glossary",
    "notation",
    "index",
    "appendix",
];

/// Find table-of-contents pages within the leading pages of the document.
///
/// Only lines from these pages are classified, which keeps running headers
/// and in-body chapter titles from masquerading as TOC entries.
pub fn find_toc_pages(pages: &[String], scan_limit: usize) -> Vec<usize> {
    pages
        .iter()
        .take(scan_limit)
        .enumerate()
        .filter_map(|(index, text)| looks_like_toc_page(text).then_some(index))
        .collect()
}

fn looks_like_toc_page(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if TOC_INDICATORS
        .iter()
        .any(|indicator| lowered.contains(indicator))
    {
        return true;
    }

    // Column-layout TOC pages show up as many bare page numbers at line ends.
    let number_lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().all(|character| character.is_ascii_digit()))
        .count();

    number_lines >= 5
}

pub fn extract_toc_candidates(
    pages: &[String],
    toc_page_indices: &[usize],
    total_pages: i64,
) -> Result<Vec<TocCandidate>> {
    if toc_page_indices.is_empty() {
        return Ok(Vec::new());
    }

    let toc_text = toc_page_indices
        .iter()
        .filter_map(|&index| pages.get(index).map(String::as_str))
        .collect::<Vec<&str>>()
        .join("\n");
    debug!(
        chars = toc_text.len(),
        toc_pages = toc_page_indices.len(),
        "combined toc page text"
    );

    let parser = TocLineParser::new()?;
    let mut candidates = parser.parse_dotted_leaders(&toc_text, total_pages);
    if candidates.is_empty() {
        debug!("no dotted leader entries found, trying stacked line layout");
        candidates = parser.parse_line_by_line(&toc_text, total_pages);
    }

    Ok(candidates)
}

pub struct TocLineParser {
    chapter: Regex,
    part: Regex,
    section_keyword: Regex,
    subsubsection: Regex,
    subsection: Regex,
    numbered: Regex,
    titled_leader: Regex,
    bare_number: Regex,
    roman_only: Regex,
    dotted_path: Regex,
    plain_title: Regex,
    contents_noise: Regex,
    date_noise: Regex,
}

impl TocLineParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            chapter: Regex::new(
                r"(?i)^chapter\s+(\d+)(?:\s*[:.]?\s+(.+?))?\s*[.…·_\s-]{3,}\s*(\d+)\s*$",
            )
            .context("failed to compile chapter regex")?,
            part: Regex::new(
                r"(?i)^part\s+([ivxlc]+|\d+)(?:\s*[:.]?\s+(.+?))?\s*[.…·_\s-]{3,}\s*(\d+)\s*$",
            )
            .context("failed to compile part regex")?,
            section_keyword: Regex::new(
                r"(?i)^section\s+(\d+(?:\.\d+)*)(?:\s*[:.]?\s+(.+?))?\s*[.…·_\s-]{3,}\s*(\d+)\s*$",
            )
            .context("failed to compile section regex")?,
            subsubsection: Regex::new(r"^(\d+\.\d+\.\d+)\s+(.+?)\s*[.…·_\s-]{3,}\s*(\d+)\s*$")
                .context("failed to compile sub-subsection regex")?,
            subsection: Regex::new(r"^(\d+\.\d+)\s+(.+?)\s*[.…·_\s-]{3,}\s*(\d+)\s*$")
                .context("failed to compile subsection regex")?,
            numbered: Regex::new(r"^(\d+)[.)]\s+(.+?)\s*[.…·_\s-]{3,}\s*(\d+)\s*$")
                .context("failed to compile numbered heading regex")?,
            titled_leader: Regex::new(
                r"^([A-Z][A-Za-z][A-Za-z\s,':\-]*?)\s*[.…·_\-]{3,}\s*(\d{1,4}|[ivxlcdm]{1,8})\s*$",
            )
            .context("failed to compile titled leader regex")?,
            bare_number: Regex::new(r"^\d+$").context("failed to compile bare number regex")?,
            roman_only: Regex::new(r"(?i)^[ivx]+$")
                .context("failed to compile roman numeral regex")?,
            dotted_path: Regex::new(r"^(\d+(?:\.\d+)+)$")
                .context("failed to compile dotted path regex")?,
            plain_title: Regex::new(r"^[A-Z][A-Za-z\s,\-:]+$")
                .context("failed to compile plain title regex")?,
            contents_noise: Regex::new(r"(?i)^(contents?|table of contents)$")
                .context("failed to compile contents noise regex")?,
            date_noise: Regex::new(r"^\w+\s+\d+,\s+\d{4}$")
                .context("failed to compile date noise regex")?,
        })
    }

    /// Parse `Title ..... page` style lines from combined TOC page text.
    pub fn parse_dotted_leaders(&self, toc_text: &str, total_pages: i64) -> Vec<TocCandidate> {
        let mut seen = HashSet::<(String, i64)>::new();
        let mut candidates = Vec::new();

        for raw_line in toc_text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(candidate) = self.match_dotted_line(line, total_pages) {
                if seen.insert((candidate.title.to_lowercase(), page_key(candidate.page))) {
                    candidates.push(candidate);
                }
                continue;
            }

            // Keyword headings without any page token are kept for the
            // resolver's body-text search instead of being guessed here.
            if let Some(title) = match_front_matter_heading(line) {
                if seen.insert((title.to_lowercase(), page_key(PageRef::Unresolved))) {
                    candidates.push(TocCandidate {
                        level: 2,
                        title,
                        page: PageRef::Unresolved,
                    });
                }
            }
        }

        candidates
    }

    fn match_dotted_line(&self, line: &str, total_pages: i64) -> Option<TocCandidate> {
        if let Some(captures) = self.chapter.captures(line) {
            let number = captures.get(1)?.as_str();
            let title = keyword_title("Chapter", number, captures.get(2).map(|m| m.as_str()));
            let page = bounded_page(captures.get(3)?.as_str(), total_pages)?;
            return Some(TocCandidate {
                level: 1,
                title,
                page: PageRef::Printed(page),
            });
        }

        if let Some(captures) = self.part.captures(line) {
            let number = captures.get(1)?.as_str().to_uppercase();
            let title = keyword_title("Part", &number, captures.get(2).map(|m| m.as_str()));
            let page = bounded_page(captures.get(3)?.as_str(), total_pages)?;
            return Some(TocCandidate {
                level: 1,
                title,
                page: PageRef::Printed(page),
            });
        }

        if let Some(captures) = self.section_keyword.captures(line) {
            let number = captures.get(1)?.as_str();
            let title = keyword_title("Section", number, captures.get(2).map(|m| m.as_str()));
            let page = bounded_page(captures.get(3)?.as_str(), total_pages)?;
            let level = number.matches('.').count() as u32 + 2;
            return Some(TocCandidate {
                level,
                title,
                page: PageRef::Printed(page),
            });
        }

        if let Some(captures) = self.subsubsection.captures(line) {
            return numbered_path_candidate(&captures, 4, total_pages);
        }

        if let Some(captures) = self.subsection.captures(line) {
            return numbered_path_candidate(&captures, 3, total_pages);
        }

        if let Some(captures) = self.numbered.captures(line) {
            let number = captures.get(1)?.as_str();
            let title = clean_title_fragment(captures.get(2)?.as_str());
            if title.is_empty() {
                return None;
            }
            let page = bounded_page(captures.get(3)?.as_str(), total_pages)?;
            return Some(TocCandidate {
                level: 2,
                title: format!("{number}. {title}"),
                page: PageRef::Printed(page),
            });
        }

        if let Some(captures) = self.titled_leader.captures(line) {
            let title = clean_title_fragment(captures.get(1)?.as_str());
            if title.is_empty() {
                return None;
            }
            let page = parse_page_number(captures.get(2)?.as_str(), total_pages)?;
            return Some(TocCandidate {
                level: 2,
                title,
                page: PageRef::Printed(page),
            });
        }

        None
    }

    /// Parse column-layout TOCs where number, title, and page number end up on
    /// separate physical lines.
    pub fn parse_line_by_line(&self, toc_text: &str, total_pages: i64) -> Vec<TocCandidate> {
        let lines = toc_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>();

        let mut seen = HashSet::<(String, i64)>::new();
        let mut candidates = Vec::new();
        let mut index = 0usize;

        while index < lines.len() {
            let line = lines[index];
            if self.contents_noise.is_match(line) || self.date_noise.is_match(line) {
                index += 1;
                continue;
            }

            match self.parse_stacked_entry(&lines, index, total_pages) {
                Some((candidate, next_index)) => {
                    if seen.insert((candidate.title.to_lowercase(), page_key(candidate.page))) {
                        candidates.push(candidate);
                    }
                    index = next_index;
                }
                None => index += 1,
            }
        }

        candidates
    }

    fn parse_stacked_entry(
        &self,
        lines: &[&str],
        index: usize,
        total_pages: i64,
    ) -> Option<(TocCandidate, usize)> {
        let line = lines[index];

        // "1" / "A whirlwind history" / "1"
        if self.bare_number.is_match(line) && index + 2 < lines.len() {
            let title_line = lines[index + 1];
            let page_line = lines[index + 2];
            if self.stacked_title_is_plausible(title_line) {
                if let Some(page) = parse_page_number(page_line, total_pages) {
                    return Some((
                        TocCandidate {
                            level: 2,
                            title: format!("{line}. {title_line}"),
                            page: PageRef::Printed(page),
                        },
                        index + 3,
                    ));
                }
            }
        }

        // "I" / "Core Concepts" / "7"
        if self.roman_only.is_match(line) && index + 2 < lines.len() {
            let title_line = lines[index + 1];
            let page_line = lines[index + 2];
            if self.stacked_title_is_plausible(title_line) {
                if let Some(page) = parse_page_number(page_line, total_pages) {
                    return Some((
                        TocCandidate {
                            level: 1,
                            title: format!("Part {}: {title_line}", line.to_uppercase()),
                            page: PageRef::Printed(page),
                        },
                        index + 3,
                    ));
                }
            }
        }

        // "Preface" / "ix"
        if self.plain_title.is_match(line) && index + 1 < lines.len() {
            if let Some(page) = parse_page_number(lines[index + 1], total_pages) {
                return Some((
                    TocCandidate {
                        level: 2,
                        title: line.to_string(),
                        page: PageRef::Printed(page),
                    },
                    index + 2,
                ));
            }
        }

        // "1.1" / "Getting started" / "12"
        if self.dotted_path.is_match(line) && index + 2 < lines.len() {
            let title_line = lines[index + 1];
            let page_line = lines[index + 2];
            if !self.bare_number.is_match(title_line) {
                if let Some(page) = parse_page_number(page_line, total_pages) {
                    let level = line.matches('.').count() as u32 + 2;
                    return Some((
                        TocCandidate {
                            level,
                            title: format!("{line} {title_line}"),
                            page: PageRef::Printed(page),
                        },
                        index + 3,
                    ));
                }
            }
        }

        None
    }

    fn stacked_title_is_plausible(&self, title_line: &str) -> bool {
        !self.bare_number.is_match(title_line) && !self.roman_only.is_match(title_line)
    }
}

fn numbered_path_candidate(
    captures: &regex::Captures<'_>,
    level: u32,
    total_pages: i64,
) -> Option<TocCandidate> {
    let number = captures.get(1)?.as_str();
    let title = clean_title_fragment(captures.get(2)?.as_str());
    if title.is_empty() {
        return None;
    }
    let page = bounded_page(captures.get(3)?.as_str(), total_pages)?;

    Some(TocCandidate {
        level,
        title: format!("{number} {title}"),
        page: PageRef::Printed(page),
    })
}

fn keyword_title(keyword: &str, number: &str, fragment: Option<&str>) -> String {
    let cleaned = fragment.map(clean_title_fragment).unwrap_or_default();
    if cleaned.is_empty() {
        format!("{keyword} {number}")
    } else {
        format!("{keyword} {number}: {cleaned}")
    }
}

/// Strip stray leader characters the lazy title capture may have swallowed.
fn clean_title_fragment(raw: &str) -> String {
    raw.trim_matches(|character: char| {
        matches!(character, '.' | '…' | '·' | '-' | '_') || character.is_whitespace()
    })
    .to_string()
}

fn match_front_matter_heading(line: &str) -> Option<String> {
    if line.len() > 40 || line.split_whitespace().count() > 4 {
        return None;
    }

    let lowered = line.to_lowercase();
    let is_heading = FRONT_MATTER_HEADINGS.iter().any(|keyword| {
        lowered == *keyword || lowered.starts_with(&format!("{keyword} "))
    });

    is_heading.then(|| line.to_string())
}

fn bounded_page(token: &str, total_pages: i64) -> Option<i64> {
    let page = token.parse::<i64>().ok()?;
    (page >= 1 && page <= total_pages + 50).then_some(page)
}

/// Parse an arabic or roman page token from TOC text.
pub fn parse_page_number(token: &str, total_pages: i64) -> Option<i64> {
    let token = token.trim().to_lowercase();
    if !token.is_empty() && token.chars().all(|character| character.is_ascii_digit()) {
        return bounded_page(&token, total_pages);
    }

    roman_page_value(&token)
}

// Roman numerals label front matter, which sits in the first pages of the
// PDF; the raw value is close enough for the offset search to anchor on.
fn roman_page_value(token: &str) -> Option<i64> {
    let value = match token {
        "i" => 1,
        "ii" => 2,
        "iii" => 3,
        "iv" => 4,
        "v" => 5,
        "vi" => 6,
        "vii" => 7,
        "viii" => 8,
        "ix" => 9,
        "x" => 10,
        "xi" => 11,
        "xii" => 12,
        "xiii" => 13,
        "xiv" => 14,
        "xv" => 15,
        "xvi" => 16,
        "xvii" => 17,
        "xviii" => 18,
        "xix" => 19,
        "xx" => 20,
        _ => return None,
    };

    Some(value)
}

fn page_key(page: PageRef) -> i64 {
    match page {
        PageRef::Printed(value) | PageRef::Pdf(value) => value,
        PageRef::Unresolved => -1,
    }
}
