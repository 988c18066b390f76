use super::*;

pub const SECTION_HEADER_ACCEPT_THRESHOLD: f32 = 0.4;

/// Vocabulary that strongly suggests an academic section heading.
const ACADEMIC_VOCABULARY: &[&str] = &[
    "abstract",
    "acknowledgments",
    "analysis",
    "appendix",
    "approach",
    "architecture",
    "background",
    "conclusion",
    "conclusions",
    "contributions",
    "discussion",
    "evaluation",
    "experiments",
    "implementation",
    "introduction",
    "limitations",
    "methodology",
    "methods",
    "motivation",
    "overview",
    "preliminaries",
    "references",
    "related",
    "results",
    "summary",
    "work",
];

/// First words that mark running prose rather than a heading.
const BODY_TEXT_STARTERS: &[&str] = &[
    "a", "after", "all", "although", "an", "and", "as", "at", "because", "before", "both", "but",
    "by", "during", "each", "for", "from", "however", "if", "in", "it", "its", "note", "of", "on",
    "once", "one", "our", "since", "so", "some", "such", "the", "then", "there", "these", "they",
    "this", "those", "thus", "to", "we", "when", "where", "while", "with",
];

const TITLE_CASE_STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "and", "in", "on", "for", "to", "with",
];

pub fn extract_section_headers(pages: &[String]) -> Result<Vec<TocCandidate>> {
    let scorer = SectionHeaderScorer::new()?;
    Ok(scorer.scan_pages(pages))
}

pub struct SectionHeaderScorer {
    chapter: Regex,
    subsubsection: Regex,
    subsection: Regex,
    section: Regex,
    leading_number: Regex,
    section_number_only: Regex,
    capitalized_start: Regex,
    reference_entry: Regex,
    author_entry: Regex,
    publication_marker: Regex,
    word: Regex,
}

impl SectionHeaderScorer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            chapter: Regex::new(r"(?i)^(chapter)\s+(\d+)[:\s]+(.+)$")
                .context("failed to compile chapter heading regex")?,
            subsubsection: Regex::new(r"^(\d+\.\d+\.\d+)\s+(.+)$")
                .context("failed to compile sub-subsection heading regex")?,
            subsection: Regex::new(r"^(\d+\.\d+)\s+(.+)$")
                .context("failed to compile subsection heading regex")?,
            section: Regex::new(r"^(\d{1,2})\.?\s+(.+)$")
                .context("failed to compile section heading regex")?,
            leading_number: Regex::new(r"^\d+\.?\s*")
                .context("failed to compile leading number regex")?,
            section_number_only: Regex::new(r"^\d+(\.\d+)*$")
                .context("failed to compile section number regex")?,
            capitalized_start: Regex::new(r"^[A-Z][A-Za-z]")
                .context("failed to compile capitalized start regex")?,
            reference_entry: Regex::new(r"^\d+\.\s+[A-Z][a-z]*\s*,")
                .context("failed to compile reference entry regex")?,
            author_entry: Regex::new(r"^\d+\.\s+[A-Z]\.\s+[A-Z]")
                .context("failed to compile author entry regex")?,
            publication_marker: Regex::new(r"ACM|IEEE|Springer|©|\d{4}[-/]\d{2,4}")
                .context("failed to compile publication marker regex")?,
            word: Regex::new(r"[A-Za-z]+").context("failed to compile word regex")?,
        })
    }

    /// Scan every page for heading-shaped lines, keeping those whose score
    /// clears the acceptance threshold. Useful for papers without a TOC page.
    pub fn scan_pages(&self, pages: &[String]) -> Vec<TocCandidate> {
        let mut seen = HashSet::<(String, i64)>::new();
        let mut candidates = Vec::new();

        for (page_index, page_text) in pages.iter().enumerate() {
            let page_number = (page_index + 1) as i64;
            let lines = page_text.lines().map(str::trim).collect::<Vec<&str>>();

            let mut index = 0usize;
            while index < lines.len() {
                let line = lines[index];
                if line.is_empty() || line.len() > 100 {
                    index += 1;
                    continue;
                }

                let (mut score, mut candidate) = self.score_line(line, page_number);

                // A bare section number may carry its title on the next
                // physical line; recombine before scoring.
                if candidate.is_none()
                    && index + 1 < lines.len()
                    && self.section_number_only.is_match(line)
                {
                    if self.is_probable_page_number(line, index, lines.len(), page_number) {
                        index += 1;
                        continue;
                    }

                    let next = lines[index + 1];
                    if !next.is_empty() && next.len() < 80 && self.capitalized_start.is_match(next)
                    {
                        let combined = format!("{line} {next}");
                        let (combined_score, combined_candidate) =
                            self.score_line(&combined, page_number);
                        if combined_candidate.is_some()
                            && combined_score >= SECTION_HEADER_ACCEPT_THRESHOLD
                        {
                            score = combined_score;
                            candidate = combined_candidate;
                            index += 1;
                        }
                    }
                }

                if let Some(candidate) = candidate {
                    if score >= SECTION_HEADER_ACCEPT_THRESHOLD {
                        let key = (candidate.title.to_lowercase(), page_number);
                        if seen.insert(key) {
                            candidates.push(candidate);
                        }
                    }
                }

                index += 1;
            }
        }

        candidates
    }

    /// Score a line as a potential section header, 0.0 to 1.0.
    pub fn score_line(&self, line: &str, page_number: i64) -> (f32, Option<TocCandidate>) {
        if line.len() < 3 || line.len() > 80 {
            return (0.0, None);
        }

        let Some(candidate) = self.match_heading_pattern(line, page_number) else {
            return (0.0, None);
        };

        // Matching a numbering pattern is a reasonable starting point.
        let mut score = 0.35f32;

        let title_words = self
            .word
            .find_iter(&candidate.title)
            .map(|word| word.as_str().to_lowercase())
            .collect::<HashSet<String>>();
        let academic_matches = title_words
            .iter()
            .filter(|word| ACADEMIC_VOCABULARY.contains(&word.as_str()))
            .count();
        if academic_matches > 0 {
            score += (academic_matches as f32 * 0.15).min(0.35);
        }

        let title_part = self
            .leading_number
            .replace(&candidate.title, "")
            .trim()
            .to_string();

        if is_all_caps(&title_part) && title_part.len() > 3 {
            score += 0.2;
        } else if is_title_case(&title_part) {
            score += 0.1;
        }

        if title_part.ends_with('.') || title_part.ends_with(',') || title_part.ends_with(';') {
            score -= 0.2;
        }

        let word_count = title_part.split_whitespace().count();
        if word_count == 1 && academic_matches == 0 {
            score -= 0.15;
        }
        if word_count > 10 {
            score -= 0.2;
        }

        // Reference lists, author lines, and publication footers share the
        // "N. Something" shape but are never headings.
        if self.reference_entry.is_match(line) {
            score -= 0.5;
        }
        if self.author_entry.is_match(line) {
            score -= 0.5;
        }
        if self.publication_marker.is_match(line) {
            score -= 0.5;
        }

        let first_word = title_part
            .split_whitespace()
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default();
        if BODY_TEXT_STARTERS.contains(&first_word.as_str()) {
            score -= 0.3;
        }

        if let Some(section_number) = leading_section_number(&candidate.title) {
            if section_number > 15 {
                score -= 0.3;
            }
            if section_number == 0 {
                score -= 0.3;
            }
        }

        (score.clamp(0.0, 1.0), Some(candidate))
    }

    fn match_heading_pattern(&self, line: &str, page_number: i64) -> Option<TocCandidate> {
        if let Some(captures) = self.chapter.captures(line) {
            let number = captures.get(2)?.as_str();
            let title = captures.get(3)?.as_str().trim();
            if title.len() > 2 {
                return Some(TocCandidate {
                    level: 1,
                    title: format!("Chapter {number}: {title}"),
                    page: PageRef::Pdf(page_number),
                });
            }
        }

        if let Some(captures) = self.subsubsection.captures(line) {
            let number = captures.get(1)?.as_str();
            let title = captures.get(2)?.as_str().trim();
            if title.len() >= 3 {
                return Some(TocCandidate {
                    level: 4,
                    title: format!("{number} {title}"),
                    page: PageRef::Pdf(page_number),
                });
            }
        }

        if let Some(captures) = self.subsection.captures(line) {
            let number = captures.get(1)?.as_str();
            let title = captures.get(2)?.as_str().trim();
            if title.len() >= 3 {
                return Some(TocCandidate {
                    level: 3,
                    title: format!("{number} {title}"),
                    page: PageRef::Pdf(page_number),
                });
            }
        }

        if let Some(captures) = self.section.captures(line) {
            let number = captures.get(1)?.as_str();
            let title = captures.get(2)?.as_str().trim();
            let number_value = number.parse::<i64>().ok()?;
            if title.len() >= 3 && number_value <= 20 {
                return Some(TocCandidate {
                    level: 2,
                    title: format!("{number}. {title}"),
                    page: PageRef::Pdf(page_number),
                });
            }
        }

        None
    }

    // A lone number in a header/footer slot that equals the PDF page index is
    // a printed page number, not a section number.
    fn is_probable_page_number(
        &self,
        line: &str,
        line_index: usize,
        line_count: usize,
        page_number: i64,
    ) -> bool {
        let first_component = line.split('.').next().unwrap_or_default();
        let Ok(value) = first_component.parse::<i64>() else {
            return false;
        };

        let edge_position = line_index < 3 || line_index + 3 >= line_count;
        edge_position && value == page_number
    }
}

fn leading_section_number(title: &str) -> Option<i64> {
    let (number, _) = title.split_once('.')?;
    number.parse::<i64>().ok()
}

fn is_all_caps(text: &str) -> bool {
    let mut has_alphabetic = false;
    for character in text.chars() {
        if character.is_alphabetic() {
            has_alphabetic = true;
            if character.is_lowercase() {
                return false;
            }
        }
    }
    has_alphabetic
}

fn is_title_case(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }

    text.split_whitespace().all(|word| {
        word.chars()
            .next()
            .map(|character| character.is_uppercase())
            .unwrap_or(true)
            || TITLE_CASE_STOPWORDS.contains(&word.to_lowercase().as_str())
    })
}
