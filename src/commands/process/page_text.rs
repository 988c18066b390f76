use super::*;

/// Extract per-page plain text through pdftotext, splitting on form feeds.
///
/// Hyphenated line wraps are merged back together before any classification
/// runs, so a heading broken across physical lines scores as one line.
pub fn extract_page_texts(pdf_path: &Path, last_page: Option<usize>) -> Result<PageTexts> {
    let pages = run_pdftotext(pdf_path, last_page)?;
    let mut texts = PageTexts {
        pages,
        dehyphenation_merges: 0,
    };

    for page in &mut texts.pages {
        let lines = page.lines().map(str::to_string).collect::<Vec<String>>();
        let (merged, merges) = merge_hyphenated_lines(lines);
        texts.dehyphenation_merges += merges;
        *page = merged.join("\n");
    }

    Ok(texts)
}

fn run_pdftotext(pdf_path: &Path, last_page: Option<usize>) -> Result<Vec<String>> {
    let mut command = Command::new("pdftotext");
    command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if let Some(last_page) = last_page {
        command.arg("-l").arg(last_page.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last) = pages.last() {
        if last.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    Ok(pages)
}

pub fn non_whitespace_char_count(text: &str) -> usize {
    text.chars()
        .filter(|character| !character.is_whitespace())
        .count()
}

pub fn merge_hyphenated_lines(lines: Vec<String>) -> (Vec<String>, usize) {
    let mut merged = Vec::<String>::new();
    let mut merges = 0usize;
    let mut index = 0usize;

    while index < lines.len() {
        let current = lines[index].clone();
        if index + 1 < lines.len() {
            let next = &lines[index + 1];
            if should_merge_hyphenated_pair(&current, next) {
                let joined = format!(
                    "{}{}",
                    current.trim_end().trim_end_matches('-'),
                    next.trim_start()
                );
                merged.push(joined);
                merges += 1;
                index += 2;
                continue;
            }
        }

        merged.push(current);
        index += 1;
    }

    (merged, merges)
}

fn should_merge_hyphenated_pair(current: &str, next: &str) -> bool {
    let left = current.trim_end();
    if !left.ends_with('-') {
        return false;
    }

    let starts_with_lowercase = next
        .trim_start()
        .chars()
        .next()
        .map(|character| character.is_ascii_lowercase())
        .unwrap_or(false);
    if !starts_with_lowercase {
        return false;
    }

    left.trim_end_matches('-')
        .chars()
        .last()
        .map(|character| character.is_ascii_alphabetic())
        .unwrap_or(false)
}
