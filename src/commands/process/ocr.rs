use super::*;

/// Check whether a PDF already carries an extractable text layer by sampling
/// the first few pages.
pub fn pdf_has_text(pdf_path: &Path, min_text_chars: usize) -> Result<bool> {
    let sample = extract_page_texts(pdf_path, Some(5))?;
    let total: usize = sample
        .pages
        .iter()
        .map(|page| non_whitespace_char_count(page))
        .sum();

    Ok(total > min_text_chars)
}

/// Run ocrmypdf over the whole document, writing a searchable PDF to `output`.
pub fn run_ocr(source: &Path, output: &Path, lang: &str, optimize: u8) -> Result<()> {
    let result = Command::new("ocrmypdf")
        .arg("--force-ocr")
        .arg("--output-type")
        .arg("pdf")
        .arg("--optimize")
        .arg(optimize.to_string())
        .arg("-l")
        .arg(lang)
        .arg(source)
        .arg(output)
        .output()
        .with_context(|| format!("failed to execute ocrmypdf for {}", source.display()))?;

    // Exit status 6 means the file already has a text layer, which is fine.
    if !result.status.success() && result.status.code() != Some(6) {
        let stderr = String::from_utf8_lossy(&result.stderr);
        bail!(
            "ocrmypdf returned non-zero exit status for {}: {}",
            source.display(),
            stderr.trim()
        );
    }

    Ok(())
}

pub fn command_available(program: &str) -> bool {
    Command::new(program).arg("--version").output().is_ok()
}

/// Unique scratch path for the OCR output so concurrent runs never collide.
pub fn ocr_scratch_path(source: &Path) -> PathBuf {
    let source_stem = source
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("pdf");
    let safe_stem = source_stem
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character
            } else {
                '_'
            }
        })
        .collect::<String>();

    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!(
        "pdftoc_ocr_{}_{}_{}.pdf",
        safe_stem,
        std::process::id(),
        stamp
    ))
}
