use super::*;

pub fn run(args: Cli) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let mut counts = ProcessCounts::default();
    let mut warnings = Vec::<String>::new();

    if !args.source.is_file() {
        bail!(
            "source PDF does not exist or is not a file: {}",
            args.source.display()
        );
    }
    if !command_available("pdftotext") {
        bail!("pdftotext is required but was not found on PATH");
    }

    info!(
        source = %args.source.display(),
        output = %args.output.display(),
        run_id = %run_id,
        "processing pdf"
    );

    let scratch = ocr_scratch_path(&args.source);
    let working_pdf = prepare_working_pdf(&args, &scratch, &mut counts, &mut warnings)?;

    let mut document = Document::load(&working_pdf)
        .with_context(|| format!("failed to load {}", working_pdf.display()))?;
    let page_count = document.get_pages().len() as i64;
    counts.page_count = page_count as usize;

    let texts = extract_page_texts(&working_pdf, None)?;
    counts.dehyphenation_merges = texts.dehyphenation_merges;
    debug!(
        pages = texts.pages.len(),
        merges = texts.dehyphenation_merges,
        "extracted text layer"
    );

    if keep_existing_bookmarks(&args, &document, &texts, &mut warnings) {
        counts.existing_bookmarks_kept = true;
    } else {
        let tree = detect_bookmark_tree(&args, &texts, page_count, &mut counts, &mut warnings)?;
        if tree.is_empty() {
            warn!("no table of contents entries detected; writing output without bookmarks");
            warnings.push("no table of contents entries detected".to_string());
        } else {
            counts.bookmarks_written = write_outline_tree(&mut document, &tree)?;
        }
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    document
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        bookmarks = counts.bookmarks_written,
        output = %args.output.display(),
        "wrote output pdf"
    );

    if counts.ocr_ran {
        let _ = fs::remove_file(&scratch);
    }

    if let Some(report_path) = &args.report_path {
        write_process_report(report_path, &args, &run_id, &started_at, &counts, &warnings)?;
    }

    Ok(())
}

/// Decide whether OCR is needed and return the PDF the rest of the pipeline
/// should work from.
fn prepare_working_pdf(
    args: &Cli,
    scratch: &Path,
    counts: &mut ProcessCounts,
    warnings: &mut Vec<String>,
) -> Result<PathBuf> {
    let has_text = pdf_has_text(&args.source, args.min_text_chars)?;
    let mut needs_ocr = !has_text;
    if args.force_ocr {
        needs_ocr = true;
    }
    if args.skip_ocr {
        needs_ocr = false;
    }
    debug!(has_text, needs_ocr, "ocr decision");

    if !needs_ocr {
        if has_text {
            info!("pdf already has a text layer, skipping OCR");
        }
        return Ok(args.source.clone());
    }

    if !command_available("ocrmypdf") {
        bail!(
            "OCR needed for {} but ocrmypdf was not found on PATH",
            args.source.display()
        );
    }

    info!(lang = %args.ocr_lang, "running OCR, this may take a while");
    match run_ocr(&args.source, scratch, &args.ocr_lang, args.optimize) {
        Ok(()) => {
            counts.ocr_ran = true;
            Ok(scratch.to_path_buf())
        }
        Err(error) => {
            if args.force_ocr {
                return Err(error)
                    .with_context(|| format!("forced OCR failed for {}", args.source.display()));
            }

            let message = format!("OCR failed for {}: {error:#}", args.source.display());
            warn!(error = %error, "OCR failed, continuing with the original pdf");
            warnings.push(message);
            Ok(args.source.clone())
        }
    }
}

/// Keep an existing outline when it checks out, or when the user asked us
/// not to touch it.
fn keep_existing_bookmarks(
    args: &Cli,
    document: &Document,
    texts: &PageTexts,
    warnings: &mut Vec<String>,
) -> bool {
    let existing = read_existing_bookmarks(document);
    if existing.is_empty() {
        return false;
    }

    let (valid, issues) = verify_bookmarks(&existing, &texts.pages);
    if valid {
        info!(
            bookmarks = existing.len(),
            "existing bookmarks look valid, keeping them"
        );
        return true;
    }

    for issue in &issues {
        warn!(issue = %issue, "existing bookmark issue");
    }

    if args.no_fix {
        warn!("existing bookmarks look wrong but --no-fix was given, keeping them as-is");
        warnings.push("kept existing bookmarks that failed verification (--no-fix)".to_string());
        return true;
    }

    warn!(issues = issues.len(), "existing bookmarks look wrong, replacing them");
    warnings.extend(issues);
    false
}

fn detect_bookmark_tree(
    args: &Cli,
    texts: &PageTexts,
    page_count: i64,
    counts: &mut ProcessCounts,
    warnings: &mut Vec<String>,
) -> Result<Vec<BookmarkNode>> {
    let toc_page_indices = find_toc_pages(&texts.pages, args.toc_scan_pages);
    counts.toc_page_count = toc_page_indices.len();

    let candidates = match args.mode {
        ExtractionMode::TocPage => {
            extract_toc_candidates(&texts.pages, &toc_page_indices, page_count)?
        }
        ExtractionMode::SectionHeaders => extract_section_headers(&texts.pages)?,
        ExtractionMode::Auto => {
            let from_toc = extract_toc_candidates(&texts.pages, &toc_page_indices, page_count)?;
            if from_toc.is_empty() {
                info!("no usable TOC page entries, scanning for section headers");
                extract_section_headers(&texts.pages)?
            } else {
                from_toc
            }
        }
    };
    counts.candidates_detected = candidates.len();
    info!(candidates = candidates.len(), "classified toc candidates");

    let resolver = PageResolver::new()?;
    let resolution = resolver.resolve(&candidates, &texts.pages, &toc_page_indices, page_count);
    counts.entries_resolved = resolution.entries.len();
    counts.entries_dropped = resolution.dropped;
    warnings.extend(resolution.warnings);

    let mut entries = resolution.entries;
    entries.sort_by(|a, b| (a.page, a.level).cmp(&(b.page, b.level)));
    let entries = normalize_levels(entries);

    let tree = build_bookmark_tree(&entries);
    debug!(
        roots = tree.len(),
        total = count_bookmarks(&tree),
        "built bookmark tree"
    );

    Ok(tree)
}
