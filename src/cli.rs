use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "pdftoc",
    version,
    about = "Add table of contents bookmarks to PDFs, running OCR first when needed"
)]
pub struct Cli {
    /// Source PDF file.
    #[arg(long = "from", short = 'f')]
    pub source: PathBuf,

    /// Output PDF file.
    #[arg(long = "to", short = 't')]
    pub output: PathBuf,

    /// Skip OCR even if the PDF appears to need it.
    #[arg(long, default_value_t = false)]
    pub skip_ocr: bool,

    /// Force OCR even if the PDF already has a text layer.
    #[arg(long, default_value_t = false)]
    pub force_ocr: bool,

    /// OCR language passed to ocrmypdf (e.g. "eng", "deu", "eng+deu").
    #[arg(long = "lang", short = 'l', default_value = "eng")]
    pub ocr_lang: String,

    /// ocrmypdf optimization level. Higher is smaller but slower.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub optimize: u8,

    #[arg(long, value_enum, default_value_t = ExtractionMode::Auto)]
    pub mode: ExtractionMode,

    /// Keep incorrect existing bookmarks instead of replacing them.
    #[arg(long, default_value_t = false)]
    pub no_fix: bool,

    /// How many leading pages to scan for table-of-contents pages.
    #[arg(long, default_value_t = 15)]
    pub toc_scan_pages: usize,

    /// Non-whitespace characters the first pages must carry to count as a text layer.
    #[arg(long, default_value_t = 100)]
    pub min_text_chars: usize,

    /// Write a JSON run report to this path.
    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExtractionMode {
    /// Try TOC pages first, then fall back to section headers.
    Auto,
    /// Only parse dedicated table-of-contents pages.
    TocPage,
    /// Only scan body text for section headers.
    SectionHeaders,
}

impl ExtractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::TocPage => "toc-page",
            Self::SectionHeaders => "section-headers",
        }
    }
}
