use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub pdftotext: String,
    pub ocrmypdf: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceDigests {
    pub source_sha256: String,
    pub output_sha256: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessCounts {
    pub page_count: usize,
    pub toc_page_count: usize,
    pub dehyphenation_merges: usize,
    pub candidates_detected: usize,
    pub entries_resolved: usize,
    pub entries_dropped: usize,
    pub bookmarks_written: usize,
    pub ocr_ran: bool,
    pub existing_bookmarks_kept: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: String,
    pub command: String,
    pub mode: String,
    pub tool_versions: ToolVersions,
    pub digests: SourceDigests,
    pub counts: ProcessCounts,
    pub warnings: Vec<String>,
}
