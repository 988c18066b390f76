/// Page target of a classified TOC candidate.
///
/// `Printed` carries the page number as printed in the TOC text, which still
/// needs the printed-to-PDF offset applied. `Pdf` is a concrete 1-based PDF
/// page index. `Unresolved` means the line carried no page token at all and
/// the resolver has to find the title in the body text or drop the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    Printed(i64),
    Pdf(i64),
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocCandidate {
    pub level: u32,
    pub title: String,
    pub page: PageRef,
}

/// A candidate whose target page has been resolved to a PDF page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u32,
    pub title: String,
    pub page: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkNode {
    pub title: String,
    pub page: i64,
    pub children: Vec<BookmarkNode>,
}

#[derive(Debug, Default)]
pub struct PageTexts {
    pub pages: Vec<String>,
    pub dehyphenation_merges: usize,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub entries: Vec<TocEntry>,
    pub dropped: usize,
    pub warnings: Vec<String>,
}
