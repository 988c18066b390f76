use std::path::PathBuf;

use super::*;

fn pages_of(count: usize) -> Vec<String> {
    (0..count)
        .map(|index| format!("body text of page {}", index + 1))
        .collect()
}

#[test]
fn find_toc_pages_accepts_indicator_and_number_column_pages() {
    let pages = vec![
        "Title page".to_string(),
        "Table of Contents\nChapter 1 ..... 5".to_string(),
        "1\n2\n3\n4\n5\n6".to_string(),
        "ordinary body text without any page references".to_string(),
    ];

    assert_eq!(find_toc_pages(&pages, 15), vec![1, 2]);
}

#[test]
fn find_toc_pages_honors_scan_limit() {
    let mut pages = pages_of(20);
    pages.push("Contents\nChapter 1 ..... 5".to_string());

    assert!(find_toc_pages(&pages, 15).is_empty());
}

#[test]
fn dotted_leader_parsing_covers_heading_shapes() {
    let parser = TocLineParser::new().expect("parser compiles");
    let toc_text = "Contents\n\
                    Part I: Core Concepts .......... 3\n\
                    Chapter 2: A Whirlwind History .......... 9\n\
                    2.1 Early Machines .......... 11\n\
                    2.1.3 Relay Computers .......... 14\n\
                    7. Closing Thoughts .......... 120\n\
                    Bibliography .......... 130";

    let candidates = parser.parse_dotted_leaders(toc_text, 200);
    let titles = candidates
        .iter()
        .map(|candidate| candidate.title.as_str())
        .collect::<Vec<&str>>();

    assert_eq!(
        titles,
        vec![
            "Part I: Core Concepts",
            "Chapter 2: A Whirlwind History",
            "2.1 Early Machines",
            "2.1.3 Relay Computers",
            "7. Closing Thoughts",
            "Bibliography",
        ]
    );
    assert_eq!(candidates[0].level, 1);
    assert_eq!(candidates[1].level, 1);
    assert_eq!(candidates[2].level, 3);
    assert_eq!(candidates[3].level, 4);
    assert_eq!(candidates[4].level, 2);
    assert_eq!(candidates[0].page, PageRef::Printed(3));
    assert_eq!(candidates[5].page, PageRef::Printed(130));
}

#[test]
fn dotted_leader_parsing_handles_titleless_entries() {
    let parser = TocLineParser::new().expect("parser compiles");
    let candidates = parser.parse_dotted_leaders("Chapter 1 .......... 5", 100);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title, "Chapter 1");
    assert_eq!(candidates[0].page, PageRef::Printed(5));
}

#[test]
fn dotted_leader_parsing_deduplicates_repeated_lines() {
    let parser = TocLineParser::new().expect("parser compiles");
    let toc_text = "3. Methods .......... 21\n3. Methods .......... 21";

    let candidates = parser.parse_dotted_leaders(toc_text, 100);
    assert_eq!(candidates.len(), 1);
}

#[test]
fn dotted_leader_parsing_rejects_out_of_range_pages() {
    let parser = TocLineParser::new().expect("parser compiles");
    let candidates = parser.parse_dotted_leaders("4. Appendix Material .......... 900", 100);

    assert!(candidates.is_empty());
}

#[test]
fn keyword_heading_without_page_token_stays_unresolved() {
    let parser = TocLineParser::new().expect("parser compiles");
    let candidates = parser.parse_dotted_leaders("Contents\nPreface\n1. Basics .......... 4", 50);

    let preface = candidates
        .iter()
        .find(|candidate| candidate.title == "Preface")
        .expect("preface candidate");
    assert_eq!(preface.page, PageRef::Unresolved);
}

#[test]
fn line_by_line_parsing_reads_stacked_triplets() {
    let parser = TocLineParser::new().expect("parser compiles");
    let toc_text = "Contents\n1\nA whirlwind history\n1\nI\nCore Concepts\n7\nPreface\nix";

    let candidates = parser.parse_line_by_line(toc_text, 300);

    assert_eq!(
        candidates,
        vec![
            TocCandidate {
                level: 2,
                title: "1. A whirlwind history".to_string(),
                page: PageRef::Printed(1),
            },
            TocCandidate {
                level: 1,
                title: "Part I: Core Concepts".to_string(),
                page: PageRef::Printed(7),
            },
            TocCandidate {
                level: 2,
                title: "Preface".to_string(),
                page: PageRef::Printed(9),
            },
        ]
    );
}

#[test]
fn line_by_line_parsing_assigns_subsection_levels_from_dot_count() {
    let parser = TocLineParser::new().expect("parser compiles");
    let toc_text = "1.2\nGetting started\n12\n1.2.3\nFirst steps\n13";

    let candidates = parser.parse_line_by_line(toc_text, 100);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].level, 3);
    assert_eq!(candidates[1].level, 4);
}

#[test]
fn parse_page_number_handles_arabic_bounds_and_roman_numerals() {
    assert_eq!(parse_page_number("42", 100), Some(42));
    assert_eq!(parse_page_number("149", 100), Some(149));
    assert_eq!(parse_page_number("151", 100), None);
    assert_eq!(parse_page_number("0", 100), None);
    assert_eq!(parse_page_number("ix", 100), Some(9));
    assert_eq!(parse_page_number("XIV", 100), Some(14));
    assert_eq!(parse_page_number("chapter", 100), None);
}

#[test]
fn section_header_scoring_accepts_academic_headings() {
    let scorer = SectionHeaderScorer::new().expect("scorer compiles");

    let (score, candidate) = scorer.score_line("1. Introduction", 2);
    let candidate = candidate.expect("candidate");
    assert!(score >= SECTION_HEADER_ACCEPT_THRESHOLD);
    assert_eq!(candidate.title, "1. Introduction");
    assert_eq!(candidate.level, 2);
    assert_eq!(candidate.page, PageRef::Pdf(2));
}

#[test]
fn section_header_scoring_rejects_reference_list_entries() {
    let scorer = SectionHeaderScorer::new().expect("scorer compiles");

    let (score, _) = scorer.score_line("12. Smith, J. A survey of parsing. ACM 2019", 40);
    assert!(score < SECTION_HEADER_ACCEPT_THRESHOLD);
}

#[test]
fn section_header_scoring_rejects_body_text_continuations() {
    let scorer = SectionHeaderScorer::new().expect("scorer compiles");

    let (score, _) = scorer.score_line("2 the remainder of this work is organized as follows", 4);
    assert!(score < SECTION_HEADER_ACCEPT_THRESHOLD);
}

#[test]
fn section_header_scan_recombines_split_number_and_title() {
    let pages = vec![
        "paper title\nauthors".to_string(),
        "3\nEvaluation Setup\nWe measured throughput on four machines.".to_string(),
    ];

    let candidates = extract_section_headers(&pages).expect("scan succeeds");
    assert!(candidates
        .iter()
        .any(|candidate| candidate.title == "3. Evaluation Setup"
            && candidate.page == PageRef::Pdf(2)));
}

#[test]
fn section_header_scan_skips_printed_page_numbers_in_header_position() {
    let pages = vec![
        "first page".to_string(),
        "second page".to_string(),
        "3\nNot A Section Title Here\nplain body text".to_string(),
    ];

    let candidates = extract_section_headers(&pages).expect("scan succeeds");
    assert!(candidates.is_empty());
}

#[test]
fn resolver_applies_detected_printed_page_offset() {
    let mut pages = pages_of(30);
    pages[0] = "Contents\nAdvanced Topics Parsing .......... 25".to_string();
    // printed page 25 actually lives on PDF page 28
    pages[27] = "advanced topics in parsing, continued discussion".to_string();

    let candidates = vec![TocCandidate {
        level: 1,
        title: "Advanced Topics Parsing".to_string(),
        page: PageRef::Printed(25),
    }];

    let resolver = PageResolver::new().expect("resolver compiles");
    let resolution = resolver.resolve(&candidates, &pages, &[0], 30);

    assert_eq!(resolution.dropped, 0);
    assert_eq!(resolution.entries[0].page, 28);
}

#[test]
fn resolver_is_idempotent_for_already_resolved_candidates() {
    let pages = pages_of(20);
    let candidates = vec![
        TocCandidate {
            level: 1,
            title: "Chapter 1: Beginnings".to_string(),
            page: PageRef::Pdf(4),
        },
        TocCandidate {
            level: 2,
            title: "1.1 Early Days".to_string(),
            page: PageRef::Pdf(6),
        },
    ];

    let resolver = PageResolver::new().expect("resolver compiles");
    let first = resolver.resolve(&candidates, &pages, &[], 20);
    let reresolved = first
        .entries
        .iter()
        .map(|entry| TocCandidate {
            level: entry.level,
            title: entry.title.clone(),
            page: PageRef::Pdf(entry.page),
        })
        .collect::<Vec<TocCandidate>>();
    let second = resolver.resolve(&reresolved, &pages, &[], 20);

    assert_eq!(first.entries, second.entries);
}

#[test]
fn resolver_finds_unresolved_titles_in_body_text() {
    let mut pages = pages_of(12);
    pages[0] = "Contents\nPreface\n1. Basics .......... 3".to_string();
    pages[7] = "preface\n\nThis preface introduces the material.".to_string();

    let candidates = vec![TocCandidate {
        level: 2,
        title: "Preface Introduces Material".to_string(),
        page: PageRef::Unresolved,
    }];

    let resolver = PageResolver::new().expect("resolver compiles");
    let resolution = resolver.resolve(&candidates, &pages, &[0], 12);

    assert_eq!(resolution.dropped, 0);
    assert_eq!(resolution.entries[0].page, 8);
}

#[test]
fn resolver_drops_candidates_it_cannot_place() {
    let pages = pages_of(10);
    let candidates = vec![TocCandidate {
        level: 2,
        title: "Quantum Entanglement Basics".to_string(),
        page: PageRef::Unresolved,
    }];

    let resolver = PageResolver::new().expect("resolver compiles");
    let resolution = resolver.resolve(&candidates, &pages, &[], 10);

    assert!(resolution.entries.is_empty());
    assert_eq!(resolution.dropped, 1);
    assert_eq!(resolution.warnings.len(), 1);
}

#[test]
fn resolver_clamps_resolved_pages_to_document_bounds() {
    let pages = pages_of(10);
    let candidates = vec![TocCandidate {
        level: 1,
        title: "Appendix Overflow".to_string(),
        page: PageRef::Printed(40),
    }];

    let resolver = PageResolver::new().expect("resolver compiles");
    let resolution = resolver.resolve(&candidates, &pages, &[], 10);

    assert_eq!(resolution.entries[0].page, 10);
}

#[test]
fn normalize_levels_shifts_minimum_to_one_and_forbids_skips() {
    let entries = [3u32, 4, 4, 2]
        .iter()
        .enumerate()
        .map(|(index, &level)| TocEntry {
            level,
            title: format!("entry {index}"),
            page: (index + 1) as i64,
        })
        .collect::<Vec<TocEntry>>();

    let normalized = normalize_levels(entries);
    let levels = normalized
        .iter()
        .map(|entry| entry.level)
        .collect::<Vec<u32>>();

    assert_eq!(levels, vec![1, 2, 3, 1]);
}

#[test]
fn tree_builder_never_nests_under_equal_or_deeper_siblings() {
    let entries = vec![
        TocEntry {
            level: 1,
            title: "Part I".to_string(),
            page: 1,
        },
        TocEntry {
            level: 2,
            title: "Chapter 1".to_string(),
            page: 2,
        },
        TocEntry {
            level: 2,
            title: "Chapter 2".to_string(),
            page: 5,
        },
        TocEntry {
            level: 1,
            title: "Part II".to_string(),
            page: 9,
        },
        TocEntry {
            level: 2,
            title: "Chapter 3".to_string(),
            page: 10,
        },
    ];

    let tree = build_bookmark_tree(&entries);

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].children.len(), 2);
    assert!(tree[0].children.iter().all(|child| child.children.is_empty()));
    assert_eq!(tree[1].children.len(), 1);
    assert_eq!(count_bookmarks(&tree), 5);
}

#[test]
fn tree_builder_keeps_equal_levels_as_siblings() {
    let entries = vec![
        TocEntry {
            level: 2,
            title: "First".to_string(),
            page: 1,
        },
        TocEntry {
            level: 2,
            title: "Second".to_string(),
            page: 2,
        },
    ];

    let tree = build_bookmark_tree(&entries);
    assert_eq!(tree.len(), 2);
    assert!(tree.iter().all(|node| node.children.is_empty()));
}

#[test]
fn synthetic_toc_produces_single_root_with_one_child() {
    let mut pages = pages_of(10);
    pages[0] = "Contents\nChapter 1 .......... 5\nSection 1.1 .......... 6".to_string();

    let toc_page_indices = find_toc_pages(&pages, 15);
    assert_eq!(toc_page_indices, vec![0]);

    let candidates =
        extract_toc_candidates(&pages, &toc_page_indices, 10).expect("extraction succeeds");
    assert_eq!(candidates.len(), 2);

    let resolver = PageResolver::new().expect("resolver compiles");
    let mut entries = resolver
        .resolve(&candidates, &pages, &toc_page_indices, 10)
        .entries;
    entries.sort_by(|a, b| (a.page, a.level).cmp(&(b.page, b.level)));
    let entries = normalize_levels(entries);
    let tree = build_bookmark_tree(&entries);

    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].title, "Chapter 1");
    assert_eq!(tree[0].page, 5);
    assert_eq!(tree[0].children.len(), 1);
    assert_eq!(tree[0].children[0].title, "Section 1.1");
    assert_eq!(tree[0].children[0].page, 6);
}

#[test]
fn merge_hyphenated_lines_rejoins_wrapped_words() {
    let lines = vec![
        "the quick hyphen-".to_string(),
        "ated heading".to_string(),
        "Unrelated-".to_string(),
        "Capitalized next line".to_string(),
    ];

    let (merged, merges) = merge_hyphenated_lines(lines);

    assert_eq!(merges, 1);
    assert_eq!(merged[0], "the quick hyphenated heading");
    assert_eq!(merged[1], "Unrelated-");
}

#[test]
fn verify_bookmarks_flags_degenerate_outlines() {
    let entries = vec![
        TocEntry {
            level: 1,
            title: "Cover".to_string(),
            page: 1,
        },
        TocEntry {
            level: 1,
            title: "Start".to_string(),
            page: 1,
        },
    ];
    let pages = pages_of(40);

    let (valid, issues) = verify_bookmarks(&entries, &pages);
    assert!(!valid);
    assert!(!issues.is_empty());
}

#[test]
fn verify_bookmarks_accepts_entries_matching_page_content() {
    let mut pages = pages_of(30);
    pages[4] = "Chapter 1: Early machines and relay computers".to_string();
    pages[11] = "Chapter 2: Stored program designs".to_string();
    pages[19] = "Chapter 3: Transistor era machines".to_string();

    let entries = vec![
        TocEntry {
            level: 1,
            title: "Early Machines".to_string(),
            page: 5,
        },
        TocEntry {
            level: 1,
            title: "Stored Program Designs".to_string(),
            page: 12,
        },
        TocEntry {
            level: 1,
            title: "Transistor Era".to_string(),
            page: 20,
        },
    ];

    let (valid, issues) = verify_bookmarks(&entries, &pages);
    assert!(valid, "unexpected issues: {issues:?}");
}

#[test]
fn outline_round_trips_through_the_pdf_container() {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let page_ids = (0..3)
        .map(|_| {
            document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            })
        })
        .collect::<Vec<ObjectId>>();
    document.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|&id| id.into()).collect::<Vec<Object>>(),
            "Count" => page_ids.len() as i64,
        }
        .into(),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let tree = vec![BookmarkNode {
        title: "Chapter 1".to_string(),
        page: 1,
        children: vec![BookmarkNode {
            title: "1.1 Details".to_string(),
            page: 2,
            children: Vec::new(),
        }],
    }];

    let written = write_outline_tree(&mut document, &tree).expect("outline write succeeds");
    assert_eq!(written, 2);

    let read_back = read_existing_bookmarks(&document);
    assert_eq!(
        read_back,
        vec![
            TocEntry {
                level: 1,
                title: "Chapter 1".to_string(),
                page: 1,
            },
            TocEntry {
                level: 2,
                title: "1.1 Details".to_string(),
                page: 2,
            },
        ]
    );
}

#[test]
fn render_process_command_includes_non_default_flags() {
    let args = Cli {
        source: PathBuf::from("scan.pdf"),
        output: PathBuf::from("out/scan-toc.pdf"),
        skip_ocr: false,
        force_ocr: true,
        ocr_lang: "deu".to_string(),
        optimize: 2,
        mode: ExtractionMode::SectionHeaders,
        no_fix: true,
        toc_scan_pages: 15,
        min_text_chars: 100,
        report_path: None,
        verbose: false,
    };

    let command = render_process_command(&args);
    assert!(command.contains("--from scan.pdf"));
    assert!(command.contains("--force-ocr"));
    assert!(command.contains("--lang deu"));
    assert!(command.contains("--optimize 2"));
    assert!(command.contains("--mode section-headers"));
    assert!(command.contains("--no-fix"));
}
