use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use lopdf::{Document, Object, ObjectId, StringFormat, dictionary};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::{Cli, ExtractionMode};
use crate::model::{ProcessCounts, ProcessReport, SourceDigests, ToolVersions};
use crate::util::{ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

mod bookmarks;
mod ocr;
mod page_text;
mod report;
mod resolve;
mod run;
mod section_headers;
#[cfg(test)]
mod tests;
mod toc_pages;
mod tree;
mod types;

pub use run::run;

use bookmarks::*;
use ocr::*;
use page_text::*;
use report::*;
use resolve::*;
use section_headers::*;
use toc_pages::*;
use tree::*;
use types::*;
