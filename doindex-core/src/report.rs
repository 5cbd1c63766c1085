// Report files written alongside the search index

use crate::record::Record;
use doindex_scanner::PageType;
use std::collections::HashMap;
use std::io::{self, Write};

/// Number of files seen per page type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCounts {
    counts: HashMap<PageType, usize>,
}

impl TypeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, page_type: PageType) {
        *self.counts.entry(page_type).or_insert(0) += 1;
    }

    pub fn get(&self, page_type: PageType) -> usize {
        self.counts.get(&page_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Descending by count, ties broken by type name so output is reproducible
    pub fn sorted(&self) -> Vec<(PageType, usize)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(t, c)| (*t, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name().cmp(b.0.name())));
        entries
    }

    /// `"<type>: <count>"` lines joined by newlines
    pub fn render(&self) -> String {
        self.sorted()
            .iter()
            .map(|(page_type, count)| format!("{}: {}", page_type, count))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Accumulates the per-file reports while the scan runs.
///
/// Every classified file goes through [`FileReports::record`], which appends
/// to the matching URL list and bumps the type count in one step.
pub struct FileReports<W: Write> {
    unknown: W,
    redirects: W,
    counts: TypeCounts,
}

impl<W: Write> FileReports<W> {
    pub fn new(unknown: W, redirects: W) -> Self {
        Self {
            unknown,
            redirects,
            counts: TypeCounts::new(),
        }
    }

    pub fn record(&mut self, page_type: PageType, url: &str) -> io::Result<()> {
        match page_type {
            PageType::Unknown => writeln!(self.unknown, "{}", url)?,
            PageType::Redirect => writeln!(self.redirects, "{}", url)?,
            _ => {}
        }
        self.counts.increment(page_type);
        Ok(())
    }

    pub fn counts(&self) -> &TypeCounts {
        &self.counts
    }

    /// Flush both URL lists and hand back the writers and final counts
    pub fn finish(mut self) -> io::Result<(TypeCounts, W, W)> {
        self.unknown.flush()?;
        self.redirects.flush()?;
        Ok((self.counts, self.unknown, self.redirects))
    }
}

/// Pretty-printed JSON array with two-space indentation
pub fn render_index_json(records: &[Record]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
