use crate::error::Result;
use crate::stats::StatsMap;
use doindex_scanner::{Page, extract_fields};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One entry of the hosted search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub headings: Vec<String>,
    pub content: String,
    pub views: u64,
}

impl Record {
    pub fn from_page(page: &Page, stats: &StatsMap) -> Result<Self> {
        let fields = extract_fields(page.content.as_deref().unwrap_or_default(), &page.url)?;

        Ok(Self {
            object_id: page.url.clone(),
            url: page.url.clone(),
            title: fields.title,
            description: fields.description,
            section: section_of(&page.url),
            headings: fields.headings,
            content: fields.content,
            views: stats.views_for(&page.url),
        })
    }

    /// Byte length of the compact JSON form sent over the wire
    pub fn serialized_len(&self) -> Result<usize> {
        Ok(serde_json::to_vec(self)?.len())
    }
}

/// First path segment of a URL, when the page sits inside a directory
fn section_of(url: &str) -> Option<String> {
    let mut segments = url.trim_start_matches('/').split('/');
    let first = segments.next()?;
    segments.next()?;
    (!first.is_empty()).then(|| first.to_string())
}

/// One record per indexable page; redirects, assets and unknown files are skipped
pub fn build_records(pages: &[Page], stats: &StatsMap) -> Result<Vec<Record>> {
    let records = pages
        .iter()
        .filter(|page| page.page_type.is_indexable())
        .map(|page| Record::from_page(page, stats))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Built {} records from {} pages",
        records.len(),
        pages.len()
    );
    Ok(records)
}

/// Stable ascending sort by serialized size; equal sizes keep input order
pub fn sort_by_serialized_size(records: Vec<Record>) -> Result<Vec<Record>> {
    let mut sized = records
        .into_iter()
        .map(|record| Ok((record.serialized_len()?, record)))
        .collect::<Result<Vec<_>>>()?;
    sized.sort_by_key(|(len, _)| *len);
    Ok(sized.into_iter().map(|(_, record)| record).collect())
}
