//! Mapping of raw wire records into the canonical schema.
//!
//! Missing fields are never errors here; each resolves to its documented
//! default (`"Unknown"`, `"No Title Available"`, or an empty value).

use std::collections::BTreeMap;
use tracing::debug;

use crate::client::wire::{RawAbstractSection, RawArticle, RawAuthor, RawBookArticle, RawPubDate, RawRecord};
use crate::models::ArticleRecord;

const NO_TITLE: &str = "No Title Available";
const UNKNOWN: &str = "Unknown";

/// Normalize one raw record of either variant
pub fn normalize_record(raw: RawRecord) -> ArticleRecord {
    match raw {
        RawRecord::Article(article) => normalize_article(article),
        RawRecord::BookArticle(book) => normalize_book(book),
    }
}

fn normalize_article(raw: RawArticle) -> ArticleRecord {
    let (abstract_text, sections) = assemble_abstract(&raw.abstract_sections);

    ArticleRecord {
        pmid: raw.pmid.unwrap_or_default(),
        title: Some(raw.title.unwrap_or_else(|| NO_TITLE.to_string())),
        book_title: None,
        abstract_text: Some(abstract_text),
        authors: raw.authors.iter().map(display_name).collect(),
        publication_date: article_date(raw.pub_date.as_ref()),
        keywords: raw.keywords.into_iter().filter(|k| !k.is_empty()).collect(),
        journal: Some(non_empty_or(raw.journal_title, UNKNOWN)),
        publisher: None,
        copyright: non_empty_or(raw.copyright, UNKNOWN),
        sections,
    }
}

fn normalize_book(raw: RawBookArticle) -> ArticleRecord {
    ArticleRecord {
        pmid: raw.pmid.unwrap_or_default(),
        title: None,
        book_title: raw.book_title,
        abstract_text: None,
        authors: raw.authors.iter().map(display_name).collect(),
        publication_date: book_date(raw.pub_date.as_ref()),
        keywords: raw.keywords.into_iter().filter(|k| !k.is_empty()).collect(),
        journal: None,
        publisher: Some(non_empty_or(raw.publisher, UNKNOWN)),
        copyright: non_empty_or(raw.copyright, UNKNOWN),
        sections: BTreeMap::new(),
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Collective names stand in for individual names; otherwise fore and
/// family names are joined with a space, empty components omitted.
fn display_name(author: &RawAuthor) -> String {
    if let Some(collective) = author.collective_name.as_deref().filter(|c| !c.is_empty()) {
        return collective.to_string();
    }
    let fore = author.fore_name.as_deref().unwrap_or("");
    let last = author.last_name.as_deref().unwrap_or("");
    format!("{} {}", fore, last).trim().to_string()
}

/// Assemble the abstract text and the labeled-section map in one pass.
///
/// A section whose text exactly duplicates an earlier section is skipped
/// in the assembled text; the labeled map keeps every labeled, non-empty
/// section regardless.
fn assemble_abstract(sections: &[RawAbstractSection]) -> (String, BTreeMap<String, String>) {
    let mut text = String::new();
    let mut seen: Vec<&str> = Vec::new();
    let mut labeled = BTreeMap::new();

    for section in sections {
        if let Some(label) = section.label.as_deref().filter(|l| !l.is_empty()) {
            if !section.text.is_empty() {
                labeled.insert(label.to_string(), section.text.clone());
            }
        }

        if seen.contains(&section.text.as_str()) {
            debug!("duplicate abstract section skipped");
            continue;
        }
        seen.push(&section.text);

        if let Some(label) = section.label.as_deref().filter(|l| !l.is_empty()) {
            text.push_str(label);
            text.push_str(": ");
        }
        text.push_str(&section.text);
        text.push('\n');
    }

    (text.trim_end().to_string(), labeled)
}

/// Best-effort `YYYY-MM-DD` for articles: month names are converted to
/// zero-padded numbers, with the raw string passed through when conversion
/// fails, degrading to `YYYY-MM`, `YYYY`, then `"Unknown"`.
fn article_date(date: Option<&RawPubDate>) -> String {
    let Some(date) = date else {
        return UNKNOWN.to_string();
    };
    match (&date.year, &date.month, &date.day) {
        (Some(year), Some(month), Some(day)) => match month_number(month) {
            Some(mm) => format!("{}-{}-{:0>2}", year, mm, day),
            None => format!("{}-{}-{}", year, month, day),
        },
        (Some(year), Some(month), None) => match month_number(month) {
            Some(mm) => format!("{}-{}", year, mm),
            None => format!("{}-{}", year, month),
        },
        (Some(year), None, _) => year.clone(),
        _ => UNKNOWN.to_string(),
    }
}

/// Book dates are zero-padded without month-name conversion, with the same
/// progressive fallback.
fn book_date(date: Option<&RawPubDate>) -> String {
    let Some(date) = date else {
        return UNKNOWN.to_string();
    };
    match (&date.year, &date.month, &date.day) {
        (Some(year), Some(month), Some(day)) => {
            format!("{}-{:0>2}-{:0>2}", year, month, day)
        }
        (Some(year), Some(month), None) => format!("{}-{}", year, month),
        (Some(year), None, _) => year.clone(),
        _ => UNKNOWN.to_string(),
    }
}

/// Convert a month given as a number or a name (three-letter prefix
/// decides) to a zero-padded two-digit string. `None` when unrecognizable.
fn month_number(month: &str) -> Option<String> {
    if let Ok(n) = month.parse::<u32>() {
        return (1..=12).contains(&n).then(|| format!("{:02}", n));
    }
    let abbr = month.get(..3)?.to_ascii_lowercase();
    let n = match abbr.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(format!("{:02}", n))
}
