//! Canonical record model produced from either wire-format variant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized bibliographic record.
///
/// Journal articles carry `Title`/`Journal`; book articles carry
/// `BookTitle`/`Publisher`. Labeled abstract sections (Methods, Results, ...)
/// are folded into `Abstract` and additionally exposed as top-level fields
/// via the flattened `sections` map, so the serialized form matches the
/// heterogeneous per-record schema consumers expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// PubMed identifier; empty when the wire record carried none
    #[serde(rename = "PMID")]
    pub pmid: String,

    /// Article title (`"No Title Available"` when absent)
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Book title, for book-article records
    #[serde(rename = "BookTitle", skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,

    /// Assembled abstract text; empty string when the record has none
    #[serde(rename = "Abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,

    /// Ordered author display names
    #[serde(rename = "Authors", default)]
    pub authors: Vec<String>,

    /// `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, or `"Unknown"`
    #[serde(rename = "PublicationDate")]
    pub publication_date: String,

    /// Ordered keyword texts
    #[serde(rename = "Keywords", default)]
    pub keywords: Vec<String>,

    /// Journal title (`"Unknown"` when absent)
    #[serde(rename = "Journal", skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,

    /// Publisher name, for book-article records (`"Unknown"` when absent)
    #[serde(rename = "Publisher", skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Copyright statement (`"Unknown"` when absent)
    #[serde(rename = "Copyright")]
    pub copyright: String,

    /// Extra labeled abstract sections, keyed by label
    #[serde(flatten)]
    pub sections: BTreeMap<String, String>,
}

impl ArticleRecord {
    /// Render the record as plain `field: value` lines, one field per line.
    ///
    /// List fields are joined with `"; "`. Field order matches the
    /// serialized schema, with labeled sections between the venue field and
    /// `Copyright`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, "PMID", &self.pmid);
        if let Some(title) = &self.title {
            push_line(&mut out, "Title", title);
        }
        if let Some(book_title) = &self.book_title {
            push_line(&mut out, "BookTitle", book_title);
        }
        if let Some(abstract_text) = &self.abstract_text {
            push_line(&mut out, "Abstract", abstract_text);
        }
        push_line(&mut out, "Authors", &self.authors.join("; "));
        push_line(&mut out, "PublicationDate", &self.publication_date);
        push_line(&mut out, "Keywords", &self.keywords.join("; "));
        if let Some(journal) = &self.journal {
            push_line(&mut out, "Journal", journal);
        }
        if let Some(publisher) = &self.publisher {
            push_line(&mut out, "Publisher", publisher);
        }
        for (label, text) in &self.sections {
            push_line(&mut out, label, text);
        }
        push_line(&mut out, "Copyright", &self.copyright);
        out
    }
}

fn push_line(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}
