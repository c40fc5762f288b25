//! Wire-format records and streaming decoding of E-utilities XML.
//!
//! Raw records are transient: they capture exactly what the efetch payload
//! carried, in document order, and are discarded once normalized. Element
//! text is gathered across nested inline markup (`<i>`, `<sup>`, ...), so
//! titles and abstract sections survive formatting tags intact.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{HarvestError, Result};

/// Server-side cursor returned by a history-enabled search.
///
/// Valid only for the exact term that produced it, and only for a bounded
/// time; never reused across a different query or window.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    /// Total matches for the term
    pub count: usize,
    /// History-server environment token
    pub web_env: String,
    /// Query key within that environment
    pub query_key: String,
}

/// One record as it appeared on the wire
#[derive(Debug)]
pub enum RawRecord {
    Article(RawArticle),
    BookArticle(RawBookArticle),
}

/// Raw `PubmedArticle` element
#[derive(Debug, Default)]
pub struct RawArticle {
    pub pmid: Option<String>,
    pub title: Option<String>,
    pub abstract_sections: Vec<RawAbstractSection>,
    pub authors: Vec<RawAuthor>,
    pub pub_date: Option<RawPubDate>,
    pub keywords: Vec<String>,
    pub journal_title: Option<String>,
    pub copyright: Option<String>,
}

/// Raw `PubmedBookArticle` element
#[derive(Debug, Default)]
pub struct RawBookArticle {
    pub pmid: Option<String>,
    pub book_title: Option<String>,
    pub authors: Vec<RawAuthor>,
    pub pub_date: Option<RawPubDate>,
    pub keywords: Vec<String>,
    pub publisher: Option<String>,
    pub copyright: Option<String>,
}

/// One `AbstractText` element with its optional `Label` attribute
#[derive(Debug, Default)]
pub struct RawAbstractSection {
    pub label: Option<String>,
    pub text: String,
}

/// One `Author` element
#[derive(Debug, Default)]
pub struct RawAuthor {
    pub fore_name: Option<String>,
    pub last_name: Option<String>,
    pub collective_name: Option<String>,
}

/// Year/Month/Day triple exactly as the wire carried it
#[derive(Debug, Default, Clone)]
pub struct RawPubDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

/// Parse an esearch response into a [`SearchHandle`].
///
/// The first `Count` in document order is the total; later `Count` elements
/// inside `TranslationStack` are ignored. A response without a count is
/// malformed.
pub fn parse_search_response(xml: &str) -> Result<SearchHandle> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut count: Option<usize> = None;
    let mut web_env: Option<String> = None;
    let mut query_key: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Count" if count.is_none() => {
                    let text = read_text_content(&mut reader, b"Count")?;
                    count = Some(text.parse().map_err(|_| {
                        HarvestError::Parse(format!("unparsable Count: {:?}", text))
                    })?);
                }
                b"WebEnv" if web_env.is_none() => {
                    web_env = Some(read_text_content(&mut reader, b"WebEnv")?);
                }
                b"QueryKey" if query_key.is_none() => {
                    query_key = Some(read_text_content(&mut reader, b"QueryKey")?);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let count = count.ok_or_else(|| HarvestError::Parse("esearch response has no Count".into()))?;
    Ok(SearchHandle {
        count,
        web_env: web_env.unwrap_or_default(),
        query_key: query_key.unwrap_or_default(),
    })
}

/// Parse an efetch response into raw records, preserving document order
/// across both variants. An empty article set yields an empty vec.
pub fn parse_fetch_response(xml: &str) -> Result<Vec<RawRecord>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut records = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"PubmedArticle" => {
                    records.push(RawRecord::Article(parse_article(&mut reader)?));
                }
                b"PubmedBookArticle" => {
                    records.push(RawRecord::BookArticle(parse_book_article(&mut reader)?));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

fn parse_article(reader: &mut Reader<&[u8]>) -> Result<RawArticle> {
    let mut article = RawArticle::default();
    let mut seen_abstract = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                // First PMID in document order is the citation's own id;
                // later ones belong to comment/correction links.
                b"PMID" if article.pmid.is_none() => {
                    article.pmid = Some(read_text_content(reader, b"PMID")?);
                }
                b"ArticleTitle" if article.title.is_none() => {
                    article.title = Some(read_text_content(reader, b"ArticleTitle")?);
                }
                b"Abstract" if !seen_abstract => {
                    seen_abstract = true;
                    parse_abstract(reader, &mut article)?;
                }
                b"AuthorList" => parse_author_list(reader, &mut article.authors)?,
                b"Journal" => parse_journal(reader, &mut article)?,
                b"PubDate" if article.pub_date.is_none() => {
                    article.pub_date = Some(parse_pub_date(reader)?);
                }
                b"KeywordList" => parse_keyword_list(reader, &mut article.keywords)?,
                b"CopyrightInformation" if article.copyright.is_none() => {
                    article.copyright = Some(read_text_content(reader, b"CopyrightInformation")?);
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubmedArticle" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(article)
}

fn parse_book_article(reader: &mut Reader<&[u8]>) -> Result<RawBookArticle> {
    let mut book = RawBookArticle::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"PMID" if book.pmid.is_none() => {
                    book.pmid = Some(read_text_content(reader, b"PMID")?);
                }
                b"BookTitle" if book.book_title.is_none() => {
                    book.book_title = Some(read_text_content(reader, b"BookTitle")?);
                }
                b"AuthorList" => parse_author_list(reader, &mut book.authors)?,
                b"PubDate" if book.pub_date.is_none() => {
                    book.pub_date = Some(parse_pub_date(reader)?);
                }
                b"KeywordList" => parse_keyword_list(reader, &mut book.keywords)?,
                b"Publisher" => parse_publisher(reader, &mut book)?,
                b"CopyrightInformation" if book.copyright.is_none() => {
                    book.copyright = Some(read_text_content(reader, b"CopyrightInformation")?);
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubmedBookArticle" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(book)
}

fn parse_abstract(reader: &mut Reader<&[u8]>, article: &mut RawArticle) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"AbstractText" => {
                    let label = attribute_value(&e, b"Label");
                    let text = read_text_content(reader, b"AbstractText")?;
                    article.abstract_sections.push(RawAbstractSection { label, text });
                }
                b"CopyrightInformation" if article.copyright.is_none() => {
                    article.copyright = Some(read_text_content(reader, b"CopyrightInformation")?);
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Abstract" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_author_list(reader: &mut Reader<&[u8]>, authors: &mut Vec<RawAuthor>) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Author" => {
                authors.push(parse_author(reader)?);
            }
            Event::End(e) if e.name().as_ref() == b"AuthorList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<RawAuthor> {
    let mut author = RawAuthor::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"LastName" => author.last_name = Some(read_text_content(reader, b"LastName")?),
                b"ForeName" => author.fore_name = Some(read_text_content(reader, b"ForeName")?),
                b"CollectiveName" => {
                    author.collective_name = Some(read_text_content(reader, b"CollectiveName")?);
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(author)
}

fn parse_journal(reader: &mut Reader<&[u8]>, article: &mut RawArticle) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Title" if article.journal_title.is_none() => {
                    article.journal_title = Some(read_text_content(reader, b"Title")?);
                }
                b"PubDate" if article.pub_date.is_none() => {
                    article.pub_date = Some(parse_pub_date(reader)?);
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Journal" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_publisher(reader: &mut Reader<&[u8]>, book: &mut RawBookArticle) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"PublisherName" => {
                if book.publisher.is_none() {
                    book.publisher = Some(read_text_content(reader, b"PublisherName")?);
                }
            }
            Event::End(e) if e.name().as_ref() == b"Publisher" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_pub_date(reader: &mut Reader<&[u8]>) -> Result<RawPubDate> {
    let mut date = RawPubDate::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Year" => date.year = Some(read_text_content(reader, b"Year")?),
                b"Month" => date.month = Some(read_text_content(reader, b"Month")?),
                b"Day" => date.day = Some(read_text_content(reader, b"Day")?),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubDate" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(date)
}

fn parse_keyword_list(reader: &mut Reader<&[u8]>, keywords: &mut Vec<String>) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Keyword" => {
                keywords.push(read_text_content(reader, b"Keyword")?);
            }
            Event::End(e) if e.name().as_ref() == b"KeywordList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn attribute_value(start: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

/// Read the text content of the element just opened, gathering text across
/// nested markup, until its matching end tag. The result is trimmed.
fn read_text_content(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape().unwrap_or_default()),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}
