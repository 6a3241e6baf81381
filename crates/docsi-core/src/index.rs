//! Persistent full-text search over stored fragments.
//!
//! Each source keeps its own tantivy index. Queries are plain text: they
//! are split by the same analyzer as the indexed fields and any term may
//! match. Titles weigh double.

use crate::{Category, Error, Fragment, Result, SearchHit};
use std::cmp::Reverse;
use std::path::Path;
use std::time::Instant;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, TermQuery};
use tantivy::schema::{FAST, Field, IndexRecordOption, STORED, STRING, Schema, TEXT, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{DocId, Index, IndexReader, Score, SegmentReader, TantivyDocument, Term, doc};
use tracing::{debug, info};

const WRITER_HEAP_BYTES: usize = 50_000_000;
const DEFAULT_SNIPPET_CHARS: usize = 160;
const TITLE_BOOST: f32 = 2.0;

/// Restrictions and limits for [`SearchIndex::search`].
#[derive(Debug, Clone)]
pub struct SearchOptions<'a> {
    /// Only hits from this source.
    pub alias: Option<&'a str>,
    /// Only hits of this role.
    pub category: Option<Category>,
    /// Maximum number of hits.
    pub limit: usize,
    /// Approximate snippet length in characters.
    pub snippet_chars: usize,
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        Self {
            alias: None,
            category: None,
            limit: 10,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

/// Persistent full-text index over fragments.
pub struct SearchIndex {
    index: Index,
    text_field: Field,
    title_field: Field,
    page_field: Field,
    location_field: Field,
    category_field: Field,
    alias_field: Field,
    ordinal_field: Field,
    reader: IndexReader,
}

impl SearchIndex {
    fn schema() -> Schema {
        let mut builder = Schema::builder();
        builder.add_text_field("text", TEXT | STORED);
        builder.add_text_field("title", TEXT | STORED);
        builder.add_text_field("page", TEXT | STORED);
        builder.add_text_field("location", STRING | STORED);
        builder.add_text_field("category", STRING | STORED);
        builder.add_text_field("alias", STRING | STORED);
        builder.add_u64_field("ordinal", STORED | FAST);
        builder.build()
    }

    /// Create a new, empty index at `index_path`.
    pub fn create(index_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| Error::Index(format!("Failed to create index directory: {e}")))?;

        let index = Index::create_in_dir(index_path, Self::schema())
            .map_err(|e| Error::Index(format!("Failed to create index: {e}")))?;
        Self::from_index(index)
    }

    /// Open an existing index.
    pub fn open(index_path: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_path)
            .map_err(|e| Error::Index(format!("Failed to open index: {e}")))?;
        Self::from_index(index)
    }

    /// Open the index at `index_path`, creating it when absent.
    pub fn open_or_create(index_path: &Path) -> Result<Self> {
        if index_path.join("meta.json").exists() {
            Self::open(index_path)
        } else {
            Self::create(index_path)
        }
    }

    fn from_index(index: Index) -> Result<Self> {
        let schema = index.schema();
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| Error::Index(format!("Missing {name} field")))
        };

        let text_field = field("text")?;
        let title_field = field("title")?;
        let page_field = field("page")?;
        let location_field = field("location")?;
        let category_field = field("category")?;
        let alias_field = field("alias")?;
        let ordinal_field = field("ordinal")?;

        let reader = index
            .reader_builder()
            .reload_policy(tantivy::ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| Error::Index(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            index,
            text_field,
            title_field,
            page_field,
            location_field,
            category_field,
            alias_field,
            ordinal_field,
            reader,
        })
    }

    /// Replace every document of `alias` with `fragments`.
    pub fn index_fragments(&mut self, alias: &str, fragments: &[Fragment]) -> Result<()> {
        let started = Instant::now();
        let mut writer = self
            .index
            .writer::<TantivyDocument>(WRITER_HEAP_BYTES)
            .map_err(|e| Error::Index(format!("Failed to create writer: {e}")))?;

        writer.delete_term(Term::from_field_text(self.alias_field, alias));

        let mut bytes = 0usize;
        for (ordinal, fragment) in fragments.iter().enumerate() {
            bytes += fragment.text.len();
            writer
                .add_document(doc!(
                    self.text_field => fragment.text.as_str(),
                    self.title_field => fragment.title.as_str(),
                    self.page_field => fragment.page.as_str(),
                    self.location_field => fragment.location.as_str(),
                    self.category_field => fragment.category.as_str(),
                    self.alias_field => alias,
                    self.ordinal_field => ordinal as u64,
                ))
                .map_err(|e| Error::Index(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| Error::Index(format!("Failed to commit: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| Error::Index(format!("Failed to reload reader: {e}")))?;

        info!(
            "Indexed {} fragments ({} bytes) for {} in {}ms",
            fragments.len(),
            bytes,
            alias,
            started.elapsed().as_millis()
        );
        Ok(())
    }

    /// Drop every document of `alias`.
    pub fn remove_alias(&mut self, alias: &str) -> Result<()> {
        let mut writer = self
            .index
            .writer::<TantivyDocument>(WRITER_HEAP_BYTES)
            .map_err(|e| Error::Index(format!("Failed to create writer: {e}")))?;
        writer.delete_term(Term::from_field_text(self.alias_field, alias));
        writer
            .commit()
            .map_err(|e| Error::Index(format!("Failed to commit: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| Error::Index(format!("Failed to reload reader: {e}")))?;
        Ok(())
    }

    /// Number of indexed documents across all aliases.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Ranked hits for `query_str`, best first. Equal scores keep
    /// document order.
    pub fn search(&self, query_str: &str, options: &SearchOptions<'_>) -> Result<Vec<SearchHit>> {
        let started = Instant::now();
        if query_str.trim().is_empty() || options.limit == 0 {
            return Ok(Vec::new());
        }

        let terms = self.analyze(query_str)?;
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let text_query = self.terms_query(&terms);

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, text_query)];
        if let Some(alias) = options.alias {
            clauses.push((Occur::Must, self.term_query(self.alias_field, alias)));
        }
        if let Some(category) = options.category {
            clauses.push((
                Occur::Must,
                self.term_query(self.category_field, category.as_str()),
            ));
        }
        let query = BooleanQuery::new(clauses);

        // Equal scores fall back to document order inside the collector, so
        // the cut at `limit` keeps the earliest fragments.
        let collector = TopDocs::with_limit(options.limit).tweak_score(|segment: &SegmentReader| {
            let ordinals = segment.fast_fields().u64("ordinal").ok();
            move |doc: DocId, score: Score| {
                let ordinal = ordinals
                    .as_ref()
                    .and_then(|column| column.first(doc))
                    .unwrap_or(u64::MAX);
                (score, Reverse(ordinal))
            }
        });
        let top_docs = searcher
            .search(&query, &collector)
            .map_err(|e| Error::Index(format!("Search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for ((score, _), address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::Index(format!("Failed to retrieve doc: {e}")))?;

            let text = self.field_text(&doc, self.text_field)?;
            let category = self
                .field_text(&doc, self.category_field)?
                .parse::<Category>()
                .map_err(Error::Index)?;

            hits.push(SearchHit {
                alias: self.field_text(&doc, self.alias_field)?,
                location: self.field_text(&doc, self.location_field)?,
                page: self.field_text(&doc, self.page_field)?,
                title: self.field_text(&doc, self.title_field)?,
                category,
                snippet: extract_snippet(&text, query_str, options.snippet_chars),
                score,
            });
        }

        debug!(
            "Found {} hits for query '{}' in {}ms",
            hits.len(),
            query_str,
            started.elapsed().as_millis()
        );
        Ok(hits)
    }

    /// Run `query` through the analyzer of the text fields so terms line up
    /// with what was indexed. Query syntax characters are never interpreted.
    fn analyze(&self, query: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(self.text_field)?;
        let mut stream = analyzer.token_stream(query);
        let mut terms: Vec<String> = Vec::new();
        stream.process(&mut |token| {
            if !terms.contains(&token.text) {
                terms.push(token.text.clone());
            }
        });
        Ok(terms)
    }

    /// Any term may match in any text field; title matches weigh double.
    fn terms_query(&self, terms: &[String]) -> Box<dyn Query> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(terms.len() * 3);
        for term in terms {
            for (field, boost) in [
                (self.title_field, TITLE_BOOST),
                (self.page_field, 1.0),
                (self.text_field, 1.0),
            ] {
                let query = TermQuery::new(
                    Term::from_field_text(field, term),
                    IndexRecordOption::WithFreqs,
                );
                clauses.push((Occur::Should, Box::new(BoostQuery::new(Box::new(query), boost))));
            }
        }
        Box::new(BooleanQuery::new(clauses))
    }

    fn term_query(&self, field: Field, value: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new(
            Term::from_field_text(field, value),
            IndexRecordOption::Basic,
        ))
    }

    fn field_text(&self, doc: &TantivyDocument, field: Field) -> Result<String> {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| Error::Index("Field not found in document".into()))
    }
}

/// Cut a window of roughly `max_chars` around the first query term found in
/// `content`. Always returns a string that starts and ends on char
/// boundaries.
pub fn extract_snippet(content: &str, query: &str, max_chars: usize) -> String {
    let content = content.trim();
    let total_chars = content.chars().count();
    if total_chars <= max_chars {
        return content.to_string();
    }

    let anchor_char = query
        .split_whitespace()
        .filter_map(|term| find_char_position(content, term))
        .min();

    let start_char = anchor_char.map_or(0, |pos| pos.saturating_sub(max_chars / 3));
    let start_char = start_char.min(total_chars.saturating_sub(max_chars));
    let end_char = (start_char + max_chars).min(total_chars);

    let window: String = content
        .chars()
        .skip(start_char)
        .take(end_char - start_char)
        .collect();

    let mut snippet = String::with_capacity(window.len() + 6);
    if start_char > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(&window);
    if end_char < total_chars {
        snippet.push_str("...");
    }
    snippet
}

/// Char index in `content` where `term` first occurs, compared case
/// insensitively. Lowercasing may expand a char, so positions are tracked
/// per lowered char rather than by byte offset.
fn find_char_position(content: &str, term: &str) -> Option<usize> {
    let needle: Vec<char> = term.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }
    let lowered: Vec<(usize, char)> = content
        .chars()
        .enumerate()
        .flat_map(|(pos, c)| c.to_lowercase().map(move |lc| (pos, lc)))
        .collect();
    lowered
        .windows(needle.len())
        .find(|window| window.iter().map(|(_, c)| *c).eq(needle.iter().copied()))
        .map(|window| window[0].0)
}
