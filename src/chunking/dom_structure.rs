//! DomStructure: walks the main content subtree in document order, tracking
//! a live heading path and emitting one chunk per section, code block,
//! table, or list.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::capabilities::EmbeddingBackend;
use crate::error::WebFluxResult;
use crate::model::ExtractedContent;

use super::registry::ChunkingStrategy;
use super::types::{renumber, split_at_sentence_boundary, Chunk, ChunkType, ChunkingParams};

const MAIN_CANDIDATES: &[&str] = &["article", "main", "[role=main]", "#content", ".content"];
const EXCLUDED_TAGS: &[&str] = &["nav", "header", "footer", "aside", "script", "style"];
const EXCLUDED_CLASSES: &[&str] = &["ads", "sidebar"];

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn has_class(elem: &scraper::node::Element, class: &str) -> bool {
    elem.attr("class").map(|c| c.split_whitespace().any(|x| x == class)).unwrap_or(false)
}

fn is_excluded(elem: &scraper::node::Element) -> bool {
    EXCLUDED_TAGS.contains(&elem.name()) || EXCLUDED_CLASSES.iter().any(|c| has_class(elem, c))
}

fn find_main(document: &Html) -> ElementRef<'_> {
    for candidate in MAIN_CANDIDATES {
        if let Ok(selector) = Selector::parse(candidate) {
            if let Some(elem) = document.select(&selector).next() {
                return elem;
            }
        }
    }
    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            return body;
        }
    }
    document.root_element()
}

fn collect_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    collect_text_into(node, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text_into(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            out.push_str(&text.text);
            out.push(' ');
        }
        Node::Element(_) => {
            for child in node.children() {
                collect_text_into(child, out);
            }
        }
        _ => {}
    }
}

fn render_table(node: NodeRef<'_, Node>) -> String {
    let Some(elem) = ElementRef::wrap(node) else {
        return String::new();
    };
    let row_selector = Selector::parse("tr").expect("static selector parses");
    let cell_selector = Selector::parse("td, th").expect("static selector parses");
    let mut lines = Vec::new();
    for row in elem.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(|c| c.text().collect::<String>().trim().to_string()).collect();
        if !cells.is_empty() {
            lines.push(cells.join(" | "));
        }
    }
    lines.join("\n")
}

fn render_list(node: NodeRef<'_, Node>) -> String {
    let mut lines = Vec::new();
    for child in node.children() {
        if let Node::Element(elem) = child.value() {
            if elem.name() == "li" {
                let text = collect_text(child);
                if !text.is_empty() {
                    lines.push(format!("\u{2022} {text}"));
                }
            }
        }
    }
    lines.join("\n")
}

#[derive(Debug, Clone)]
struct PendingChunk {
    heading_path: Vec<String>,
    content: String,
    chunk_type: ChunkType,
}

#[derive(Default)]
struct WalkState {
    heading_stack: Vec<(u8, String)>,
    buffer: String,
    chunks: Vec<PendingChunk>,
}

impl WalkState {
    fn heading_path(&self) -> Vec<String> {
        self.heading_stack.iter().map(|(_, text)| text.clone()).collect()
    }

    fn flush_text(&mut self) {
        let text = self.buffer.split_whitespace().collect::<Vec<_>>().join(" ");
        self.buffer.clear();
        if !text.is_empty() {
            self.chunks.push(PendingChunk { heading_path: self.heading_path(), content: text, chunk_type: ChunkType::Text });
        }
    }

    fn push_special(&mut self, content: String, chunk_type: ChunkType) {
        if content.trim().is_empty() {
            return;
        }
        self.chunks.push(PendingChunk { heading_path: self.heading_path(), content, chunk_type });
    }

    fn enter_heading(&mut self, level: u8, text: String) {
        self.flush_text();
        while self.heading_stack.last().is_some_and(|(l, _)| *l >= level) {
            self.heading_stack.pop();
        }
        if !text.is_empty() {
            self.heading_stack.push((level, text));
        }
    }
}

fn walk(node: NodeRef<'_, Node>, state: &mut WalkState) {
    match node.value() {
        Node::Text(text) => {
            state.buffer.push_str(&text.text);
            state.buffer.push(' ');
        }
        Node::Element(elem) => {
            if is_excluded(elem) {
                return;
            }
            let name = elem.name();
            if let Some(level) = heading_level(name) {
                state.enter_heading(level, collect_text(node));
                return;
            }
            match name {
                "pre" => {
                    state.flush_text();
                    state.push_special(collect_text(node), ChunkType::Code);
                }
                "table" => {
                    state.flush_text();
                    state.push_special(render_table(node), ChunkType::Table);
                }
                "ul" | "ol" => {
                    state.flush_text();
                    state.push_special(render_list(node), ChunkType::List);
                }
                "section" | "article" => {
                    state.flush_text();
                    for child in node.children() {
                        walk(child, state);
                    }
                    state.flush_text();
                }
                _ => {
                    for child in node.children() {
                        walk(child, state);
                    }
                }
            }
        }
        _ => {}
    }
}

fn split_oversized(chunks: Vec<PendingChunk>, max_size: usize) -> Vec<PendingChunk> {
    let mut out = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.chunk_type != ChunkType::Text || chunk.content.chars().count() <= max_size {
            out.push(chunk);
            continue;
        }
        let mut remaining = chunk.content;
        while remaining.chars().count() > max_size {
            let (head, tail) = split_at_sentence_boundary(&remaining, max_size);
            out.push(PendingChunk { heading_path: chunk.heading_path.clone(), content: head, chunk_type: ChunkType::Text });
            remaining = tail;
        }
        if !remaining.trim().is_empty() {
            out.push(PendingChunk { heading_path: chunk.heading_path.clone(), content: remaining, chunk_type: ChunkType::Text });
        }
    }
    out
}

/// Merges any chunk shorter than `min_size` into a neighbor, then the caller
/// renumbers. A leading short chunk merges forward; every other short chunk
/// merges backward into the chunk just emitted.
fn merge_short_chunks(chunks: Vec<PendingChunk>, min_size: usize) -> Vec<PendingChunk> {
    if chunks.len() <= 1 {
        return chunks;
    }
    let mut merged: Vec<PendingChunk> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.content.chars().count() < min_size && !merged.is_empty() {
            let prev: &mut PendingChunk = merged.last_mut().expect("just checked non-empty");
            prev.content.push_str("\n\n");
            prev.content.push_str(&chunk.content);
        } else {
            merged.push(chunk);
        }
    }
    if merged.len() > 1 && merged[0].content.chars().count() < min_size {
        let first = merged.remove(0);
        merged[0].content = format!("{}\n\n{}", first.content, merged[0].content);
    }
    merged
}

pub struct DomStructureStrategy;

#[async_trait::async_trait]
impl ChunkingStrategy for DomStructureStrategy {
    fn name(&self) -> &'static str {
        "DomStructure"
    }

    fn description(&self) -> &'static str {
        "Traverses the main content DOM, chunking by heading section with code/table/list awareness"
    }

    async fn chunk(
        &self,
        content: &ExtractedContent,
        params: &ChunkingParams,
        _embeddings: Option<&(dyn EmbeddingBackend)>,
    ) -> WebFluxResult<Vec<Chunk>> {
        let document = Html::parse_document(&content.raw_html);
        let main = find_main(&document);

        let mut state = WalkState::default();
        for child in main.children() {
            walk(child, &mut state);
        }
        state.flush_text();

        let split = split_oversized(state.chunks, params.max_chunk_size);
        let merged = merge_short_chunks(split, params.min_chunk_size);

        let mut chunks: Vec<Chunk> = merged
            .into_iter()
            .enumerate()
            .map(|(i, pc)| Chunk::new(&content.source_url, i, pc.content, pc.chunk_type, pc.heading_path, self.name()))
            .collect();
        renumber(&mut chunks);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract_metadata;
    use crate::quality::evaluate_quality;

    fn extracted_content(html: &str) -> ExtractedContent {
        let metadata = extract_metadata(html, html);
        let quality = evaluate_quality("https://example.com", html, html, None, false, 0);
        ExtractedContent {
            source_url: "https://example.com".to_string(),
            raw_html: html.to_string(),
            main_text: html.to_string(),
            title: None,
            headings: Vec::new(),
            images: Vec::new(),
            links: Vec::new(),
            metadata,
            language: "en".to_string(),
            quality,
        }
    }

    #[tokio::test]
    async fn scenario_s2_three_chunks_with_heading_paths() {
        let html = "<html><body><h1>A</h1><p>one</p><h2>B</h2><p>two</p><h2>C</h2><p>three</p></body></html>";
        let content = extracted_content(html);
        let strategy = DomStructureStrategy;
        let params = ChunkingParams { max_chunk_size: 10_000, min_chunk_size: 0, overlap: 0, strategy_options: Default::default() };
        let chunks = strategy.chunk(&content, &params, None).await.unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].heading_path, vec!["A".to_string()]);
        assert_eq!(chunks[0].content, "one");
        assert_eq!(chunks[1].heading_path, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(chunks[1].content, "two");
        assert_eq!(chunks[2].heading_path, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(chunks[2].content, "three");
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.sequence, i);
        }
    }

    #[tokio::test]
    async fn table_becomes_one_table_chunk() {
        let html = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>";
        let content = extracted_content(html);
        let strategy = DomStructureStrategy;
        let params = ChunkingParams::default();
        let chunks = strategy.chunk(&content, &params, None).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, ChunkType::Table);
        assert_eq!(chunks[0].content, "a | b\nc | d");
    }

    #[tokio::test]
    async fn excluded_elements_do_not_produce_chunks() {
        let html = "<nav><p>skip me</p></nav><p>keep me</p>";
        let content = extracted_content(html);
        let strategy = DomStructureStrategy;
        let params = ChunkingParams::default();
        let chunks = strategy.chunk(&content, &params, None).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "keep me");
    }
}
