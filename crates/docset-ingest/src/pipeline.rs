//! Per-format ingestion pipelines and the extension router.
//!
//! Every format follows the same two-pass pattern: scan all units first
//! (boilerplate detection, table location), then walk them again applying
//! boilerplate removal, selective recognition enrichment, deduplication and
//! chunking. Units are processed strictly in document order because
//! boilerplate and dedup state accumulate sequentially.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, info, warn};

use docset_core::error::Error;
use docset_core::ids::{doc_id_from_path, title_from_path};
use docset_core::traits::{BlockExtractor, PageExtractor, SlideExtractor, Transcriber};
use docset_core::types::{Caption, Chunk, DocBlock, SourceType};

use crate::blocks::SectionAssembler;
use crate::boilerplate::{drop_boilerplate, find_boilerplate_lines, BoilerplateSet};
use crate::chunk::TokenChunker;
use crate::dedup::{canonicalize_for_hash, dedup_chunks, signature, SeenSignatures};
use crate::normalize::normalize;
use crate::recognize::SharedRecognizer;
use crate::transcript::{merge_segments, timecode};
use crate::video::{probe_duration, split_by_size};

/// The closed set of document kinds this pipeline routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Paginated,
    SlideDeck,
    WordDoc,
    PlainText,
    Video,
}

impl DocumentKind {
    /// Dispatch by file extension; unsupported extensions are an immediate
    /// typed error with no partial output.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Paginated),
            "pptx" => Ok(Self::SlideDeck),
            "docx" => Ok(Self::WordDoc),
            "txt" | "md" => Ok(Self::PlainText),
            "mp4" => Ok(Self::Video),
            _ => Err(Error::UnsupportedExtension {
                ext,
                path: path.to_path_buf(),
            }
            .into()),
        }
    }
}

/// Tuning knobs for the ingestion pipeline. The recognition and
/// boilerplate thresholds were tuned empirically; they are configuration,
/// not invariants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub max_tokens: usize,
    pub overlap_tokens: usize,
    /// Below this many native words a page is considered sparse and falls
    /// back to recognition.
    pub min_native_words: usize,
    /// Recognition-derived text below this word count is discarded.
    pub min_ocr_words: usize,
    /// Minimum words for a page's prose to be chunked at all.
    pub min_prose_words: usize,
    /// Minimum words for a slide's native text to be chunked.
    pub min_slide_words: usize,
    /// Minimum words for a table rendering to be worth indexing.
    pub min_table_words: usize,
    /// Recognition results at or below this confidence (0-100) are ignored.
    pub confidence_floor: f32,
    pub page_boilerplate_fraction: f64,
    pub slide_boilerplate_fraction: f64,
    pub boilerplate_max_line_len: usize,
    /// Below this many pages/slides the boilerplate scan is skipped; with
    /// one page every line recurs on 100% of pages and would be stripped.
    pub boilerplate_min_pages: usize,
    /// Embedded images with a smaller pixel area are not recognized.
    pub min_image_area: u64,
    /// Warm-up window of the word-document section state machine.
    pub block_warmup: usize,
    pub segment_max_secs: f64,
    pub segment_max_chars: usize,
    pub segment_gap_secs: f64,
    /// Minimum words for a merged transcript block to be chunked.
    pub min_block_words: usize,
    /// Videos above this size are split before transcription.
    pub video_segment_limit_bytes: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            overlap_tokens: 120,
            min_native_words: 10,
            min_ocr_words: 8,
            min_prose_words: 8,
            min_slide_words: 4,
            min_table_words: 4,
            confidence_floor: 95.0,
            page_boilerplate_fraction: 0.6,
            slide_boilerplate_fraction: 0.7,
            boilerplate_max_line_len: 120,
            boilerplate_min_pages: 2,
            min_image_area: 150_000,
            block_warmup: 3,
            segment_max_secs: 60.0,
            segment_max_chars: 1200,
            segment_gap_secs: 1.5,
            min_block_words: 8,
            video_segment_limit_bytes: 100 * 1024 * 1024,
        }
    }
}

impl PipelineOptions {
    /// Read the `[ingest]` section of the merged configuration, falling
    /// back to defaults.
    pub fn from_config(config: &docset_core::config::Config) -> Result<Self> {
        let opts: Self = config.section("ingest");
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::InvalidConfig("max_tokens must be positive".into()).into());
        }
        if self.overlap_tokens >= self.max_tokens {
            return Err(Error::InvalidConfig(format!(
                "overlap_tokens ({}) must be below max_tokens ({})",
                self.overlap_tokens, self.max_tokens
            ))
            .into());
        }
        for (name, fraction) in [
            ("page_boilerplate_fraction", self.page_boilerplate_fraction),
            ("slide_boilerplate_fraction", self.slide_boilerplate_fraction),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be within 0..=1, got {fraction}"
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Orchestrates extraction-adapter output through normalization,
/// boilerplate removal, deduplication and chunking, emitting typed chunk
/// records with location metadata.
pub struct IngestPipeline {
    opts: PipelineOptions,
    chunker: TokenChunker,
    pages: Box<dyn PageExtractor>,
    slides: Box<dyn SlideExtractor>,
    blocks: Box<dyn BlockExtractor>,
    recognizer: SharedRecognizer,
    transcriber: Box<dyn Transcriber>,
}

impl IngestPipeline {
    pub fn new(
        opts: PipelineOptions,
        chunker: TokenChunker,
        pages: Box<dyn PageExtractor>,
        slides: Box<dyn SlideExtractor>,
        blocks: Box<dyn BlockExtractor>,
        recognizer: SharedRecognizer,
        transcriber: Box<dyn Transcriber>,
    ) -> Self {
        Self {
            opts,
            chunker,
            pages,
            slides,
            blocks,
            recognizer,
            transcriber,
        }
    }

    /// Process one file start to finish, returning its chunk records in
    /// document order. All non-video kinds get a final chunk-level dedup
    /// pass scoped to this document.
    pub fn process_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let kind = DocumentKind::from_path(path)?;
        info!(path = %path.display(), ?kind, "ingesting file");
        let chunks = match kind {
            DocumentKind::Paginated => self.process_paginated(path)?,
            DocumentKind::SlideDeck => self.process_slides(path)?,
            DocumentKind::WordDoc => self.process_word(path)?,
            DocumentKind::PlainText => self.process_plain(path)?,
            // Transcripts are time-ordered and unique; only non-video
            // formats need the safety net.
            DocumentKind::Video => return self.process_video(path),
        };
        Ok(dedup_chunks(chunks))
    }

    fn chunk(&self, text: &str) -> Vec<String> {
        self.chunker
            .chunk(text, self.opts.max_tokens, self.opts.overlap_tokens)
    }

    /// Recurrence is meaningless for documents with too few units; those
    /// get an empty set and keep all their text.
    fn scan_boilerplate(&self, units: &[String], min_fraction: f64) -> BoilerplateSet {
        if units.len() < self.opts.boilerplate_min_pages {
            return BoilerplateSet::new();
        }
        find_boilerplate_lines(units, min_fraction, self.opts.boilerplate_max_line_len)
    }

    fn process_paginated(&self, path: &Path) -> Result<Vec<Chunk>> {
        let doc_id = doc_id_from_path(path)?;
        let title = title_from_path(path);
        let pages = self.pages.pages(path)?;

        // Pass 1: boilerplate over native text, table locations per page.
        let native: Vec<String> = pages.iter().map(|p| p.text.clone()).collect();
        let boiler = self.scan_boilerplate(&native, self.opts.page_boilerplate_fraction);
        let tables = self.pages.tables(path).unwrap_or_else(|err| {
            warn!(error = %err, "table extraction failed; continuing without tables");
            Default::default()
        });

        // Pass 2: selective recognition + dedup + chunk.
        let mut seen = SeenSignatures::new();
        let mut out: Vec<Chunk> = Vec::new();
        for page in &pages {
            let mut caption = None;
            let mut confidence = None;
            let mut base = normalize(&drop_boilerplate(&page.text, &boiler));

            if word_count(&base) < self.opts.min_native_words {
                if let Some((text, conf)) = self.recognize_page(path, page.number, &boiler) {
                    if word_count(&text) > word_count(&base) {
                        base = text;
                        caption = Some(Caption::Ocr);
                        confidence = conf;
                    }
                }
            }

            let canon = canonicalize_for_hash(&base);
            let duplicate = !canon.is_empty() && seen.is_duplicate(signature(&canon));
            if duplicate {
                debug!(page = page.number, "skipping duplicate page");
            }

            if !canon.is_empty() && !duplicate && word_count(&base) >= self.opts.min_prose_words {
                for text in self.chunk(&base) {
                    let mut chunk = Chunk::new(&doc_id, SourceType::Paginated, &title, text)
                        .with_page(page.number)
                        .with_confidence(confidence);
                    chunk.caption = caption;
                    out.push(chunk.finalize());
                }
            }

            // Tables are chunked independently of the prose dedup decision
            // for the page.
            if let Some(page_tables) = tables.get(&page.number) {
                for table in page_tables {
                    let table = normalize(table);
                    if word_count(&table) < self.opts.min_table_words {
                        continue;
                    }
                    for text in self.chunk(&table) {
                        out.push(
                            Chunk::new(&doc_id, SourceType::Paginated, &title, text)
                                .with_page(page.number)
                                .with_caption(Caption::Table)
                                .finalize(),
                        );
                    }
                }
            }
        }
        Ok(out)
    }

    /// Recognition fallback for one sparse page. Failures are local: the
    /// page keeps whatever native text it has.
    fn recognize_page(
        &self,
        path: &Path,
        page: u32,
        boiler: &BoilerplateSet,
    ) -> Option<(String, Option<f32>)> {
        let image = match self.pages.page_image(path, page) {
            Ok(Some(image)) => image,
            Ok(None) => return None,
            Err(err) => {
                warn!(page, error = %err, "page render failed; skipping enrichment");
                return None;
            }
        };
        match self.recognizer.recognize(&image) {
            Ok(rec) => {
                if rec.text.trim().is_empty()
                    || !rec.confidence.is_some_and(|c| c > self.opts.confidence_floor)
                {
                    return None;
                }
                let clean = normalize(&drop_boilerplate(&rec.text, boiler));
                Some((clean, rec.confidence))
            }
            Err(err) => {
                warn!(page, error = %err, "page recognition failed; skipping enrichment");
                None
            }
        }
    }

    fn process_slides(&self, path: &Path) -> Result<Vec<Chunk>> {
        let doc_id = doc_id_from_path(path)?;
        let title = title_from_path(path);
        let slides = self.slides.slides(path)?;

        let texts: Vec<String> = slides.iter().map(|s| s.text.clone()).collect();
        let boiler = self.scan_boilerplate(&texts, self.opts.slide_boilerplate_fraction);

        let mut seen = SeenSignatures::new();
        let mut out: Vec<Chunk> = Vec::new();
        for slide in &slides {
            let slide_text = normalize(&drop_boilerplate(&slide.text, &boiler));
            let table_md = slide.tables.join("\n\n");

            let big: Vec<_> = slide
                .images
                .iter()
                .filter(|im| im.area() > self.opts.min_image_area)
                .cloned()
                .collect();
            let (ocr_raw, ocr_conf) = if big.is_empty() {
                (String::new(), None)
            } else {
                self.recognizer
                    .recognize_images(&big, self.opts.confidence_floor)
            };
            let ocr_text = normalize(&ocr_raw);

            // Whole-slide dedup over everything the slide would emit.
            let mut combined = slide_text.clone();
            if !table_md.is_empty() {
                combined.push('\n');
                combined.push_str(&table_md);
            }
            if !ocr_text.is_empty() {
                combined.push('\n');
                combined.push_str(&ocr_text);
            }
            let canon = canonicalize_for_hash(&combined);
            if !canon.is_empty() && seen.is_duplicate(signature(&canon)) {
                debug!(slide = slide.number, "skipping duplicate slide");
                continue;
            }

            if word_count(&slide_text) >= self.opts.min_slide_words {
                for text in self.chunk(&slide_text) {
                    out.push(
                        Chunk::new(&doc_id, SourceType::SlideDeck, &title, text)
                            .with_slide(slide.number)
                            .finalize(),
                    );
                }
            }
            if !table_md.is_empty() {
                for text in self.chunk(&normalize(&table_md)) {
                    out.push(
                        Chunk::new(&doc_id, SourceType::SlideDeck, &title, text)
                            .with_slide(slide.number)
                            .with_caption(Caption::Table)
                            .finalize(),
                    );
                }
            }
            if !ocr_text.is_empty() && word_count(&ocr_text) >= self.opts.min_ocr_words {
                for text in self.chunk(&ocr_text) {
                    out.push(
                        Chunk::new(&doc_id, SourceType::SlideDeck, &title, text)
                            .with_slide(slide.number)
                            .with_caption(Caption::Ocr)
                            .with_confidence(ocr_conf)
                            .finalize(),
                    );
                }
            }
        }
        Ok(out)
    }

    fn process_word(&self, path: &Path) -> Result<Vec<Chunk>> {
        let doc_id = doc_id_from_path(path)?;
        let title = title_from_path(path);
        let blocks = self.blocks.blocks(path)?;
        debug!(blocks = blocks.len(), "word document blocks loaded");

        let mut assembler = SectionAssembler::new(self.opts.block_warmup);
        let mut out: Vec<Chunk> = Vec::new();

        for block in &blocks {
            match block {
                DocBlock::Table { markdown } => {
                    // Flush surrounding prose, emit the table on its own,
                    // re-arm the warm-up window for whatever follows.
                    if let Some(section) = assembler.flush() {
                        self.emit_section(&doc_id, &title, &section.label, &section.text, &mut out);
                    }
                    let table = normalize(markdown);
                    for text in self.chunk(&table) {
                        out.push(
                            Chunk::new(&doc_id, SourceType::WordDoc, &title, text)
                                .with_section("table")
                                .with_caption(Caption::Table)
                                .finalize(),
                        );
                    }
                    assembler.reset_counter();
                }
                DocBlock::Image(image) => {
                    if image.area() <= self.opts.min_image_area {
                        continue;
                    }
                    if let Some(section) = assembler.flush() {
                        self.emit_section(&doc_id, &title, &section.label, &section.text, &mut out);
                    }
                    let (raw, conf) = self
                        .recognizer
                        .recognize_images(std::slice::from_ref(image), self.opts.confidence_floor);
                    let ocr = normalize(&raw);
                    if !ocr.is_empty() && word_count(&ocr) >= self.opts.min_ocr_words {
                        for text in self.chunk(&ocr) {
                            out.push(
                                Chunk::new(&doc_id, SourceType::WordDoc, &title, text)
                                    .with_section("image")
                                    .with_caption(Caption::Ocr)
                                    .with_confidence(conf)
                                    .finalize(),
                            );
                        }
                    }
                    assembler.reset_counter();
                }
                prose => {
                    if let Some(section) = assembler.push(prose) {
                        self.emit_section(&doc_id, &title, &section.label, &section.text, &mut out);
                    }
                }
            }
        }
        if let Some(section) = assembler.flush() {
            self.emit_section(&doc_id, &title, &section.label, &section.text, &mut out);
        }
        Ok(out)
    }

    fn emit_section(
        &self,
        doc_id: &str,
        title: &str,
        label: &str,
        raw: &str,
        out: &mut Vec<Chunk>,
    ) {
        let text = normalize(raw);
        let chunks = self.chunk(&text);
        debug!(section = label, chunks = chunks.len(), "section flushed");
        for text in chunks {
            out.push(
                Chunk::new(doc_id, SourceType::WordDoc, title, text)
                    .with_section(label)
                    .finalize(),
            );
        }
    }

    fn process_plain(&self, path: &Path) -> Result<Vec<Chunk>> {
        let doc_id = doc_id_from_path(path)?;
        let title = title_from_path(path);
        let raw = read_lossy(path)?;
        let text = normalize(&raw);
        Ok(self
            .chunk(&text)
            .into_iter()
            .map(|text| Chunk::new(&doc_id, SourceType::Transcript, &title, text).finalize())
            .collect())
    }

    fn process_video(&self, path: &Path) -> Result<Vec<Chunk>> {
        let doc_id = doc_id_from_path(path)?;
        let title = title_from_path(path);

        let duration = probe_duration(path)?;
        // The TempDir guard releases segment storage when this function
        // returns, on the error paths included.
        let (segments, _tmpdir) =
            split_by_size(path, duration, self.opts.video_segment_limit_bytes)?;

        let mut out: Vec<Chunk> = Vec::new();
        let mut detected_language: Option<String> = None;
        let mut offset = 0.0f64;

        for (idx, segment_path) in segments.iter().enumerate() {
            let seg_duration = probe_duration(segment_path)?;
            debug!(segment = idx + 1, seg_duration, "transcribing segment");

            let transcription = self.transcriber.transcribe(segment_path)?;
            if detected_language.is_none() {
                detected_language = transcription.language.clone();
            }

            let time_blocks = merge_segments(
                &transcription.segments,
                self.opts.segment_max_secs,
                self.opts.segment_max_chars,
                self.opts.segment_gap_secs,
            );
            for block in time_blocks {
                let text = normalize(&block.text);
                if word_count(&text) < self.opts.min_block_words {
                    continue;
                }
                let code = timecode(block.start + offset, block.end + offset);
                for piece in self.chunk(&text) {
                    out.push(
                        Chunk::new(&doc_id, SourceType::Transcript, &title, piece)
                            .with_timecode(code.clone())
                            .finalize(),
                    );
                }
            }
            offset += seg_duration;
        }
        info!(
            chunks = out.len(),
            language = detected_language.as_deref().unwrap_or("unknown"),
            "video transcription done"
        );
        Ok(out)
    }
}

/// All ingestible files under a directory, sorted for deterministic runs.
pub fn supported_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| DocumentKind::from_path(p).is_ok())
        .collect();
    files.sort();
    files
}

/// Dump a document's emitted chunks as JSON for inspection and debugging.
pub fn write_chunks_json(dir: &Path, doc_name: &str, chunks: &[Chunk]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", doc_name));
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, chunks)?;
    debug!(path = %path.display(), chunks = chunks.len(), "chunk dump written");
    Ok(path)
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn read_lossy(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&std::fs::read(path)?).to_string()),
    }
}
