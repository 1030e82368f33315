//! PDF export engine.
//!
//! The engine owns everything the export needs ahead of time: discovered
//! font files and their metrics. Discovery scans system fonts, which is slow
//! enough to happen off the UI thread — [`EngineLoader`] runs it on a worker
//! and the event loop polls for a typed outcome (ready / failed / timed out)
//! instead of watching a global for the dependency to appear.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};

use crate::document::{Block, Document, InlineSpan, InlineStyle, RenderOptions};
use crate::export::{ExportConfig, ExportError};
use crate::highlight::{self, ColorScheme};

const PT_TO_MM: f32 = 0.352_778;
const LINE_SPACING: f32 = 1.45;
const BODY_SIZE: f32 = 11.0;
const CODE_SIZE: f32 = 9.5;
const HEADING_SIZES: [f32; 6] = [22.0, 17.0, 14.0, 12.5, 11.5, 11.0];
const BASE_DPI: f32 = 96.0;

fn mm(value: f32) -> Mm {
    Mm(value.into())
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r.into(), g.into(), b.into(), None))
}

/// Renders a document to a PDF file.
///
/// Injected into the app as a trait object so the export controller never
/// reaches for ambient state, and so tests can count invocations.
pub trait PdfRenderer: Send + Sync {
    /// Render `doc` according to `config`, returning the written path.
    fn export(&self, doc: &Document, config: &ExportConfig) -> Result<PathBuf, ExportError>;
}

/// One of the four faces the engine writes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
    Italic,
    Mono,
}

impl Face {
    fn for_style(style: InlineStyle) -> Self {
        if style.code {
            Self::Mono
        } else if style.strong {
            Self::Bold
        } else if style.emphasis {
            Self::Italic
        } else {
            Self::Regular
        }
    }
}

enum FontSource {
    /// A system font file to embed.
    Embedded { data: Vec<u8> },
    /// A PDF base-14 font; nothing to embed.
    Builtin(BuiltinFont),
}

struct LoadedFont {
    source: FontSource,
    /// Advance width per ASCII char, in ems.
    widths: [f32; 128],
    /// Advance for anything outside ASCII, in ems.
    fallback_width: f32,
}

impl LoadedFont {
    fn measure_em(&self, text: &str) -> f32 {
        text.chars()
            .map(|ch| {
                let idx = ch as usize;
                if idx < 128 {
                    self.widths[idx]
                } else {
                    self.fallback_width
                }
            })
            .sum()
    }

    /// Width of `text` at `size` points, in millimetres.
    fn measure_mm(&self, text: &str, size: f32) -> f32 {
        self.measure_em(text) * size * PT_TO_MM
    }
}

fn builtin_font(builtin: BuiltinFont, advance_em: f32) -> LoadedFont {
    LoadedFont {
        source: FontSource::Builtin(builtin),
        widths: [advance_em; 128],
        fallback_width: advance_em,
    }
}

/// The loaded PDF engine: four faces with metrics, ready to export.
pub struct PdfEngine {
    regular: LoadedFont,
    bold: LoadedFont,
    italic: LoadedFont,
    mono: LoadedFont,
}

impl PdfEngine {
    /// Discover fonts and build the engine.
    ///
    /// Falls back to the PDF base-14 fonts when the host has no usable
    /// system fonts (common in containers), so loading only fails when even
    /// discovery itself blows up.
    pub fn load() -> Result<Self, ExportError> {
        let _scope = crate::perf::scope("pdf.engine.load");
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let query = |style: fontdb::Style, weight: fontdb::Weight, family: fontdb::Family| {
            let id = db.query(&fontdb::Query {
                families: &[family],
                weight,
                stretch: fontdb::Stretch::Normal,
                style,
            })?;
            db.with_face_data(id, |data, index| load_font(data.to_vec(), index))?
        };

        let regular = query(
            fontdb::Style::Normal,
            fontdb::Weight::NORMAL,
            fontdb::Family::SansSerif,
        )
        .unwrap_or_else(|| builtin_font(BuiltinFont::Helvetica, 0.55));
        let bold = query(
            fontdb::Style::Normal,
            fontdb::Weight::BOLD,
            fontdb::Family::SansSerif,
        )
        .unwrap_or_else(|| builtin_font(BuiltinFont::HelveticaBold, 0.58));
        let italic = query(
            fontdb::Style::Italic,
            fontdb::Weight::NORMAL,
            fontdb::Family::SansSerif,
        )
        .unwrap_or_else(|| builtin_font(BuiltinFont::HelveticaOblique, 0.55));
        let mono = query(
            fontdb::Style::Normal,
            fontdb::Weight::NORMAL,
            fontdb::Family::Monospace,
        )
        .unwrap_or_else(|| builtin_font(BuiltinFont::Courier, 0.6));

        Ok(Self {
            regular,
            bold,
            italic,
            mono,
        })
    }

    fn font(&self, face: Face) -> &LoadedFont {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
            Face::Mono => &self.mono,
        }
    }
}

/// Parse a font file and extract ASCII advance widths.
fn load_font(data: Vec<u8>, index: u32) -> Option<LoadedFont> {
    let face = ttf_parser::Face::parse(&data, index).ok()?;
    let units_per_em = f32::from(face.units_per_em());
    if units_per_em <= 0.0 {
        return None;
    }

    let mut widths = [0.5_f32; 128];
    let mut sum = 0.0_f32;
    let mut count = 0_u32;
    for (idx, slot) in widths.iter_mut().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let ch = char::from(idx as u8);
        if let Some(advance) = face
            .glyph_index(ch)
            .and_then(|gid| face.glyph_hor_advance(gid))
        {
            *slot = f32::from(advance) / units_per_em;
            sum += *slot;
            count += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let fallback_width = if count > 0 { sum / count as f32 } else { 0.5 };

    Some(LoadedFont {
        source: FontSource::Embedded { data },
        widths,
        fallback_width,
    })
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Result of the asynchronous engine load.
pub enum LoadOutcome {
    Ready(Arc<PdfEngine>),
    Failed(String),
    TimedOut,
}

/// Loads the engine on a background thread.
///
/// Dropping the loader cancels it: the worker's send fails harmlessly and
/// the thread exits. No timer survives teardown.
pub struct EngineLoader {
    rx: Receiver<Result<PdfEngine, ExportError>>,
    started: Instant,
    timeout: Duration,
}

impl EngineLoader {
    /// Spawn the load with a bounded deadline.
    pub fn spawn(timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("pdf-engine-loader".to_string())
            .spawn(move || {
                let _ = tx.send(PdfEngine::load());
            })
            .expect("spawn pdf engine loader");
        Self {
            rx,
            started: Instant::now(),
            timeout,
        }
    }

    #[cfg(test)]
    fn with_channel(rx: Receiver<Result<PdfEngine, ExportError>>, timeout: Duration) -> Self {
        Self {
            rx,
            started: Instant::now(),
            timeout,
        }
    }

    /// Non-blocking poll; `None` while still loading.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        match self.rx.try_recv() {
            Ok(Ok(engine)) => Some(LoadOutcome::Ready(Arc::new(engine))),
            Ok(Err(err)) => Some(LoadOutcome::Failed(err.to_string())),
            Err(TryRecvError::Disconnected) => {
                Some(LoadOutcome::Failed("engine loader exited".to_string()))
            }
            Err(TryRecvError::Empty) => {
                if self.started.elapsed() > self.timeout {
                    Some(LoadOutcome::TimedOut)
                } else {
                    None
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

struct FontRefs {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    mono: IndirectFontRef,
}

impl FontRefs {
    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
            Face::Mono => &self.mono,
        }
    }
}

/// Cursor state while filling pages top to bottom.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: &'a FontRefs,
    engine: &'a PdfEngine,
    options: RenderOptions,
    page_width: f32,
    page_height: f32,
    margin: f32,
    /// Current baseline, in mm from the bottom of the page.
    y: f32,
}

impl PageWriter<'_> {
    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn line_height(size: f32) -> f32 {
        size * PT_TO_MM * LINE_SPACING
    }

    /// Move down by one line of `size` points, breaking the page as needed.
    fn advance_line(&mut self, size: f32) {
        self.ensure_room(Self::line_height(size));
        self.y -= Self::line_height(size);
    }

    /// Break the page when fewer than `needed` mm remain above the margin.
    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed >= self.margin {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(mm(self.page_width), mm(self.page_height), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = self.page_height - self.margin;
    }

    fn set_fill_gray(&self, level: f32) {
        self.layer.set_fill_color(rgb(level, level, level));
    }

    fn set_fill_black(&self) {
        self.layer.set_fill_color(rgb(0.0, 0.0, 0.0));
    }

    /// Draw one line of styled spans starting at the left margin plus `indent`.
    fn draw_spans(&mut self, spans: &[InlineSpan], size: f32, indent: f32, gray: Option<f32>) {
        self.advance_line(size);
        let mut x = self.margin + indent;
        for span in spans {
            let face = Face::for_style(span.style());
            match (span.style().fg, gray) {
                (Some(color), _) => self.layer.set_fill_color(rgb(
                    f32::from(color.r) / 255.0,
                    f32::from(color.g) / 255.0,
                    f32::from(color.b) / 255.0,
                )),
                (None, Some(level)) => self.set_fill_gray(level),
                (None, None) => self.set_fill_black(),
            }
            self.layer
                .use_text(span.text(), size.into(), mm(x), mm(self.y), self.fonts.get(face));
            x += self.engine.font(face).measure_mm(span.text(), size);
        }
        self.set_fill_black();
    }

    fn draw_horizontal_rule(&mut self, y: f32, from_x: f32, to_x: f32, gray: f32) {
        let thickness: f32 = 0.4;
        self.layer.set_outline_color(rgb(gray, gray, gray));
        self.layer.set_outline_thickness(thickness.into());
        let line = Line {
            points: vec![
                (Point::new(mm(from_x), mm(y)), false),
                (Point::new(mm(to_x), mm(y)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    fn draw_vertical_rule(&mut self, x: f32, from_y: f32, to_y: f32) {
        let thickness: f32 = 1.2;
        self.layer.set_outline_color(rgb(0.8, 0.82, 0.85));
        self.layer.set_outline_thickness(thickness.into());
        let line = Line {
            points: vec![
                (Point::new(mm(x), mm(from_y)), false),
                (Point::new(mm(x), mm(to_y)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    /// Word-wrap spans to a width using the engine's font metrics.
    fn wrap_measured(
        &self,
        spans: &[InlineSpan],
        size: f32,
        max_width: f32,
    ) -> Vec<Vec<InlineSpan>> {
        let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
        let mut current: Vec<InlineSpan> = Vec::new();
        let mut width = 0.0_f32;

        for span in spans {
            for word in split_words(span) {
                let is_space = word.text() == " ";
                if is_space && current.is_empty() {
                    continue;
                }
                let word_width = self
                    .engine
                    .font(Face::for_style(word.style()))
                    .measure_mm(word.text(), size);
                if width + word_width > max_width && !current.is_empty() {
                    if is_space {
                        continue;
                    }
                    while current.last().is_some_and(|s| s.text() == " ") {
                        current.pop();
                    }
                    lines.push(std::mem::take(&mut current));
                    width = 0.0;
                }
                width += word_width;
                current.push(word);
            }
        }
        while current.last().is_some_and(|s| s.text() == " ") {
            current.pop();
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

fn split_words(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut word = String::new();
    for ch in span.text().chars() {
        if ch.is_whitespace() {
            if !word.is_empty() {
                out.push(InlineSpan::new(std::mem::take(&mut word), span.style()));
            }
            if out.last().is_none_or(|s: &InlineSpan| s.text() != " ") {
                out.push(InlineSpan::new(" ".to_string(), span.style()));
            }
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        out.push(InlineSpan::new(word, span.style()));
    }
    out
}

impl PdfRenderer for PdfEngine {
    fn export(&self, doc: &Document, config: &ExportConfig) -> Result<PathBuf, ExportError> {
        let _scope = crate::perf::scope("pdf.engine.export");
        let (page_width, page_height) = config.page.size_mm();
        let (pdf, page, layer) =
            PdfDocument::new("markdown export", mm(page_width), mm(page_height), "content");

        let add_font = |font: &LoadedFont| -> Result<IndirectFontRef, ExportError> {
            match &font.source {
                FontSource::Embedded { data } => pdf
                    .add_external_font(Cursor::new(data.clone()))
                    .map_err(|err| ExportError::Pdf(err.to_string())),
                FontSource::Builtin(builtin) => pdf
                    .add_builtin_font(*builtin)
                    .map_err(|err| ExportError::Pdf(err.to_string())),
            }
        };
        let fonts = FontRefs {
            regular: add_font(&self.regular)?,
            bold: add_font(&self.bold)?,
            italic: add_font(&self.italic)?,
            mono: add_font(&self.mono)?,
        };

        let mut writer = PageWriter {
            doc: &pdf,
            layer: pdf.get_page(page).get_layer(layer),
            fonts: &fonts,
            engine: self,
            options: doc.options(),
            page_width,
            page_height,
            margin: config.margin_mm,
            y: page_height - config.margin_mm,
        };

        for block in doc.blocks() {
            render_block(&mut writer, block, config, 0.0);
        }

        let file = File::create(&config.filename)?;
        pdf.save(&mut BufWriter::new(file))
            .map_err(|err| ExportError::Pdf(err.to_string()))?;
        Ok(config.filename.clone())
    }
}

fn render_block(writer: &mut PageWriter<'_>, block: &Block, config: &ExportConfig, indent: f32) {
    let content_width = writer.content_width() - indent;
    match block {
        Block::Heading { level, inlines } => {
            let size = HEADING_SIZES[usize::from((*level).clamp(1, 6)) - 1];
            writer.y -= PageWriter::line_height(size) * 0.4;
            let bold: Vec<InlineSpan> = restyled(inlines, |style| style.strong = true);
            for line in writer.wrap_measured(&bold, size, content_width) {
                writer.draw_spans(&line, size, indent, None);
            }
            writer.y -= PageWriter::line_height(size) * 0.2;
        }

        Block::Paragraph(inlines) => {
            for line in writer.wrap_measured(inlines, BODY_SIZE, content_width) {
                writer.draw_spans(&line, BODY_SIZE, indent, None);
            }
            writer.y -= PageWriter::line_height(BODY_SIZE) * 0.4;
        }

        Block::CodeBlock { language, literal } => {
            let lines = if writer.options.highlight {
                highlight::highlight_code_with(language.as_deref(), literal, ColorScheme::Light)
            } else {
                highlight::plain_code(literal)
            };
            render_code_lines(writer, &lines, indent);
            writer.y -= PageWriter::line_height(BODY_SIZE) * 0.4;
        }

        Block::BlockQuote(inner) => {
            for child in inner {
                let top = writer.y;
                render_quote_child(writer, child, config, indent);
                // Left border segment spanning the rows this child consumed.
                let bottom = writer.y;
                if bottom < top {
                    writer.draw_vertical_rule(writer.margin + indent + 1.0, top, bottom + 1.0);
                }
            }
            writer.y -= PageWriter::line_height(BODY_SIZE) * 0.4;
        }

        Block::List {
            ordered,
            start,
            items,
        } => {
            for (idx, item) in items.iter().enumerate() {
                let marker = if *ordered {
                    format!("{}. ", start + idx)
                } else {
                    "\u{2022} ".to_string()
                };
                let marker_width = writer
                    .engine
                    .font(Face::Regular)
                    .measure_mm(&marker, BODY_SIZE);
                render_list_item(writer, item, config, indent, &marker, marker_width);
            }
            writer.y -= PageWriter::line_height(BODY_SIZE) * 0.4;
        }

        Block::Table {
            alignments: _,
            rows,
            has_header,
        } => {
            render_table(writer, rows, *has_header, indent);
            writer.y -= PageWriter::line_height(BODY_SIZE) * 0.4;
        }

        Block::Rule => {
            writer.advance_line(BODY_SIZE);
            writer.draw_horizontal_rule(
                writer.y,
                writer.margin + indent,
                writer.page_width - writer.margin,
                0.75,
            );
        }

        Block::Image { alt, src } => {
            if !render_image(writer, src, config, indent) {
                let label = if alt.is_empty() { src } else { alt };
                let style = InlineStyle {
                    emphasis: true,
                    ..InlineStyle::default()
                };
                let span = InlineSpan::new(format!("[image: {label}]"), style);
                writer.draw_spans(&[span], BODY_SIZE, indent, Some(0.45));
            }
            writer.y -= PageWriter::line_height(BODY_SIZE) * 0.4;
        }

        Block::HtmlBlock(html) => {
            // No HTML layout engine here; keep the markup legible as code.
            for line in &highlight::plain_code(html) {
                writer.draw_spans(line, CODE_SIZE, indent, Some(0.45));
            }
            writer.y -= PageWriter::line_height(BODY_SIZE) * 0.4;
        }
    }
}

fn restyled(inlines: &[InlineSpan], apply: impl Fn(&mut InlineStyle)) -> Vec<InlineSpan> {
    inlines
        .iter()
        .map(|span| {
            let mut style = span.style();
            apply(&mut style);
            InlineSpan::new(span.text().to_string(), style)
        })
        .collect()
}

fn render_list_item(
    writer: &mut PageWriter<'_>,
    item: &[Block],
    config: &ExportConfig,
    indent: f32,
    marker: &str,
    marker_width: f32,
) {
    let content_width = writer.content_width() - indent - marker_width;
    let mut first = true;
    for child in item {
        if first && let Block::Paragraph(inlines) = child {
            let wrapped = writer.wrap_measured(inlines, BODY_SIZE, content_width);
            for (line_idx, line) in wrapped.iter().enumerate() {
                if line_idx == 0 {
                    let mut with_marker =
                        vec![InlineSpan::new(marker.to_string(), InlineStyle::default())];
                    with_marker.extend(line.iter().cloned());
                    writer.draw_spans(&with_marker, BODY_SIZE, indent, None);
                } else {
                    writer.draw_spans(line, BODY_SIZE, indent + marker_width, None);
                }
            }
            first = false;
            continue;
        }
        first = false;
        render_block(writer, child, config, indent + marker_width);
    }
}

fn render_quote_child(
    writer: &mut PageWriter<'_>,
    child: &Block,
    config: &ExportConfig,
    indent: f32,
) {
    let quote_indent = indent + 5.0;
    match child {
        Block::Paragraph(inlines) => {
            let italic = restyled(inlines, |style| style.emphasis = true);
            let width = writer.content_width() - quote_indent;
            for line in writer.wrap_measured(&italic, BODY_SIZE, width) {
                writer.draw_spans(&line, BODY_SIZE, quote_indent, Some(0.35));
            }
        }
        other => render_block(writer, other, config, quote_indent),
    }
}

fn render_code_lines(writer: &mut PageWriter<'_>, lines: &[Vec<InlineSpan>], indent: f32) {
    let line_height = PageWriter::line_height(CODE_SIZE);
    let pad = 2.0;
    let mut remaining = lines;

    while !remaining.is_empty() {
        writer.ensure_room(line_height + 2.0 * pad);
        let available = writer.y - writer.margin;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fit =
            (((available - 2.0 * pad) / line_height).floor() as usize).clamp(1, remaining.len());
        let (chunk, rest) = remaining.split_at(fit);
        remaining = rest;

        #[allow(clippy::cast_precision_loss)]
        let chunk_height = line_height * chunk.len() as f32 + 2.0 * pad;
        writer.set_fill_gray(0.96);
        let rect = Rect::new(
            mm(writer.margin + indent),
            mm(writer.y - chunk_height),
            mm(writer.page_width - writer.margin),
            mm(writer.y),
        );
        writer.layer.add_rect(rect);
        writer.set_fill_black();

        writer.y -= pad;
        for line in chunk {
            writer.draw_spans(line, CODE_SIZE, indent + pad, None);
        }
        writer.y -= pad;
    }
}

fn render_table(
    writer: &mut PageWriter<'_>,
    rows: &[Vec<Vec<InlineSpan>>],
    has_header: bool,
    indent: f32,
) {
    if rows.is_empty() {
        return;
    }
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let cols = num_cols as f32;
    let col_width = (writer.content_width() - indent) / cols;
    let start_x = writer.margin + indent;
    let end_x = start_x + col_width * cols;

    writer.ensure_room(PageWriter::line_height(BODY_SIZE) * 2.0);
    writer.y -= 1.0;
    writer.draw_horizontal_rule(writer.y, start_x, end_x, 0.8);

    for (row_idx, row) in rows.iter().enumerate() {
        writer.advance_line(BODY_SIZE);
        let row_y = writer.y;
        for (col_idx, cell) in row.iter().enumerate() {
            let bold_header = has_header && row_idx == 0;
            let spans = restyled(cell, |style| style.strong |= bold_header);
            // One line per cell, truncated by measure to the column width.
            let wrapped = writer.wrap_measured(&spans, BODY_SIZE, col_width - 2.0);
            let Some(first_line) = wrapped.first() else {
                continue;
            };
            #[allow(clippy::cast_precision_loss)]
            let mut x = start_x + col_width * col_idx as f32;
            for span in first_line {
                let face = Face::for_style(span.style());
                writer.layer.use_text(
                    span.text(),
                    BODY_SIZE.into(),
                    mm(x),
                    mm(row_y),
                    writer.fonts.get(face),
                );
                x += writer.engine.font(face).measure_mm(span.text(), BODY_SIZE);
            }
        }
        if has_header && row_idx == 0 {
            writer.draw_horizontal_rule(writer.y - 1.2, start_x, end_x, 0.6);
        }
    }
    writer.draw_horizontal_rule(writer.y - 1.5, start_x, end_x, 0.8);
}

/// Embed a raster image, re-encoded as JPEG at the configured quality and
/// placed at the configured raster density. Returns false when the source
/// cannot be read or decoded, letting the caller draw a placeholder.
fn render_image(
    writer: &mut PageWriter<'_>,
    src: &str,
    config: &ExportConfig,
    indent: f32,
) -> bool {
    use printpdf::image_crate::codecs::jpeg::{JpegDecoder, JpegEncoder};

    let path = Path::new(src);
    let Ok(decoded) = printpdf::image_crate::open(path) else {
        return false;
    };
    let rgb_pixels = decoded.to_rgb8();
    let (px_w, px_h) = rgb_pixels.dimensions();
    if px_w == 0 || px_h == 0 {
        return false;
    }

    // Bound payload size: everything goes through JPEG at the configured
    // quality, alpha flattened.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quality = (config.image.quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut jpeg_bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
    if encoder.encode_image(&rgb_pixels).is_err() {
        return false;
    }

    let Ok(decoder) = JpegDecoder::new(Cursor::new(jpeg_bytes)) else {
        return false;
    };
    let Ok(pdf_image) = printpdf::Image::try_from(decoder) else {
        return false;
    };

    let dpi = BASE_DPI * config.raster_scale;
    #[allow(clippy::cast_precision_loss)]
    let natural_w_mm = px_w as f32 * 25.4 / dpi;
    #[allow(clippy::cast_precision_loss)]
    let natural_h_mm = px_h as f32 * 25.4 / dpi;
    let max_w = writer.content_width() - indent;
    let scale = if natural_w_mm > max_w {
        max_w / natural_w_mm
    } else {
        1.0
    };
    let height = natural_h_mm * scale;

    writer.ensure_room(height + 2.0);
    writer.y -= height;

    pdf_image.add_to_layer(
        writer.layer.clone(),
        printpdf::ImageTransform {
            translate_x: Some(mm(writer.margin + indent)),
            translate_y: Some(mm(writer.y)),
            scale_x: Some(scale.into()),
            scale_y: Some(scale.into()),
            dpi: Some(dpi.into()),
            ..Default::default()
        },
    );
    true
}
