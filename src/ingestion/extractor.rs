//! Byte-to-text extraction
//!
//! Dispatches on file extension first and content-type substring second.
//! Structured extraction never fails past this boundary: any parser error
//! degrades to a lossy UTF-8 decode of the raw bytes, and the outcome
//! records which path produced the text so callers can log the downgrade.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};
use quick_xml::events::Event;
use scraper::{Html, Selector};

/// How the text was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionMethod {
    Pdf,
    Docx,
    Pptx,
    Csv,
    Spreadsheet,
    Html,
    PlainText,
    /// Structured extraction failed and raw bytes were decoded lossily
    Fallback {
        attempted: &'static str,
        reason: String,
    },
}

/// Result of extracting a document's text
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
}

impl ExtractedText {
    pub fn is_fallback(&self) -> bool {
        matches!(self.method, ExtractionMethod::Fallback { .. })
    }
}

/// Text extractor dispatching on filename extension and content type
pub struct TextExtractor;

impl TextExtractor {
    /// Extract plain text from raw document bytes
    pub fn extract(filename: &str, content_type: &str, bytes: &[u8]) -> ExtractedText {
        let ext = filename
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let ct = content_type.to_ascii_lowercase();

        let structured: Option<(&'static str, fn(&[u8]) -> Result<String, String>)> =
            match ext.as_str() {
                "pdf" => Some(("pdf", Self::extract_pdf)),
                "docx" => Some(("docx", Self::extract_docx)),
                "pptx" => Some(("pptx", Self::extract_pptx)),
                "csv" => Some(("csv", Self::extract_csv)),
                "xlsx" | "xls" => Some(("spreadsheet", Self::extract_spreadsheet)),
                "html" | "htm" => Some(("html", Self::extract_html)),
                "md" | "txt" => None,
                _ => {
                    if ct.contains("pdf") {
                        Some(("pdf", Self::extract_pdf))
                    } else if ct.contains("wordprocessingml") || ct.contains("msword") {
                        Some(("docx", Self::extract_docx))
                    } else if ct.contains("presentationml") || ct.contains("powerpoint") {
                        Some(("pptx", Self::extract_pptx))
                    } else if ct.contains("csv") {
                        Some(("csv", Self::extract_csv))
                    } else if ct.contains("spreadsheetml") || ct.contains("ms-excel") {
                        Some(("spreadsheet", Self::extract_spreadsheet))
                    } else if ct.contains("html") {
                        Some(("html", Self::extract_html))
                    } else {
                        None
                    }
                }
            };

        match structured {
            Some((kind, parse)) => match parse(bytes) {
                Ok(text) => ExtractedText {
                    text,
                    method: match kind {
                        "pdf" => ExtractionMethod::Pdf,
                        "docx" => ExtractionMethod::Docx,
                        "pptx" => ExtractionMethod::Pptx,
                        "csv" => ExtractionMethod::Csv,
                        "spreadsheet" => ExtractionMethod::Spreadsheet,
                        _ => ExtractionMethod::Html,
                    },
                },
                Err(reason) => ExtractedText {
                    text: String::from_utf8_lossy(bytes).into_owned(),
                    method: ExtractionMethod::Fallback {
                        attempted: kind,
                        reason,
                    },
                },
            },
            None => ExtractedText {
                text: String::from_utf8_lossy(bytes).into_owned(),
                method: ExtractionMethod::PlainText,
            },
        }
    }

    /// PDF text, whole-document first with a per-page salvage pass
    fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) => Ok(text),
            Err(whole_doc_err) => {
                // Salvage page by page; a page that fails contributes nothing
                let doc = lopdf::Document::load_mem(bytes)
                    .map_err(|e| format!("{whole_doc_err}; load failed: {e}"))?;
                let pages: Vec<String> = doc
                    .get_pages()
                    .keys()
                    .map(|page| doc.extract_text(&[*page]).unwrap_or_default())
                    .collect();
                Ok(pages.join("\n\n"))
            }
        }
    }

    /// DOCX paragraphs plus table rows, one line per row with " | " cells
    fn extract_docx(bytes: &[u8]) -> Result<String, String> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;
        let mut lines = Vec::new();

        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(paragraph) => {
                    let text = Self::paragraph_text(paragraph);
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
                DocumentChild::Table(table) => {
                    for row in &table.rows {
                        let TableChild::TableRow(row) = row;
                        let cells: Vec<String> = row
                            .cells
                            .iter()
                            .map(|cell| {
                                let TableRowChild::TableCell(cell) = cell;
                                cell.children
                                    .iter()
                                    .filter_map(|content| match content {
                                        TableCellContent::Paragraph(p) => {
                                            let text = Self::paragraph_text(p);
                                            (!text.is_empty()).then_some(text)
                                        }
                                        _ => None,
                                    })
                                    .collect::<Vec<_>>()
                                    .join(" ")
                            })
                            .filter(|c| !c.is_empty())
                            .collect();
                        if !cells.is_empty() {
                            lines.push(cells.join(" | "));
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(lines.join("\n"))
    }

    fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
        let mut text = String::new();
        for child in &paragraph.children {
            if let ParagraphChild::Run(run) = child {
                for run_child in &run.children {
                    if let RunChild::Text(t) = run_child {
                        text.push_str(&t.text);
                    }
                }
            }
        }
        text.trim().to_string()
    }

    /// PPTX slide text, one "[Slide N]" section per slide with any text
    fn extract_pptx(bytes: &[u8]) -> Result<String, String> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;

        let mut slide_names: Vec<(u32, String)> = Vec::new();
        for i in 0..archive.len() {
            let name = archive
                .by_index(i)
                .map_err(|e| e.to_string())?
                .name()
                .to_string();
            if let Some(number) = name
                .strip_prefix("ppt/slides/slide")
                .and_then(|rest| rest.strip_suffix(".xml"))
                .and_then(|n| n.parse::<u32>().ok())
            {
                slide_names.push((number, name));
            }
        }
        slide_names.sort_by_key(|(number, _)| *number);

        let mut sections = Vec::new();
        for (number, name) in slide_names {
            let mut file = archive.by_name(&name).map_err(|e| e.to_string())?;
            let mut xml = String::new();
            std::io::Read::read_to_string(&mut file, &mut xml).map_err(|e| e.to_string())?;

            let slide_text = Self::slide_text(&xml)?;
            if !slide_text.is_empty() {
                sections.push(format!("[Slide {number}]\n{slide_text}"));
            }
        }

        Ok(sections.join("\n\n"))
    }

    /// Collect the contents of every `<a:t>` run in a slide's XML
    fn slide_text(xml: &str) -> Result<String, String> {
        let mut reader = quick_xml::Reader::from_str(xml);
        let mut in_text = false;
        let mut runs = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"a:t" => in_text = true,
                Ok(Event::End(ref e)) if e.name().as_ref() == b"a:t" => in_text = false,
                Ok(Event::Text(e)) if in_text => {
                    let text = e.unescape().map_err(|err| err.to_string())?;
                    if !text.trim().is_empty() {
                        runs.push(text.trim().to_string());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.to_string()),
                _ => {}
            }
        }
        Ok(runs.join("\n"))
    }

    /// Canonical CSV re-serialization (normalizes delimiters and quoting)
    fn extract_csv(bytes: &[u8]) -> Result<String, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            writer.write_record(&record).map_err(|e| e.to_string())?;
        }

        let out = writer.into_inner().map_err(|e| e.to_string())?;
        String::from_utf8(out).map_err(|e| e.to_string())
    }

    /// All sheets of an XLSX/XLS workbook, each headed by its name
    fn extract_spreadsheet(bytes: &[u8]) -> Result<String, String> {
        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;
        let sheet_names = workbook.sheet_names().to_owned();

        let mut sections = Vec::new();
        for name in sheet_names {
            let range = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(_) => continue,
            };

            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(Vec::new());
            for row in range.rows() {
                let cells: Vec<String> = row.iter().map(Self::cell_text).collect();
                writer.write_record(&cells).map_err(|e| e.to_string())?;
            }
            let csv_bytes = writer.into_inner().map_err(|e| e.to_string())?;
            let csv_text = String::from_utf8(csv_bytes).map_err(|e| e.to_string())?;

            sections.push(format!("[Sheet: {name}]\n{csv_text}"));
        }

        Ok(sections.join("\n"))
    }

    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Float(f) => f.to_string(),
            Data::Int(i) => i.to_string(),
            Data::Bool(b) => b.to_string(),
            Data::DateTime(dt) => dt.as_f64().to_string(),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(_) => String::new(),
        }
    }

    /// Visible text of an HTML document's body
    fn extract_html(bytes: &[u8]) -> Result<String, String> {
        let html = String::from_utf8_lossy(bytes);
        let document = Html::parse_document(&html);
        let selector = Selector::parse("body").map_err(|e| e.to_string())?;

        let lines: Vec<String> = match document.select(&selector).next() {
            Some(body) => body.text().map(|t| t.trim().to_string()).collect(),
            None => document
                .root_element()
                .text()
                .map(|t| t.trim().to_string())
                .collect(),
        };

        Ok(lines
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
