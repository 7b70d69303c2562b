use std::collections::BTreeMap;

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, FileKind};

use super::ooxml::{OoxmlPackage, attribute, resolve_reference, xml_error};
use super::text_table::{MAX_PREVIEW_ROWS, render_table};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const FALLBACK_SHEET_PART: &str = "xl/worksheets/sheet1.xml";

/// Previews the first worksheet: its first row is the header and the next
/// twenty rows are rendered as a text table.
pub struct XlsxAdapter;

#[async_trait]
impl FileLoader for XlsxAdapter {
    #[tracing::instrument(skip(self, data), fields(filename = %document.filename))]
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.kind != Some(FileKind::Xlsx) {
            return Err(FileLoaderError::UnsupportedContentType(document.extension()));
        }

        let mut package = OoxmlPackage::open(data)?;
        let shared_strings = match package.read_part(SHARED_STRINGS_PART)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };
        let sheet_part = first_sheet_part(&mut package)?;
        let sheet_xml = package.require_part(&sheet_part)?;
        let cells = parse_sheet(&sheet_xml, &shared_strings)?;

        tracing::debug!(sheet = %sheet_part, cell_count = cells.len(), "XLSX sheet parsed");

        Ok(preview(&cells))
    }
}

/// Largest sheet an Excel workbook can hold.
const MAX_SHEET_ROWS: usize = 1_048_576;
const MAX_SHEET_COLUMNS: usize = 16_384;

/// Columns shown when previewing a spreadsheet.
const MAX_PREVIEW_COLUMNS: usize = 256;

/// Digits kept after the decimal point in float columns before trimming.
const FLOAT_PRECISION: usize = 6;

/// A cell value typed the way a spreadsheet reader sees it: numbers written
/// without a decimal point or exponent are integers.
#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl CellValue {
    /// Rendering for a value in a mixed-type column or a header.
    fn display(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::Int(value) => value.to_string(),
            CellValue::Float(value) => float_repr(*value),
        }
    }
}

/// Non-empty cell values keyed by zero-based (row, column).
type CellMap = BTreeMap<(usize, usize), CellValue>;

/// How every value of one column is rendered.
#[derive(Debug, PartialEq)]
enum ColumnFormat {
    /// Integers only and no gaps.
    Int,
    /// Numeric with a gap or a fraction: every value shares one decimal count.
    Float { decimals: usize },
    /// Text, booleans or a mix: each value renders on its own.
    Mixed,
}

impl ColumnFormat {
    fn of(values: &[&CellValue], has_missing: bool) -> Self {
        let mut floats = Vec::with_capacity(values.len());
        let mut all_int = true;
        for value in values {
            match value {
                CellValue::Int(v) => floats.push(*v as f64),
                CellValue::Float(v) => {
                    all_int = false;
                    floats.push(*v);
                }
                CellValue::Text(_) | CellValue::Bool(_) => return ColumnFormat::Mixed,
            }
        }

        if all_int && !has_missing {
            return ColumnFormat::Int;
        }

        let decimals = floats
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| significant_decimals(*v))
            .max()
            .unwrap_or(1)
            .max(1);
        ColumnFormat::Float { decimals }
    }

    fn render(&self, value: &CellValue) -> String {
        match (self, value) {
            (ColumnFormat::Float { decimals }, CellValue::Int(v)) => {
                format!("{:.*}", *decimals, *v as f64)
            }
            (ColumnFormat::Float { decimals }, CellValue::Float(v)) => format!("{:.*}", *decimals, v),
            _ => value.display(),
        }
    }
}

/// Decimal places left once trailing zeros are trimmed at fixed precision.
fn significant_decimals(value: f64) -> usize {
    let fixed = format!("{:.*}", FLOAT_PRECISION, value);
    let trimmed = fixed.trim_end_matches('0');
    trimmed
        .split_once('.')
        .map(|(_, fraction)| fraction.len())
        .unwrap_or(0)
}

/// Whole floats keep a trailing `.0` so they read differently from integers.
fn float_repr(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn preview(cells: &CellMap) -> String {
    let Some(first_row) = cells.keys().map(|(r, _)| *r).min() else {
        return render_table(&[], &[]);
    };
    let last_row = cells.keys().map(|(r, _)| *r).max().unwrap_or(first_row);
    let first_col = cells.keys().map(|(_, c)| *c).min().unwrap_or(0);
    let last_col = cells
        .keys()
        .map(|(_, c)| *c)
        .max()
        .unwrap_or(0)
        .min(first_col + MAX_PREVIEW_COLUMNS - 1);

    let mut columns: BTreeMap<usize, Vec<&CellValue>> = BTreeMap::new();
    for ((row, col), value) in cells {
        if *row > first_row && *col <= last_col {
            columns.entry(*col).or_default().push(value);
        }
    }
    let data_rows = last_row - first_row;
    let formats: Vec<ColumnFormat> = (first_col..=last_col)
        .map(|col| {
            let values = columns.get(&col).map(Vec::as_slice).unwrap_or(&[]);
            ColumnFormat::of(values, values.len() < data_rows)
        })
        .collect();

    let headers: Vec<String> = (first_col..=last_col)
        .enumerate()
        .map(|(position, col)| {
            cells
                .get(&(first_row, col))
                .map(CellValue::display)
                .unwrap_or_else(|| format!("Unnamed: {position}"))
        })
        .collect();

    let rows: Vec<Vec<Option<String>>> = (first_row + 1..=last_row)
        .take(MAX_PREVIEW_ROWS)
        .map(|row| {
            (first_col..=last_col)
                .zip(&formats)
                .map(|(col, format)| cells.get(&(row, col)).map(|value| format.render(value)))
                .collect()
        })
        .collect();

    render_table(&headers, &rows)
}

fn first_sheet_part(package: &mut OoxmlPackage<'_>) -> Result<String, FileLoaderError> {
    let Some(workbook) = package.read_part(WORKBOOK_PART)? else {
        return Ok(FALLBACK_SHEET_PART.to_string());
    };
    let Some(relationship_id) = first_sheet_relationship(&workbook)? else {
        return Ok(FALLBACK_SHEET_PART.to_string());
    };
    let Some(rels) = package.read_part(WORKBOOK_RELS_PART)? else {
        return Ok(FALLBACK_SHEET_PART.to_string());
    };

    Ok(relationship_target(&rels, &relationship_id)?
        .map(|target| resolve_target(&target))
        .unwrap_or_else(|| FALLBACK_SHEET_PART.to_string()))
}

fn first_sheet_relationship(workbook: &str) -> Result<Option<String>, FileLoaderError> {
    let mut reader = Reader::from_str(workbook);
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                return Ok(attribute(&e, b"id"));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn relationship_target(rels: &str, id: &str) -> Result<Option<String>, FileLoaderError> {
    let mut reader = Reader::from_str(rels);
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e)
                if e.local_name().as_ref() == b"Relationship"
                    && attribute(&e, b"Id").as_deref() == Some(id) =>
            {
                return Ok(attribute(&e, b"Target"));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Relationship targets are relative to `xl/` unless absolute within the package.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, FileLoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut strings = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"si" {
                    current = Some(String::new());
                }
                stack.push(name);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if collects_shared_text(&stack) => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&t.decode().map_err(xml_error)?);
                }
            }
            Event::GeneralRef(r) if collects_shared_text(&stack) => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&resolve_reference(&r)?);
                }
            }
            Event::End(e) => {
                stack.pop();
                if e.local_name().as_ref() == b"si" {
                    strings.push(current.take().unwrap_or_default());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Text runs count unless they are phonetic hints.
fn collects_shared_text(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|n| n == b"t") && !stack.iter().any(|n| n == b"rPh")
}

#[derive(Default)]
struct CellState {
    row: usize,
    column: usize,
    cell_type: Option<String>,
    value: String,
}

fn parse_sheet(xml: &str, shared_strings: &[String]) -> Result<CellMap, FileLoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut cells = CellMap::new();
    let mut next_row = 0usize;
    let mut next_column = 0usize;
    let mut cell: Option<CellState> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"row" => {
                        next_row = row_index(&e)?.unwrap_or(next_row);
                        next_column = 0;
                    }
                    b"c" => {
                        let state = open_cell(&e, next_row, next_column)?;
                        next_column = state.column + 1;
                        cell = Some(state);
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    next_row = row_index(&e)?.unwrap_or(next_row) + 1;
                    next_column = 0;
                }
                b"c" => {
                    next_column = open_cell(&e, next_row, next_column)?.column + 1;
                }
                _ => {}
            },
            Event::Text(t) if collects_cell_text(&stack) => {
                if let Some(state) = cell.as_mut() {
                    state.value.push_str(&t.decode().map_err(xml_error)?);
                }
            }
            Event::GeneralRef(r) if collects_cell_text(&stack) => {
                if let Some(state) = cell.as_mut() {
                    state.value.push_str(&resolve_reference(&r)?);
                }
            }
            Event::End(e) => {
                stack.pop();
                match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(state) = cell.take() {
                            if let Some(value) = cell_value(&state, shared_strings)? {
                                cells.insert((state.row, state.column), value);
                            }
                        }
                    }
                    b"row" => next_row += 1,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(cells)
}

/// Cell values live in `<v>`, or in `<is><t>` for inline strings. Formula
/// text in `<f>` is never shown.
fn collects_cell_text(stack: &[Vec<u8>]) -> bool {
    match stack.last().map(Vec::as_slice) {
        Some(b"v") => true,
        Some(b"t") => stack.iter().any(|n| n == b"is") && !stack.iter().any(|n| n == b"rPh"),
        _ => false,
    }
}

fn row_index(element: &BytesStart<'_>) -> Result<Option<usize>, FileLoaderError> {
    let Some(number) = attribute(element, b"r") else {
        return Ok(None);
    };
    number
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|r| (1..=MAX_SHEET_ROWS).contains(r))
        .map(|r| Some(r - 1))
        .ok_or_else(|| FileLoaderError::ExtractionFailed(format!("invalid row number: {number}")))
}

fn open_cell(
    element: &BytesStart<'_>,
    row: usize,
    column: usize,
) -> Result<CellState, FileLoaderError> {
    let (row, column) = match attribute(element, b"r") {
        Some(reference) => parse_cell_reference(&reference).ok_or_else(|| {
            FileLoaderError::ExtractionFailed(format!("invalid cell reference: {reference}"))
        })?,
        None if row < MAX_SHEET_ROWS && column < MAX_SHEET_COLUMNS => (row, column),
        None => {
            return Err(FileLoaderError::ExtractionFailed(
                "sheet exceeds the worksheet size limit".to_string(),
            ));
        }
    };

    Ok(CellState {
        row,
        column,
        cell_type: attribute(element, b"t"),
        value: String::new(),
    })
}

/// Parses an A1-style reference into zero-based (row, column). References
/// beyond XFD1048576 are rejected.
fn parse_cell_reference(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut column = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
        column = column.checked_mul(26)?.checked_add(digit)?;
        if column > MAX_SHEET_COLUMNS {
            return None;
        }
    }

    let row = digits.parse::<usize>().ok()?;
    if !(1..=MAX_SHEET_ROWS).contains(&row) {
        return None;
    }
    Some((row - 1, column - 1))
}

/// Empty cells yield `None`.
fn cell_value(
    cell: &CellState,
    shared_strings: &[String],
) -> Result<Option<CellValue>, FileLoaderError> {
    let raw = cell.value.as_str();
    if raw.is_empty() {
        return Ok(None);
    }

    let value = match cell.cell_type.as_deref() {
        Some("s") => {
            let index: usize = raw.trim().parse().map_err(|_| {
                FileLoaderError::ExtractionFailed(format!("invalid shared string index: {raw}"))
            })?;
            let text = shared_strings.get(index).cloned().ok_or_else(|| {
                FileLoaderError::ExtractionFailed(format!("shared string {index} out of range"))
            })?;
            if text.is_empty() {
                return Ok(None);
            }
            CellValue::Text(text)
        }
        Some("b") => match raw.trim() {
            "" => return Ok(None),
            "1" => CellValue::Bool(true),
            _ => CellValue::Bool(false),
        },
        Some("str") | Some("inlineStr") | Some("e") | Some("d") => {
            CellValue::Text(raw.to_string())
        }
        _ => parse_number(raw),
    };
    Ok(Some(value))
}

fn parse_number(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if !trimmed.contains(['.', 'e', 'E']) {
        if let Ok(value) = trimmed.parse::<i64>() {
            return CellValue::Int(value);
        }
    }
    match trimmed.parse::<f64>() {
        Ok(value) => CellValue::Float(value),
        Err(_) => CellValue::Text(raw.to_string()),
    }
}
