// ── Spreadsheet rendering ──
//
// Builds the two documents the exporter writes: a movement slip
// ("bon d'entrée" / "bon de sortie") and a stock validation sheet.
// Rendering is pure: the result is the `.xlsx` bytes.

use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::accumulator::BucketLine;
use crate::error::CoreError;
use crate::model::{Bucket, ReconciliationRow};

const FONT: &str = "Calibri";

const DATE_FILL: u32 = 0x00FF_F2CC;
const ZEBRA_EVEN: u32 = 0x00F9_F9F9;
const ZEBRA_ODD: u32 = 0x00FF_FFFF;
const ROW_RULE: u32 = 0x00D9_D9D9;
const TOTAL_FILL: u32 = 0x00D9_EAD3;
const VALIDATION_HEADER_FILL: u32 = 0x00D3_D3D3;

const MOVEMENT_HEADERS: [&str; 3] = ["Produit ID", "Nom Produit", "Quantité"];
const MOVEMENT_WIDTHS: [u16; 3] = [25, 30, 15];

const VALIDATION_HEADERS: [&str; 5] = [
    "Produit ID",
    "Nom Produit",
    "Stock Inventaire",
    "Quantité Validée",
    "Différence",
];
const VALIDATION_WIDTHS: [u16; 5] = [15, 25, 16, 16, 12];

/// Theme colours of a movement slip: (strong, light).
fn theme(bucket: Bucket) -> (u32, u32) {
    match bucket {
        Bucket::Exits => (0x00F4_0009, 0x00FF_ECE6),
        Bucket::Entries | Bucket::Validated => (0x0018_90FF, 0x00E6_F7FF),
    }
}

/// `Date: dd/mm/yyyy`
pub fn date_label(date: NaiveDate) -> String {
    format!("Date: {}", date.format("%d/%m/%Y"))
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn number(value: i64) -> f64 {
    value as f64
}

fn base() -> Format {
    Format::new().set_font_name(FONT).set_font_size(11)
}

fn set_widths(sheet: &mut Worksheet, widths: &[u16]) -> Result<(), CoreError> {
    for (col, width) in (0u16..).zip(widths) {
        sheet.set_column_width(col, *width)?;
    }
    Ok(())
}

/// Title and date rows shared by both documents. Returns the next free row.
fn write_heading(
    sheet: &mut Worksheet,
    title: &str,
    date: NaiveDate,
    last_col: u16,
    title_fill: Option<u32>,
) -> Result<u32, CoreError> {
    let mut title_fmt = base()
        .set_bold()
        .set_font_size(16)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    if let Some(fill) = title_fill {
        title_fmt = title_fmt.set_background_color(Color::RGB(fill));
    }
    sheet.set_row_height(0, 24)?;
    sheet.merge_range(0, 0, 0, last_col, title, &title_fmt)?;

    let date_fmt = base()
        .set_italic()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(DATE_FILL));
    sheet.merge_range(1, 0, 1, last_col, &date_label(date), &date_fmt)?;

    // Row 2 stays blank.
    Ok(3)
}

// ── Movement slip ────────────────────────────────────────────────────

/// Render the slip for one movement bucket.
pub fn movement_workbook(
    bucket: Bucket,
    lines: &[BucketLine],
    date: NaiveDate,
) -> Result<Vec<u8>, CoreError> {
    let (strong, light) = theme(bucket);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(bucket.sheet_name())?;
    set_widths(sheet, &MOVEMENT_WIDTHS)?;

    let mut row = write_heading(sheet, bucket.document_title(), date, 2, Some(light))?;

    let header_fmt = base()
        .set_bold()
        .set_font_size(12)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(strong))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    sheet.set_row_height(row, 20)?;
    for (col, header) in (0u16..).zip(MOVEMENT_HEADERS) {
        sheet.write_string_with_format(row, col, header, &header_fmt)?;
    }
    row += 1;

    let mut total: i64 = 0;
    for (index, line) in lines.iter().enumerate() {
        let fill = if index % 2 == 0 { ZEBRA_EVEN } else { ZEBRA_ODD };
        let cell = base()
            .set_background_color(Color::RGB(fill))
            .set_align(FormatAlign::VerticalCenter)
            .set_border_left(FormatBorder::Thin)
            .set_border_right(FormatBorder::Thin)
            .set_border_bottom(FormatBorder::Thin)
            .set_border_bottom_color(Color::RGB(ROW_RULE));
        let text = cell.clone().set_align(FormatAlign::Left).set_indent(1);
        let qty = cell.set_align(FormatAlign::Center);

        sheet.write_string_with_format(row, 0, &line.product_id, &text)?;
        sheet.write_string_with_format(row, 1, &line.display_name, &text)?;
        sheet.write_number_with_format(row, 2, line.count, &qty)?;

        total += i64::from(line.count);
        row += 1;
    }

    // Blank spacer, then the total.
    row += 1;
    let total_label = base()
        .set_bold()
        .set_font_size(12)
        .set_background_color(Color::RGB(TOTAL_FILL))
        .set_align(FormatAlign::Right)
        .set_align(FormatAlign::VerticalCenter)
        .set_indent(1)
        .set_border_top(FormatBorder::Medium)
        .set_border_bottom(FormatBorder::Medium)
        .set_border_left(FormatBorder::Thin)
        .set_border_right(FormatBorder::Thin);
    let total_value = base()
        .set_bold()
        .set_font_size(12)
        .set_font_color(Color::Black)
        .set_background_color(Color::RGB(TOTAL_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border_top(FormatBorder::Medium)
        .set_border_bottom(FormatBorder::Medium)
        .set_border_left(FormatBorder::Thin)
        .set_border_right(FormatBorder::Medium);
    sheet.merge_range(row, 0, row, 1, "Total", &total_label)?;
    sheet.write_number_with_format(row, 2, number(total), &total_value)?;

    Ok(workbook.save_to_buffer()?)
}

// ── Validation sheet ─────────────────────────────────────────────────

/// Render the stock validation sheet.
pub fn validation_workbook(
    rows: &[ReconciliationRow],
    date: NaiveDate,
) -> Result<Vec<u8>, CoreError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(Bucket::Validated.sheet_name())?;
    set_widths(sheet, &VALIDATION_WIDTHS)?;

    let header_row = write_heading(sheet, Bucket::Validated.document_title(), date, 4, None)?;

    let header_fmt = base()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(VALIDATION_HEADER_FILL))
        .set_border_bottom(FormatBorder::Thin)
        .set_border_bottom_color(Color::Black);
    for (col, header) in (0u16..).zip(VALIDATION_HEADERS) {
        sheet.write_string_with_format(header_row, col, header, &header_fmt)?;
    }

    let text = base().set_align(FormatAlign::VerticalCenter);
    let num = text.clone().set_align(FormatAlign::Center);

    let mut row = header_row + 1;
    let (mut stock, mut validated, mut difference) = (0i64, 0i64, 0i64);
    for item in rows {
        sheet.write_string_with_format(row, 0, &item.product_id, &text)?;
        sheet.write_string_with_format(row, 1, &item.display_name, &text)?;
        sheet.write_number_with_format(row, 2, number(item.inventory_stock), &num)?;
        sheet.write_number_with_format(row, 3, item.validated_count, &num)?;
        sheet.write_number_with_format(row, 4, number(item.difference), &num)?;

        stock += item.inventory_stock;
        validated += i64::from(item.validated_count);
        difference += item.difference;
        row += 1;
    }

    sheet.autofilter(header_row, 0, row.saturating_sub(1).max(header_row), 4)?;

    let total_label = base()
        .set_bold()
        .set_background_color(Color::RGB(TOTAL_FILL))
        .set_align(FormatAlign::Right)
        .set_border_top(FormatBorder::Medium);
    let total_num = base()
        .set_bold()
        .set_background_color(Color::RGB(TOTAL_FILL))
        .set_align(FormatAlign::Center)
        .set_border_top(FormatBorder::Medium);
    sheet.merge_range(row, 0, row, 1, "Total", &total_label)?;
    for (col, value) in [(2u16, stock), (3, validated), (4, difference)] {
        sheet.write_number_with_format(row, col, number(value), &total_num)?;
    }

    Ok(workbook.save_to_buffer()?)
}
