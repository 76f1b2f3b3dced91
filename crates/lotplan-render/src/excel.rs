//! Excel export of the cleaned table
//!
//! Writes a workbook with:
//! - Schedule: one row per entry with real datetime cells
//! - Rejected: source line and reason for each dropped row (only when
//!   rows were dropped)

use lotplan_core::{RenderError, Renderer, Schedule};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};

const SCHEDULE_HEADERS: [&str; 6] = ["Resource", "Lot", "Product", "Start", "End", "Duration (h)"];

fn xlsx_error(e: XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

/// Excel export renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Name of the data sheet
    pub sheet_name: String,
    /// Number format for start/end cells
    pub datetime_format: String,
    /// Add a sheet listing dropped rows
    pub include_rejected: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            sheet_name: "Schedule".into(),
            datetime_format: "yyyy-mm-dd hh:mm".into(),
            include_rejected: true,
        }
    }
}

struct ExcelFormats {
    header: Format,
    text: Format,
    datetime: Format,
    hours: Format,
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn without_rejected(mut self) -> Self {
        self.include_rejected = false;
        self
    }

    fn create_formats(&self) -> ExcelFormats {
        ExcelFormats {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            datetime: Format::new()
                .set_num_format(&self.datetime_format)
                .set_border(FormatBorder::Thin),
            hours: Format::new()
                .set_num_format("0.00")
                .set_border(FormatBorder::Thin),
        }
    }

    fn add_schedule_sheet(
        &self,
        workbook: &mut Workbook,
        schedule: &Schedule,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name).map_err(xlsx_error)?;

        for (col, header) in SCHEDULE_HEADERS.iter().enumerate() {
            sheet
                .write_string_with_format(0, col as u16, *header, &formats.header)
                .map_err(xlsx_error)?;
        }
        sheet.set_column_width(0, 14).ok();
        sheet.set_column_width(1, 14).ok();
        sheet.set_column_width(2, 28).ok();
        sheet.set_column_width(3, 18).ok();
        sheet.set_column_width(4, 18).ok();
        sheet.set_column_width(5, 12).ok();
        sheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

        for (idx, entry) in schedule.entries.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet
                .write_string_with_format(row, 0, &entry.resource, &formats.text)
                .map_err(xlsx_error)?;
            sheet
                .write_string_with_format(row, 1, &entry.lot_id, &formats.text)
                .map_err(xlsx_error)?;
            sheet
                .write_string_with_format(row, 2, &entry.product, &formats.text)
                .map_err(xlsx_error)?;
            sheet
                .write_datetime_with_format(row, 3, &entry.start, &formats.datetime)
                .map_err(xlsx_error)?;
            sheet
                .write_datetime_with_format(row, 4, &entry.end, &formats.datetime)
                .map_err(xlsx_error)?;
            sheet
                .write_number_with_format(row, 5, entry.duration_hours, &formats.hours)
                .map_err(xlsx_error)?;
        }

        Ok(())
    }

    fn add_rejected_sheet(
        &self,
        workbook: &mut Workbook,
        schedule: &Schedule,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Rejected").map_err(xlsx_error)?;

        sheet
            .write_string_with_format(0, 0, "Line", &formats.header)
            .map_err(xlsx_error)?;
        sheet
            .write_string_with_format(0, 1, "Reason", &formats.header)
            .map_err(xlsx_error)?;
        sheet.set_column_width(1, 48).ok();

        for (idx, rejected) in schedule.rejected.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet
                .write_number_with_format(row, 0, rejected.line as f64, &formats.text)
                .map_err(xlsx_error)?;
            sheet
                .write_string_with_format(row, 1, rejected.reason.to_string(), &formats.text)
                .map_err(xlsx_error)?;
        }

        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, schedule: &Schedule) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        self.add_schedule_sheet(&mut workbook, schedule, &formats)?;
        if self.include_rejected && !schedule.rejected.is_empty() {
            self.add_rejected_sheet(&mut workbook, schedule, &formats)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }
}
