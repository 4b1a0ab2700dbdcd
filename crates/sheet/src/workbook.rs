use std::path::{Path, PathBuf};
use thiserror::Error;
use umya_spreadsheet::{reader, writer, Spreadsheet, Worksheet};

use crate::coord::{column_letters, parse_a1};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read workbook: {0}")]
    Read(String),
    #[error("failed to write workbook: {0}")]
    Write(String),
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),
}

/// An embedded picture, anchored at a 1-based (column, row) cell.
#[derive(Debug, Clone)]
pub struct SheetImage {
    pub col: u32,
    pub row: u32,
    pub bytes: Vec<u8>,
}

/// One worksheet of an `.xlsx` file, opened for cell reads, cell writes, and
/// embedded-image extraction. Pipelines never write into the source file:
/// they `copy_file` first and open the copy.
#[derive(Debug)]
pub struct Workbook {
    book: Spreadsheet,
    sheet_index: usize,
    path: PathBuf,
}

/// Byte-for-byte copy of the source workbook, preserving everything the cell
/// API does not model (formats, drawings, defined names).
pub fn copy_file(src: &Path, dest: &Path) -> Result<(), SheetError> {
    std::fs::copy(src, dest)?;
    Ok(())
}

impl Workbook {
    /// Open the active (first) worksheet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        Self::open_sheet(path, None)
    }

    /// Open a worksheet by name, falling back to the first sheet when `None`.
    pub fn open_sheet(path: impl AsRef<Path>, name: Option<&str>) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();
        let book = reader::xlsx::read(&path).map_err(|e| SheetError::Read(format!("{e:?}")))?;
        let sheet_index = match name {
            None => 0,
            Some(n) => book
                .get_sheet_collection()
                .iter()
                .position(|s| s.get_name() == n)
                .ok_or_else(|| SheetError::MissingSheet(n.to_string()))?,
        };
        if book.get_sheet(&sheet_index).is_none() {
            return Err(SheetError::MissingSheet(name.unwrap_or("<active>").to_string()));
        }
        Ok(Self { book, sheet_index, path })
    }

    /// Create a fresh single-sheet workbook at `path` (not yet saved).
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self {
            book: umya_spreadsheet::new_file(),
            sheet_index: 0,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_name(&self) -> Result<String, SheetError> {
        Ok(self.sheet()?.get_name().to_string())
    }

    fn sheet(&self) -> Result<&Worksheet, SheetError> {
        self.book
            .get_sheet(&self.sheet_index)
            .ok_or_else(|| SheetError::MissingSheet(format!("#{}", self.sheet_index)))
    }

    fn sheet_mut(&mut self) -> Result<&mut Worksheet, SheetError> {
        self.book
            .get_sheet_mut(&self.sheet_index)
            .ok_or_else(|| SheetError::MissingSheet(format!("#{}", self.sheet_index)))
    }

    /// Highest populated (column, row). The next free column is
    /// `max_column() + 1`.
    pub fn dimensions(&self) -> Result<(u32, u32), SheetError> {
        Ok(self.sheet()?.get_highest_column_and_row())
    }

    pub fn max_column(&self) -> Result<u32, SheetError> {
        Ok(self.dimensions()?.0)
    }

    pub fn max_row(&self) -> Result<u32, SheetError> {
        Ok(self.dimensions()?.1)
    }

    /// Formatted cell text at a 1-based (column, row); `None` when empty.
    pub fn cell_text(&self, col: u32, row: u32) -> Result<Option<String>, SheetError> {
        let value = self.sheet()?.get_value((col, row));
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    pub fn set_cell(&mut self, col: u32, row: u32, value: &str) -> Result<(), SheetError> {
        self.sheet_mut()?.get_cell_mut((col, row)).set_value(value);
        Ok(())
    }

    /// All embedded images on the sheet with their anchor cells. Images whose
    /// anchor cannot be resolved are skipped with a warning rather than
    /// failing the run.
    pub fn images(&self) -> Result<Vec<SheetImage>, SheetError> {
        let sheet = self.sheet()?;
        let staging = tempfile::tempdir()?;
        let mut out = Vec::new();
        for (idx, image) in sheet.get_image_collection().iter().enumerate() {
            let anchor = image.get_coordinate();
            let Some((col, row)) = parse_a1(&anchor) else {
                tracing::warn!(idx, %anchor, "skipping image with unparseable anchor");
                continue;
            };
            let staged = staging.path().join(format!("img{idx}.bin"));
            image.download_image(&staged.to_string_lossy());
            match std::fs::read(&staged) {
                Ok(bytes) if !bytes.is_empty() => out.push(SheetImage { col, row, bytes }),
                Ok(_) => tracing::warn!(idx, %anchor, "skipping empty image"),
                Err(e) => tracing::warn!(idx, %anchor, "failed to stage image: {e}"),
            }
        }
        Ok(out)
    }

    /// Anchor an image file at a 1-based (column, row).
    pub fn add_image(&mut self, col: u32, row: u32, path: &Path) -> Result<(), SheetError> {
        let anchor = format!("{}{row}", column_letters(col));
        let mut marker = umya_spreadsheet::structs::drawing::spreadsheet::MarkerType::default();
        marker.set_coordinate(&anchor);
        let mut image = umya_spreadsheet::structs::Image::default();
        image.new_image(&path.to_string_lossy(), marker);
        self.sheet_mut()?.add_image(image);
        Ok(())
    }

    /// Persist to the workbook's own path.
    pub fn save(&self) -> Result<(), SheetError> {
        let path = self.path.clone();
        self.save_as(&path)
    }

    /// Persist to `path`. When the direct write fails (the file is open in a
    /// spreadsheet program, partial write), fall back to writing a temporary
    /// sibling and renaming it over the target.
    pub fn save_as(&self, path: &Path) -> Result<(), SheetError> {
        match writer::xlsx::write(&self.book, path) {
            Ok(()) => Ok(()),
            Err(first) => {
                tracing::warn!("direct save failed ({first:?}); retrying via temp file");
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "workbook.xlsx".to_string());
                let tmp = path.with_file_name(format!("tmp_{file_name}"));
                writer::xlsx::write(&self.book, &tmp)
                    .map_err(|e| SheetError::Write(format!("{e:?}")))?;
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
                std::fs::rename(&tmp, path)?;
                Ok(())
            }
        }
    }
}
