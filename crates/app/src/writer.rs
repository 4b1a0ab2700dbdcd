use anyhow::Context;
use clap::ValueEnum;
use shelfscan_core::LookupOutcome;
use shelfscan_lookup::ProductProvider;
use shelfscan_sheet::{copy_file, Workbook};
use std::path::{Path, PathBuf};

/// When to persist the output workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SaveMode {
    /// Save after every written row. Crash-safe, slow.
    EveryRow,
    /// Buffer in memory and save once at the end.
    AtEnd,
}

/// Appends lookup results to a copy of the source workbook.
///
/// The output starts at `source max column + 1`: provider headers land on
/// row 1, field values on their source rows. Failures are written visibly
/// (`error: …` in the first new column, blanks after) so a finished sheet
/// accounts for every processed row.
pub struct ResultWriter {
    workbook: Workbook,
    output: PathBuf,
    start_col: u32,
    headers: Vec<&'static str>,
    gtin_column: Option<usize>,
    mode: SaveMode,
}

impl ResultWriter {
    pub fn create(
        source: &Path,
        output: &Path,
        provider: &dyn ProductProvider,
        mode: SaveMode,
    ) -> anyhow::Result<Self> {
        copy_file(source, output)
            .with_context(|| format!("copying {} to {}", source.display(), output.display()))?;
        let mut workbook = Workbook::open(output)?;
        let start_col = workbook.max_column()? + 1;
        tracing::info!(start_col, "appending {} provider columns", provider.headers().len());

        for (i, header) in provider.headers().iter().enumerate() {
            workbook.set_cell(start_col + i as u32, 1, header)?;
        }

        Ok(Self {
            workbook,
            output: output.to_path_buf(),
            start_col,
            headers: provider.headers().to_vec(),
            gtin_column: provider.gtin_column(),
            mode,
        })
    }

    pub fn start_col(&self) -> u32 {
        self.start_col
    }

    /// Read-only view of the output workbook (used to read source cells,
    /// which the copy shares with the original).
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn write_outcome(&mut self, row: u32, outcome: &LookupOutcome) -> anyhow::Result<()> {
        match outcome {
            LookupOutcome::Found { fields } => {
                for (i, _) in self.headers.iter().enumerate() {
                    let value = fields.get(i).map(String::as_str).unwrap_or("");
                    self.workbook.set_cell(self.start_col + i as u32, row, value)?;
                }
            }
            LookupOutcome::NotFound { reason } => {
                self.write_marker_row(row, &format!("error: {reason}"))?;
            }
        }
        self.maybe_save()
    }

    /// Barcode decoded but the product lookup failed: keep the barcode in its
    /// column so the row is still actionable, blank everything else.
    pub fn write_barcode_only(&mut self, row: u32, barcode: &str) -> anyhow::Result<()> {
        let Some(gtin_column) = self.gtin_column else {
            return self.write_outcome(row, &LookupOutcome::not_found("product lookup failed"));
        };
        for (i, _) in self.headers.iter().enumerate() {
            let value = if i == gtin_column { barcode } else { "" };
            self.workbook.set_cell(self.start_col + i as u32, row, value)?;
        }
        self.maybe_save()
    }

    /// Row skipped before any lookup (empty or invalid barcode cell).
    pub fn write_skipped(&mut self, row: u32, reason: &str) -> anyhow::Result<()> {
        self.write_marker_row(row, &format!("skipped: {reason}"))?;
        self.maybe_save()
    }

    fn write_marker_row(&mut self, row: u32, marker: &str) -> anyhow::Result<()> {
        self.workbook.set_cell(self.start_col, row, marker)?;
        for i in 1..self.headers.len() {
            self.workbook.set_cell(self.start_col + i as u32, row, "")?;
        }
        Ok(())
    }

    fn maybe_save(&self) -> anyhow::Result<()> {
        if self.mode == SaveMode::EveryRow {
            self.save()?;
        }
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.workbook.save_as(&self.output)?;
        Ok(())
    }

    /// Flush buffered results to a sibling `<stem>_interrupted.xlsx` so an
    /// aborted buffered run still leaves its work on disk.
    pub fn flush_interrupted(&self) -> anyhow::Result<PathBuf> {
        let stem = self
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let path = self.output.with_file_name(format!("{stem}_interrupted.xlsx"));
        self.workbook.save_as(&path)?;
        Ok(path)
    }
}
