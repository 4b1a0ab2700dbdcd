use crate::cli::{build_provider, default_output_name, QueryArgs};
use crate::interrupt::Interrupt;
use crate::writer::{ResultWriter, SaveMode};
use shelfscan_core::clean_cell_barcode;
use shelfscan_lookup::{ProductProvider, RateGate};
use std::path::Path;

pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let provider = build_provider(&args.provider)?;
    let output = args.output.unwrap_or_else(|| {
        default_output_name(&args.file, &format!("{}_query_", provider.name()))
    });
    let interrupt = Interrupt::install();
    query_workbook(
        &args.file,
        &output,
        provider.as_ref(),
        args.barcode_col,
        args.start_row,
        args.save_mode,
        &interrupt,
    )
    .await
}

/// Look up every barcode in `barcode_col` from `start_row` to the last row,
/// appending the provider's fields on the same row in a copy of `source`.
pub async fn query_workbook(
    source: &Path,
    output: &Path,
    provider: &dyn ProductProvider,
    barcode_col: u32,
    start_row: u32,
    save_mode: SaveMode,
    interrupt: &Interrupt,
) -> anyhow::Result<()> {
    let mut writer = ResultWriter::create(source, output, provider, save_mode)?;
    let last_row = writer.workbook().max_row()?;
    tracing::info!(
        provider = provider.name(),
        rows = last_row.saturating_sub(start_row) + 1,
        "querying barcode column {barcode_col}"
    );

    let mut gate = RateGate::new(provider.min_interval());
    for row in start_row..=last_row {
        if interrupt.triggered() {
            return finish_interrupted(&writer, save_mode);
        }
        let cell = writer.workbook().cell_text(barcode_col, row)?.unwrap_or_default();
        let Some(barcode) = clean_cell_barcode(&cell) else {
            tracing::warn!(row, %cell, "empty or invalid barcode cell");
            writer.write_skipped(row, "empty or invalid barcode")?;
            continue;
        };
        let barcode = provider.normalize(&barcode);

        gate.wait().await;
        let outcome = provider.lookup(&barcode).await;
        writer.write_outcome(row, &outcome)?;
    }

    writer.save()?;
    tracing::info!(output = %output.display(), "query complete");
    Ok(())
}

fn finish_interrupted(writer: &ResultWriter, save_mode: SaveMode) -> anyhow::Result<()> {
    if save_mode == SaveMode::AtEnd {
        let path = writer.flush_interrupted()?;
        tracing::warn!(path = %path.display(), "interrupted, partial results flushed");
    } else {
        tracing::warn!("interrupted, rows written so far are already saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_lookup::MockProvider;
    use shelfscan_sheet::Workbook;
    use std::path::PathBuf;

    fn fixture(dir: &Path) -> PathBuf {
        let path = dir.join("codes.xlsx");
        let mut wb = Workbook::create(&path);
        wb.set_cell(1, 1, "barcode").unwrap();
        wb.set_cell(1, 2, " 6901234567892 ").unwrap();
        wb.set_cell(1, 3, "not a barcode").unwrap();
        wb.set_cell(1, 4, "6900000000000").unwrap();
        wb.save().unwrap();
        path
    }

    fn provider() -> MockProvider {
        MockProvider::new([(
            "6901234567892".to_string(),
            vec!["Cola".to_string(), "6901234567892".to_string(), "Acme".to_string()],
        )])
    }

    #[tokio::test]
    async fn writes_results_skips_and_errors_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(dir.path());
        let output = dir.path().join("out.xlsx");

        query_workbook(
            &source,
            &output,
            &provider(),
            1,
            2,
            SaveMode::EveryRow,
            &Interrupt::default(),
        )
        .await
        .unwrap();

        let wb = Workbook::open(&output).unwrap();
        // Row 2: whitespace trimmed, product found.
        assert_eq!(wb.cell_text(2, 2).unwrap().as_deref(), Some("Cola"));
        // Row 3: no digits at all, skipped before any lookup.
        assert_eq!(
            wb.cell_text(2, 3).unwrap().as_deref(),
            Some("skipped: empty or invalid barcode")
        );
        // Row 4: valid digits, unknown product.
        assert!(wb.cell_text(2, 4).unwrap().unwrap().starts_with("error: "));
    }

    #[tokio::test]
    async fn header_row_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(dir.path());
        let output = dir.path().join("out.xlsx");

        query_workbook(
            &source,
            &output,
            &provider(),
            1,
            2,
            SaveMode::AtEnd,
            &Interrupt::default(),
        )
        .await
        .unwrap();

        let wb = Workbook::open(&output).unwrap();
        assert_eq!(wb.cell_text(1, 1).unwrap().as_deref(), Some("barcode"));
        assert_eq!(wb.cell_text(2, 1).unwrap().as_deref(), Some("Product Name"));
    }

    #[tokio::test]
    async fn rerun_is_stable_for_the_same_input() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(dir.path());
        let first = dir.path().join("a.xlsx");
        let second = dir.path().join("b.xlsx");

        for output in [&first, &second] {
            query_workbook(
                &source,
                output,
                &provider(),
                1,
                2,
                SaveMode::AtEnd,
                &Interrupt::default(),
            )
            .await
            .unwrap();
        }

        let (a, b) = (Workbook::open(&first).unwrap(), Workbook::open(&second).unwrap());
        for row in 1..=4 {
            for col in 1..=4 {
                assert_eq!(a.cell_text(col, row).unwrap(), b.cell_text(col, row).unwrap());
            }
        }
    }
}
