use crate::cli::{build_provider, default_output_name, ScanArgs};
use crate::interrupt::Interrupt;
use crate::writer::{ResultWriter, SaveMode};
use shelfscan_decode::{decode_barcode, BarcodeEngine, RxingEngine};
use shelfscan_lookup::{ProductProvider, RateGate};
use shelfscan_sheet::SheetImage;
use std::path::Path;

pub async fn run(args: ScanArgs) -> anyhow::Result<()> {
    let provider = build_provider(&args.provider)?;
    let output = args.output.unwrap_or_else(|| {
        default_output_name(&args.file, &format!("{}_scan_", provider.name()))
    });
    let interrupt = Interrupt::install();
    let engine = RxingEngine::new();
    scan_workbook(
        &args.file,
        &output,
        provider.as_ref(),
        &engine,
        &args.image_cols,
        args.save_mode,
        &interrupt,
    )
    .await
}

/// Decode every barcode image in `image_cols`, look each one up, and append
/// the provider's fields on the image's row in a copy of `source`.
pub async fn scan_workbook(
    source: &Path,
    output: &Path,
    provider: &dyn ProductProvider,
    engine: &dyn BarcodeEngine,
    image_cols: &[u32],
    save_mode: SaveMode,
    interrupt: &Interrupt,
) -> anyhow::Result<()> {
    let mut writer = ResultWriter::create(source, output, provider, save_mode)?;

    let mut images: Vec<SheetImage> = writer
        .workbook()
        .images()?
        .into_iter()
        .filter(|img| image_cols.contains(&img.col))
        .collect();
    images.sort_by_key(|img| (img.col, img.row));
    tracing::info!(
        provider = provider.name(),
        count = images.len(),
        "scanning embedded barcode images"
    );

    let mut gate = RateGate::new(provider.min_interval());
    for img in &images {
        if interrupt.triggered() {
            return finish_interrupted(&writer, save_mode);
        }
        let row = img.row;
        let Some(decoded) = decode_barcode(engine, &img.bytes) else {
            tracing::warn!(row, "no barcode detected");
            writer.write_outcome(
                row,
                &shelfscan_core::LookupOutcome::not_found("no barcode detected"),
            )?;
            continue;
        };
        let barcode = provider.normalize(&decoded.candidate.value);
        tracing::debug!(row, %barcode, strategy = decoded.strategy, "decoded barcode");

        gate.wait().await;
        let outcome = provider.lookup(&barcode).await;
        if outcome.is_found() {
            writer.write_outcome(row, &outcome)?;
        } else {
            // The barcode itself is still worth keeping even when the
            // product database has no entry for it.
            writer.write_barcode_only(row, &barcode)?;
        }
    }

    writer.save()?;
    tracing::info!(output = %output.display(), rows = images.len(), "scan complete");
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
    use shelfscan_core::BarcodeCandidate;
    use shelfscan_decode::MockEngine;
    use shelfscan_lookup::MockProvider;
    use shelfscan_sheet::Workbook;
    use std::path::PathBuf;

    fn fixture_with_images(dir: &Path, rows: &[u32]) -> PathBuf {
        let png = dir.join("code.png");
        image::DynamicImage::ImageLuma8(image::ImageBuffer::from_fn(8, 8, |_, _| {
            image::Luma([200u8])
        }))
        .save(&png)
        .unwrap();

        let path = dir.join("shelf.xlsx");
        let mut wb = Workbook::create(&path);
        wb.set_cell(1, 1, "shelf slot").unwrap();
        for &row in rows {
            wb.set_cell(1, row, &format!("slot {row}")).unwrap();
            wb.add_image(2, row, &png).unwrap();
        }
        wb.save().unwrap();
        path
    }

    fn candidate() -> BarcodeCandidate {
        BarcodeCandidate { value: "6901234567892".to_string(), symbology: "EAN_13".to_string() }
    }

    #[tokio::test]
    async fn found_products_land_on_the_image_rows() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture_with_images(dir.path(), &[2, 3]);
        let output = dir.path().join("out.xlsx");
        let provider = MockProvider::new([(
            "6901234567892".to_string(),
            vec!["Cola".to_string(), "6901234567892".to_string(), "Acme".to_string()],
        )]);
        let engine = MockEngine::always(candidate());

        scan_workbook(
            &source,
            &output,
            &provider,
            &engine,
            &[2],
            SaveMode::AtEnd,
            &Interrupt::default(),
        )
        .await
        .unwrap();

        let wb = Workbook::open(&output).unwrap();
        assert_eq!(wb.cell_text(2, 1).unwrap().as_deref(), Some("Product Name"));
        for row in [2, 3] {
            assert_eq!(wb.cell_text(2, row).unwrap().as_deref(), Some("Cola"));
            assert_eq!(wb.cell_text(4, row).unwrap().as_deref(), Some("Acme"));
        }
    }

    #[tokio::test]
    async fn unknown_product_keeps_only_the_barcode() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture_with_images(dir.path(), &[2]);
        let output = dir.path().join("out.xlsx");
        let engine = MockEngine::always(candidate());

        scan_workbook(
            &source,
            &output,
            &MockProvider::empty(),
            &engine,
            &[2],
            SaveMode::AtEnd,
            &Interrupt::default(),
        )
        .await
        .unwrap();

        let wb = Workbook::open(&output).unwrap();
        assert_eq!(wb.cell_text(2, 2).unwrap(), None);
        assert_eq!(wb.cell_text(3, 2).unwrap().as_deref(), Some("6901234567892"));
    }

    #[tokio::test]
    async fn undecodable_image_is_reported_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture_with_images(dir.path(), &[2]);
        let output = dir.path().join("out.xlsx");
        let engine = MockEngine::never();

        scan_workbook(
            &source,
            &output,
            &MockProvider::empty(),
            &engine,
            &[2],
            SaveMode::AtEnd,
            &Interrupt::default(),
        )
        .await
        .unwrap();

        let wb = Workbook::open(&output).unwrap();
        assert_eq!(
            wb.cell_text(2, 2).unwrap().as_deref(),
            Some("error: no barcode detected")
        );
    }

    #[tokio::test]
    async fn images_outside_the_requested_columns_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture_with_images(dir.path(), &[2]);
        let output = dir.path().join("out.xlsx");
        let engine = MockEngine::always(candidate());

        scan_workbook(
            &source,
            &output,
            &MockProvider::empty(),
            &engine,
            &[5],
            SaveMode::AtEnd,
            &Interrupt::default(),
        )
        .await
        .unwrap();

        assert_eq!(engine.attempts(), 0);
        let wb = Workbook::open(&output).unwrap();
        assert_eq!(wb.cell_text(3, 2).unwrap(), None);
    }

    #[tokio::test]
    async fn interrupt_before_the_first_row_flushes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture_with_images(dir.path(), &[2]);
        let output = dir.path().join("out.xlsx");
        let engine = MockEngine::always(candidate());
        let interrupt = Interrupt::default();
        interrupt.trigger();

        scan_workbook(
            &source,
            &output,
            &MockProvider::empty(),
            &engine,
            &[2],
            SaveMode::AtEnd,
            &interrupt,
        )
        .await
        .unwrap();

        let flushed = dir.path().join("out_interrupted.xlsx");
        let wb = Workbook::open(&flushed).unwrap();
        assert_eq!(wb.cell_text(2, 1).unwrap().as_deref(), Some("Product Name"));
        assert_eq!(wb.cell_text(2, 2).unwrap(), None);
    }
}
