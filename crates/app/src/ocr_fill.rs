use crate::cli::{default_output_name, OcrArgs};
use anyhow::bail;
use shelfscan_ocr::{OcrError, Recognition, RemoteOcr};
use shelfscan_sheet::Workbook;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

pub async fn run(args: OcrArgs) -> anyhow::Result<()> {
    let output = args.output.unwrap_or_else(|| default_output_name(&args.file, "ocr_"));
    let remote = RemoteOcr::new(args.api_url);
    fill_workbook(&args.file, &output, &args.image_cols, &args.result_cols, |bytes| {
        let remote = &remote;
        async move { remote.recognize(&bytes).await }
    })
    .await
}

/// Recognize every image anchored in `image_cols` and write the text into the
/// paired `result_cols` column on the image's row, saving a copy of `source`.
///
/// An engine failure writes an empty cell (the image was seen, nothing was
/// read); a transport or decode failure leaves the cell untouched so a re-run
/// against a healthy service can fill it in.
pub async fn fill_workbook<F, Fut>(
    source: &Path,
    output: &Path,
    image_cols: &[u32],
    result_cols: &[u32],
    recognize: F,
) -> anyhow::Result<()>
where
    F: Fn(Vec<u8>) -> Fut,
    Fut: Future<Output = Result<Recognition, OcrError>>,
{
    if image_cols.len() != result_cols.len() {
        bail!(
            "--image-cols and --result-cols must pair up ({} vs {})",
            image_cols.len(),
            result_cols.len()
        );
    }
    let targets: HashMap<u32, u32> =
        image_cols.iter().copied().zip(result_cols.iter().copied()).collect();

    shelfscan_sheet::copy_file(source, output)?;
    let mut workbook = Workbook::open(output)?;
    let mut images: Vec<_> = workbook
        .images()?
        .into_iter()
        .filter(|img| targets.contains_key(&img.col))
        .collect();
    images.sort_by_key(|img| (img.col, img.row));
    tracing::info!(count = images.len(), "recognizing embedded images");

    for img in images {
        let result_col = targets[&img.col];
        match recognize(img.bytes).await {
            Ok(recognition) => {
                tracing::debug!(
                    row = img.row,
                    words = recognition.words,
                    confidence = recognition.confidence,
                    "recognized"
                );
                workbook.set_cell(result_col, img.row, &recognition.text)?;
            }
            Err(OcrError::Engine(reason)) => {
                tracing::warn!(row = img.row, %reason, "recognition failed");
                workbook.set_cell(result_col, img.row, "")?;
            }
            Err(e) => {
                tracing::warn!(row = img.row, error = %e, "skipping image");
            }
        }
    }

    workbook.save()?;
    tracing::info!(output = %output.display(), "ocr fill complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(dir: &Path) -> PathBuf {
        let png = dir.join("label.png");
        image::DynamicImage::ImageLuma8(image::ImageBuffer::from_fn(8, 8, |_, _| {
            image::Luma([90u8])
        }))
        .save(&png)
        .unwrap();

        let path = dir.join("labels.xlsx");
        let mut wb = Workbook::create(&path);
        wb.set_cell(1, 1, "label").unwrap();
        wb.set_cell(2, 1, "text").unwrap();
        wb.add_image(1, 2, &png).unwrap();
        wb.add_image(1, 3, &png).unwrap();
        wb.save().unwrap();
        path
    }

    #[tokio::test]
    async fn recognized_text_lands_in_the_paired_column() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(dir.path());
        let output = dir.path().join("out.xlsx");

        fill_workbook(&source, &output, &[1], &[2], |_| async {
            Ok(Recognition::new("fresh milk 1L", 0.9))
        })
        .await
        .unwrap();

        let wb = Workbook::open(&output).unwrap();
        assert_eq!(wb.cell_text(2, 2).unwrap().as_deref(), Some("fresh milk 1L"));
        assert_eq!(wb.cell_text(2, 3).unwrap().as_deref(), Some("fresh milk 1L"));
    }

    #[tokio::test]
    async fn engine_failure_blanks_the_cell_transport_failure_skips_it() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(dir.path());
        let output = dir.path().join("out.xlsx");

        // Seed stale text so overwrite and leave-alone are distinguishable.
        let mut seeded = Workbook::open(&source).unwrap();
        seeded.set_cell(2, 2, "stale row 2").unwrap();
        seeded.set_cell(2, 3, "stale row 3").unwrap();
        seeded.save().unwrap();

        let calls = std::sync::atomic::AtomicUsize::new(0);
        fill_workbook(&source, &output, &[1], &[2], |_| {
            let n = calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(OcrError::Engine("nothing recognized".to_string()))
                } else {
                    Err(OcrError::Http("connection refused".to_string()))
                }
            }
        })
        .await
        .unwrap();

        let wb = Workbook::open(&output).unwrap();
        // Engine failure: the stale text is overwritten with blank.
        assert_eq!(wb.cell_text(2, 2).unwrap(), None);
        // Transport failure: the cell is left untouched for a re-run.
        assert_eq!(wb.cell_text(2, 3).unwrap().as_deref(), Some("stale row 3"));
    }

    #[tokio::test]
    async fn mismatched_column_pairing_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(dir.path());
        let output = dir.path().join("out.xlsx");

        let err = fill_workbook(&source, &output, &[1, 3], &[2], |_| async {
            Ok(Recognition::new("", 0.0))
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("pair up"));
    }
}
