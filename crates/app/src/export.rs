use crate::cli::ExportArgs;
use anyhow::Context;
use shelfscan_sheet::{export_products, Workbook};
use std::path::PathBuf;

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    let output = args.output.unwrap_or_else(|| default_json_name(&args.file));
    let workbook = Workbook::open_sheet(&args.file, args.sheet.as_deref())?;
    let document = export_products(&workbook)?;

    let text = if args.compact {
        serde_json::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    std::fs::write(&output, text)
        .with_context(|| format!("writing {}", output.display()))?;

    let count = document["products"].as_array().map(Vec::len).unwrap_or(0);
    tracing::info!(output = %output.display(), products = count, "export complete");
    Ok(())
}

fn default_json_name(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "products".to_string());
    PathBuf::from(format!("{stem}.json"))
}
