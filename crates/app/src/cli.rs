use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use shelfscan_lookup::{AliMarketProvider, GdsProvider, MxnzpProvider, ProductProvider, TianApiProvider};
use std::path::{Path, PathBuf};

use crate::writer::SaveMode;

#[derive(Debug, Parser)]
#[command(
    name = "shelfscan",
    version,
    about = "Extract barcodes and images from spreadsheets, enrich rows via product-lookup APIs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode barcode images embedded in a spreadsheet and append product info.
    Scan(ScanArgs),
    /// Look up barcodes already present as text in a spreadsheet column.
    Query(QueryArgs),
    /// Run OCR on embedded images and fill paired result columns.
    Ocr(OcrArgs),
    /// Export the spreadsheet as a {"products": [...]} JSON document.
    ExportJson(ExportArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Spreadsheet containing barcode images.
    pub file: PathBuf,

    /// 1-based column numbers holding barcode images.
    #[arg(long, num_args = 1.., required = true, value_name = "COL")]
    pub image_cols: Vec<u32>,

    #[command(flatten)]
    pub provider: ProviderOpts,

    /// Output file (default: "<provider>_scan_<input name>" in the working directory).
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = SaveMode::AtEnd)]
    pub save_mode: SaveMode,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Spreadsheet containing barcode text.
    pub file: PathBuf,

    /// 1-based column number holding barcode digits.
    #[arg(long, value_name = "COL")]
    pub barcode_col: u32,

    /// First row to process (row 1 is assumed to be the header).
    #[arg(long, default_value_t = 2)]
    pub start_row: u32,

    #[command(flatten)]
    pub provider: ProviderOpts,

    /// Output file (default: "<provider>_query_<input name>" in the working directory).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Saving after every row survives crashes; buffering is much faster.
    #[arg(long, value_enum, default_value_t = SaveMode::EveryRow)]
    pub save_mode: SaveMode,
}

#[derive(Debug, Args)]
pub struct OcrArgs {
    /// Spreadsheet containing images to recognize.
    pub file: PathBuf,

    /// 1-based column numbers holding images.
    #[arg(long, num_args = 1.., required = true, value_name = "COL")]
    pub image_cols: Vec<u32>,

    /// 1-based column numbers to write text into; paired with --image-cols.
    #[arg(long, num_args = 1.., required = true, value_name = "COL")]
    pub result_cols: Vec<u32>,

    /// OCR service endpoint.
    #[arg(long, default_value = shelfscan_ocr::remote::DEFAULT_ENDPOINT)]
    pub api_url: String,

    /// Output file (default: "ocr_<input name>" in the working directory).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Spreadsheet to export.
    pub file: PathBuf,

    /// Output JSON path (default: input name with a .json extension).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Worksheet name (default: first sheet).
    #[arg(long)]
    pub sheet: Option<String>,

    /// Emit compact JSON instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct ProviderOpts {
    /// Product-lookup API to use.
    #[arg(long, value_enum)]
    pub provider: ProviderKind,

    /// GDS bearer token.
    #[arg(long)]
    pub authorization_token: Option<String>,

    /// MXNZP app id.
    #[arg(long)]
    pub app_id: Option<String>,

    /// MXNZP app secret.
    #[arg(long)]
    pub app_secret: Option<String>,

    /// TianAPI key.
    #[arg(long)]
    pub tianapi_key: Option<String>,

    /// Aliyun marketplace app code.
    #[arg(long)]
    pub appcode: Option<String>,

    /// Override the provider's endpoint.
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Gds,
    Mxnzp,
    Tianapi,
    Alimarket,
}

pub fn build_provider(opts: &ProviderOpts) -> anyhow::Result<Box<dyn ProductProvider>> {
    let api_url = opts.api_url.clone();
    match opts.provider {
        ProviderKind::Gds => {
            let token = opts
                .authorization_token
                .clone()
                .context("--authorization-token is required for --provider gds")?;
            Ok(Box::new(GdsProvider::new(token, api_url)))
        }
        ProviderKind::Mxnzp => {
            let app_id = opts.app_id.clone().context("--app-id is required for --provider mxnzp")?;
            let app_secret = opts
                .app_secret
                .clone()
                .context("--app-secret is required for --provider mxnzp")?;
            Ok(Box::new(MxnzpProvider::new(app_id, app_secret, api_url)))
        }
        ProviderKind::Tianapi => {
            let key = opts
                .tianapi_key
                .clone()
                .context("--tianapi-key is required for --provider tianapi")?;
            Ok(Box::new(TianApiProvider::new(key, api_url)))
        }
        ProviderKind::Alimarket => {
            let appcode =
                opts.appcode.clone().context("--appcode is required for --provider alimarket")?;
            Ok(Box::new(AliMarketProvider::new(appcode, api_url)))
        }
    }
}

/// Default output path: the input file name with a prefix, in the working
/// directory; the source file is never written to.
pub fn default_output_name(input: &Path, prefix: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.xlsx".to_string());
    PathBuf::from(format!("{prefix}{name}"))
}
