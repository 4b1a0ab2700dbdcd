use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod api;

/// Local OCR microservice: wraps a text-recognition backend behind
/// `POST /api/v1/ocr/recognize`.
#[derive(Debug, Parser)]
#[command(name = "shelfscan-server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: String,

    /// Recognition languages (Tesseract lang string).
    #[arg(long, default_value = "chi_sim+eng")]
    lang: String,

    /// Tesseract data directory (defaults to the system install).
    #[arg(long)]
    tessdata: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    #[cfg(feature = "tesseract")]
    let backend: api::SharedBackend = {
        use shelfscan_ocr::recognizer::tesseract_backend::TesseractRecognizer;
        tracing::info!(lang = %args.lang, "using Tesseract backend");
        Arc::new(TesseractRecognizer::new(args.tessdata.clone(), &args.lang))
    };

    #[cfg(not(feature = "tesseract"))]
    let backend: api::SharedBackend = {
        tracing::warn!(
            "built without the `tesseract` feature; serving the mock recognizer, \
             which returns empty text"
        );
        Arc::new(shelfscan_ocr::MockRecognizer::new(""))
    };

    let app = api::router(backend);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!("OCR service listening on {}", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
