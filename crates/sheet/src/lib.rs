pub mod coord;
pub mod export;
pub mod workbook;

pub use coord::{column_letters, parse_a1};
pub use export::export_products;
pub use workbook::{copy_file, SheetError, SheetImage, Workbook};
