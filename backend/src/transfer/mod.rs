//! CSV transfer entry points: import (file gate, decode, per-row insertion)
//! and export (encode, filename and MIME conventions, injected sink).

pub mod export;
pub mod import;

pub use export::{
    export_csv, export_filename, export_sample, sample_filename, DirSink, ExportSink, MemorySink,
    CSV_MIME,
};
pub use import::{decode_upload_bytes, import_csv, parse_import};
