//! unistroke-export: Pure format serializers (sans-IO)
//!
//! Converts a unified path into output formats: SVG for previewing,
//! Etch-A-Sketch command JSON for the emulator, and THR for polar sand
//! tables.

pub mod etch;
pub mod svg;
pub mod thr;

pub use etch::{
    EtchCommand, EtchCommandFile, EtchOptions, ExportError, to_etch_commands, to_etch_json,
};
pub use svg::{SvgMetadata, build_path_data, to_diagnostic_svg, to_svg};
pub use thr::{PolarFrame, ThrMetadata, to_thr};
