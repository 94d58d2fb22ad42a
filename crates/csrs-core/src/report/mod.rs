pub mod export;
pub mod grid;
pub mod layout;
pub mod scaffold;
pub mod template;

pub use export::{export_workbook, render_workbook};
pub use grid::{CellRef, CellValue, CellWrite, ReportGrid, Sheet};
pub use layout::{
    load_layout, load_layout_preset, parse_layout, parse_layout_str, validate_layout,
    ReportLayout, DEFAULT_LAYOUT, LAYOUT_PRESETS,
};
pub use scaffold::scaffold;
pub use template::{load_template, load_template_file};
