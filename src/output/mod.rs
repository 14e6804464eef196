pub mod formatter;

pub use formatter::{
    format_breakdown_table, format_envelope, format_factor_table, format_number, format_result,
    should_use_colors,
};
