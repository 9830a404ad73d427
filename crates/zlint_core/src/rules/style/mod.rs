mod case_convention;
mod line_length;
mod unused_decls;

pub use case_convention::CaseConvention;
pub use line_length::LineLength;
pub use unused_decls::UnusedDecls;
