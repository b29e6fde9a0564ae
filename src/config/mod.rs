pub mod builtin;
pub mod error;
pub mod templates_file;

pub use builtin::builtin_flow_templates;
pub use error::ConfigError;
pub use templates_file::{FlowTemplate, FlowTemplateFile, TemplateStep};
