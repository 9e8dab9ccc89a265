pub mod geometry;
pub mod templates;

pub use geometry::{Inset, LayoutDimensions};
pub use templates::{PanelKind, PanelStyle, TemplateKind, TemplateRegistry};
