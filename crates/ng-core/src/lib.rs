pub mod error;
pub mod field;
pub mod fields;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;
pub mod port;
pub mod record;

pub use error::{FieldError, GraphError};
pub use field::{Field, FieldControl, FieldRecord, FieldRegistry, FieldValue, Widget};
pub use fields::{
    ButtonField, CheckboxField, ColorField, DecimalField, IntegerField, SelectField, TextField,
};
pub use geometry::{BezierPath, Point, Rect};
pub use id::{NodeId, NodeType};
pub use layout::NodeMetrics;
pub use model::*;
pub use port::{Port, PortDirection, PortRef};
pub use record::{ConnectionRecord, GraphRecord, NodeRecord, ViewportRecord};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::{EdgeIndex, NodeIndex};
