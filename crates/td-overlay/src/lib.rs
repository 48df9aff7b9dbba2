//! Compiles telemetry, GPS, and privacy data into burned-in overlay assets: an ASS dashboard,
//! an ASS minimap, an ASS timestamp caption, and rasterized blur-zone masks (§4.5.4, §4.5.5).

mod ass;
mod blur;
mod dashboard;
mod error;
mod minimap;
mod shapes;
mod timestamp;
mod translate;

pub use ass::{format_time, rgb_to_ass_color, AssDocument, Event, Style};
pub use blur::rasterize_blur_mask;
pub use dashboard::{compile_dashboard, DashboardOptions};
pub use error::{OverlayError, OverlayResult};
pub use minimap::{compile_minimap, MinimapOptions};
pub use timestamp::{compile_timestamp, TimestampOptions};
pub use translate::{BuiltinTranslator, Label, Translator};
