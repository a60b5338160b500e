// ── Domain model ──
//
// Canonical types that consumers depend on. Every field has already been
// through the tolerant coercions in `convert`, so nothing here carries raw
// device JSON except the explicit passthrough metadata.

pub mod mode;
pub mod status;

pub use mode::{HeatingState, Mode, Units};
pub use status::{DEFAULT_HOLD_TEMP_F, RecipeInfo, Relays, Status, format_hms, is_grill_label};
