pub mod apply;
pub mod palette;
pub mod seed;
pub mod simulate;

pub use apply::{apply, ApplyArgs};
pub use palette::{palette, PaletteArgs};
pub use seed::{seed, SeedArgs};
pub use simulate::{simulate, SimulateArgs};
