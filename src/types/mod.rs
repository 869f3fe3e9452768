//! Value types for light control parameters.

mod brightness;
mod mirek;
mod xy;

pub use brightness::Brightness;
pub use mirek::{Mirek, MirekRange};
pub use xy::Xy;
