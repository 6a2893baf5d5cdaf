//! Value types for light control parameters.

mod brightness;
mod color;
mod kelvin;
mod speed;

pub use brightness::Brightness;
pub use color::Color;
pub use kelvin::Kelvin;
pub use speed::Speed;
