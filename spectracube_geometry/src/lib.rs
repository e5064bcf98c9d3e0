//! Geometry kernel: from a 2-D vector geometry in Cartesian image
//! coordinates to a Boolean pixel mask in matrix coordinates.
//!
//! Query geometries arrive in Cartesian image coordinates (origin at the
//! bottom-left corner, Y growing upward); the cube is indexed in matrix
//! coordinates (origin at the top-left corner, rows growing downward). This
//! crate performs the change of basis, clips to the image rectangle,
//! rasterizes the result to a mask and derives bounding boxes and Cartesian
//! point indexes from masks.

mod mask;
mod prepare;
mod rasterize;
mod referential;

pub use mask::*;
pub use prepare::*;
pub use rasterize::*;
pub use referential::*;
