pub mod mesh;
pub mod profile;
pub mod surface;

pub use mesh::{SurfaceVertex, TriangleMesh};
pub use profile::ProfileCurve;
pub use surface::{GeometryError, RevolutionSurface};
