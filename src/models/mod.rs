pub mod enhancement;
pub mod resume;
pub mod template;

pub use enhancement::*;
pub use resume::*;
pub use template::*;
