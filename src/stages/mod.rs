pub mod stage0_validate;
pub mod stage1_normalize;
pub mod stage2_enhance;
pub mod stage3_render;
pub mod stage4_compile;
pub mod stage5_collate;

pub use stage0_validate::*;
pub use stage1_normalize::*;
pub use stage2_enhance::*;
pub use stage3_render::*;
pub use stage4_compile::*;
pub use stage5_collate::*;
