/// WGSL shader for textured planes lit by the scene's point light.
pub const PLANE_LIT_SHADER: &str = include_str!("shaders/plane_lit.wgsl");

/// WGSL shader for planes displaced along their normal by a height map.
pub const PLANE_DISPLACED_SHADER: &str = include_str!("shaders/plane_displaced.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";
