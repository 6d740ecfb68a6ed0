pub mod assets;
pub mod loader;
pub mod writer;

pub use assets::{decode_texture, TextureData};
pub use loader::{SceneDescriptionLoader, DEFAULT_SCENE_NAME, ERROR_SCENE_NAME};
pub use writer::SceneWriter;
