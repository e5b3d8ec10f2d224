pub mod db;
pub mod places;
pub mod scout_llm;
pub mod static_map;

pub use db::DbAdapter;
pub use places::GooglePlacesAdapter;
pub use scout_llm::OpenAiScoutAdapter;
pub use static_map::HttpMapImageAdapter;
