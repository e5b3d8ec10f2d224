pub mod cache;
pub mod client;
pub mod distance;
pub mod domain;
pub mod error;
pub mod fanout;
pub mod maps;
pub mod orchestrator;
pub mod palette;
pub mod parse;
pub mod ports;
pub mod prompts;
pub mod request;
pub mod retry;
pub mod runner;
pub mod store;
pub mod verify;

pub use domain::{
    Approvals, FinalizedGuide, Job, JobStatus, MealType, PipelineOutcome, ReplaceRequest,
    ReviewSession, ScoutCategory, ScoutItem, TravellerProfile, TripRecord,
};
pub use error::PipelineError;
pub use orchestrator::{PipelineOrchestrator, PipelineSettings};
pub use ports::{
    KeyValueStore, MapImage, MapImageService, PlaceMatch, PlacesService, PortError, PortResult,
    ProfileService, TextModelService, TripRepository,
};
pub use request::{SectionInput, TripRequest};
