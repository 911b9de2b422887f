//! The bootstrap pipeline: resolve sources, load field mappings, assemble the model.

pub mod config_fan_out;
pub mod mapper;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod serializer;

pub use config_fan_out::ConfigFanOutAssembler;
pub use mapper::{build_field_mapping, MappingShape};
pub use model::ModelAssembler;
pub use orchestrator::{Bootstrap, Bootstrapper};
pub use resolver::SourceResolver;
pub use serializer::{
    DeputyFieldMappings, DeputySerializer, MappingTarget, PassThroughSerializer,
    ProfileFieldMappings, ProfileSerializer, RecordSerializer, SerializerMappings,
};
