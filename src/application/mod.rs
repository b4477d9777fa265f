// Application layer: use cases and service orchestration

pub mod sourcing_service;

#[cfg(feature = "server")]
pub mod grpc_service;
#[cfg(feature = "server")]
pub mod mappers;

pub use sourcing_service::SourcingService;

#[cfg(feature = "server")]
pub use grpc_service::GrpcSourcingService;
