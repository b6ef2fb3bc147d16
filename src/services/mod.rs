/// Race-to-ring assignment workflow.
pub mod assignment_engine;
/// Request-level glue between the assignment routes and the engine.
pub mod assignment_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Ordered, fire-and-forget delivery of assignment changes.
pub mod notification;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Tournament catalog management and seeding.
pub mod tournament_service;
