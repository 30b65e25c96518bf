//! Container engine adapters.

mod docker_compose;

pub use docker_compose::{DEFAULT_DOCKER_PROGRAM, DockerComposeEngine};
