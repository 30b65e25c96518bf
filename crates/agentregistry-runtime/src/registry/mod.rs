//! MCP registry manifests and their conversion into the resource model.

mod convert;
mod manifest;

pub use convert::{
    ConversionError, McpServerRunRequest, NPM_IMAGE, PYPI_IMAGE, PackageDecoder, PackageLaunch,
    RegistryTranslator, service_name,
};
pub use manifest::{
    Argument, ArgumentType, EnvironmentVariable, Package, Remote, Repository, ServerJson,
    Transport,
};
