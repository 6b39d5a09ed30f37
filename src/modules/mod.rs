//! Extension module commands
//!
//! One file per server extension. Each command method only assembles its
//! argument list, goes through `ModuleClient::execute` and, when the command's
//! reply is a key/value stream, through the normalizer.

/// Constructors and connection lifecycle shared by every module type
macro_rules! module_client {
    ($module:ident, $name:literal) => {
        impl $module {
            /// Name used in error messages
            pub const NAME: &'static str = $name;

            /// Create the module over TCP transports for `target`
            pub fn new(
                target: $crate::module::ConnectionTarget,
                options: $crate::module::ModuleOptions,
            ) -> Self {
                $module {
                    client: $crate::module::ModuleClient::new($name, target, options),
                }
            }

            /// Wrap an existing client
            pub fn with_client(client: $crate::module::ModuleClient) -> Self {
                $module { client }
            }

            /// Underlying client, for commands without a dedicated method
            pub fn client(&self) -> &$crate::module::ModuleClient {
                &self.client
            }

            pub async fn connect(&mut self) -> $crate::module::ModuleResult<()> {
                self.client.connect().await
            }

            pub async fn disconnect(&mut self) -> $crate::module::ModuleResult<()> {
                self.client.disconnect().await
            }
        }
    };
}

mod json;
mod graph;
mod bloom;
mod timeseries;
mod search;

pub use json::{ReJson, SetCondition};
pub use graph::{RedisGraph, cypher_query};
pub use bloom::{RedisBloom, ReserveOptions};
pub use timeseries::{RedisTimeSeries, CreateOptions, DuplicatePolicy};
pub use search::RediSearch;
