use crate::error::{SimError, SimResult};
use crate::traits::{Entity, FromConfig};
use serde_json::Value;

pub mod dispatcher;
pub mod fog_node;
pub mod sensor;
pub mod storage;

macro_rules! register_components {
    ($($kind:literal => $type:ty),* $(,)?) => {
        /// Build an entity from its kind and JSON config. A `null` config
        /// means "all defaults".
        pub fn create_component(kind: &str, name: &str, data: Value) -> SimResult<Box<dyn Entity>> {
            match kind {
                $(
                    $kind => {
                        let config: <$type as FromConfig>::Config = if data.is_null() {
                            Default::default()
                        } else {
                            serde_json::from_value(data)?
                        };
                        <$type as FromConfig>::validate(&config)?;
                        Ok(Box::new(<$type as FromConfig>::with_config(name, config)))
                    }
                )*
                _ => Err(SimError::UnknownComponent(kind.to_string())),
            }
        }

        pub fn component_kinds() -> &'static [&'static str] {
            &[$($kind),*]
        }
    };
}

register_components!(
    "Sensor" => sensor::Sensor,
    "FogNode" => fog_node::FogNode,
    "CloudStorage" => storage::CloudStorage,
    "Dispatcher" => dispatcher::Dispatcher,
);

/// Reject negative or non-finite config values.
pub(crate) fn check_quantity(kind: &str, field: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidScenario(format!(
            "{kind}.{field} must be a finite non-negative number, got {value}"
        )))
    }
}
