use std::collections::HashMap;

use crate::error::{Error, Result};

/// Number of WMBs retained per processor timeline when nothing is configured.
pub const DEFAULT_TIMELINE_CAPACITY: usize = 10;

const ENV_WATERMARK_FROM_VERTEX: &str = "NUMAFLOW_WATERMARK_FROM_VERTEX";
const ENV_WATERMARK_TO_VERTEX: &str = "NUMAFLOW_WATERMARK_TO_VERTEX";
const ENV_WATERMARK_TIMELINE_CAPACITY: &str = "NUMAFLOW_WATERMARK_TIMELINE_CAPACITY";

/// Watermark configuration of a single edge, the edge is purely defined by the vertex writing to it
/// and the vertex reading from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeWatermarkConfig {
    pub edge_name: String,
    pub from_vertex: String,
    pub to_vertex: String,
    /// Max number of WMBs each processor timeline keeps.
    pub timeline_capacity: usize,
}

impl Default for EdgeWatermarkConfig {
    fn default() -> Self {
        EdgeWatermarkConfig {
            edge_name: "in-out".to_string(),
            from_vertex: "in".to_string(),
            to_vertex: "out".to_string(),
            timeline_capacity: DEFAULT_TIMELINE_CAPACITY,
        }
    }
}

impl EdgeWatermarkConfig {
    pub fn new(from_vertex: impl Into<String>, to_vertex: impl Into<String>) -> Self {
        let from_vertex = from_vertex.into();
        let to_vertex = to_vertex.into();
        EdgeWatermarkConfig {
            edge_name: format!("{from_vertex}-{to_vertex}"),
            from_vertex,
            to_vertex,
            timeline_capacity: DEFAULT_TIMELINE_CAPACITY,
        }
    }

    /// Loads the edge config from the environment variables.
    pub fn load(
        env_vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Result<Self> {
        let env_vars: HashMap<String, String> = env_vars
            .into_iter()
            .map(|(key, val)| (key.into(), val.into()))
            .filter(|(key, _val)| {
                [
                    ENV_WATERMARK_FROM_VERTEX,
                    ENV_WATERMARK_TO_VERTEX,
                    ENV_WATERMARK_TIMELINE_CAPACITY,
                ]
                .contains(&key.as_str())
            })
            .collect();

        let get_var = |var: &str| -> Result<String> {
            Ok(env_vars
                .get(var)
                .ok_or_else(|| Error::Config(format!("Environment variable {var} is not set")))?
                .to_string())
        };

        let timeline_capacity = match get_var(ENV_WATERMARK_TIMELINE_CAPACITY) {
            Ok(capacity) => capacity.parse::<usize>().map_err(|e| {
                Error::Config(format!(
                    "Invalid {ENV_WATERMARK_TIMELINE_CAPACITY} {capacity:?}: {e}"
                ))
            })?,
            Err(_) => DEFAULT_TIMELINE_CAPACITY,
        };
        if timeline_capacity == 0 {
            return Err(Error::Config(format!(
                "{ENV_WATERMARK_TIMELINE_CAPACITY} should be at least 1"
            )));
        }

        let mut config = Self::new(
            get_var(ENV_WATERMARK_FROM_VERTEX)?,
            get_var(ENV_WATERMARK_TO_VERTEX)?,
        );
        config.timeline_capacity = timeline_capacity;
        Ok(config)
    }
}
