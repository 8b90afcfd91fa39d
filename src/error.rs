//! Error types shared by the layout engine, the bridge and the data supplier.

/// Fatal problems with a graph snapshot, detected before any layout runs.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
	/// A link names a node id that is not part of the snapshot.
	#[error("link {link} references unknown node id `{id}`")]
	MissingEndpoint { link: usize, id: String },
	/// Two nodes share the same id.
	#[error("duplicate node id `{id}`")]
	DuplicateNode { id: String },
	/// A link strength that is not a finite positive number.
	#[error("link {link} has invalid strength {strength}")]
	InvalidStrength { link: usize, strength: f64 },
}

/// Failures of the graph data supplier. Always recovered by the host.
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
	#[error("request to {url} failed: {reason}")]
	Http { url: String, reason: String },
	#[error("{url} answered with status {status}")]
	Status { url: String, status: u16 },
	#[error("could not decode response from {url}: {source}")]
	Decode {
		url: String,
		#[source]
		source: serde_json::Error,
	},
	#[error("request to {url} timed out after {ms} ms")]
	Timeout { url: String, ms: u32 },
}

/// A surface setting outside the range the layout or viewport can work with.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
	#[error("`{field}` must be {expected}, got {value}")]
	OutOfRange {
		field: &'static str,
		expected: &'static str,
		value: f64,
	},
	#[error("zoom range [{min}, {max}] is empty")]
	EmptyZoomRange { min: f64, max: f64 },
}

/// Problems encoding or decoding text that crosses the host/surface boundary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
	#[error("malformed bridge payload: {0}")]
	Decode(#[source] serde_json::Error),
	#[error("could not encode bridge payload: {0}")]
	Encode(#[source] serde_json::Error),
	#[error("boot payload protocol version {found} is not supported (expected {expected})")]
	VersionMismatch { expected: u32, found: u32 },
	#[error("boot payload carries an unusable config: {0}")]
	InvalidConfig(#[from] ConfigError),
}

/// Why a graph view could not produce a boot payload.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
	#[error(transparent)]
	Layout(#[from] LayoutError),
	#[error(transparent)]
	Bridge(#[from] BridgeError),
}
