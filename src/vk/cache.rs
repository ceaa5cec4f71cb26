//! Raw metadata persistence — the fetched `photos.get` items are written
//! verbatim to a JSON file after every fetch, and `--from-cache` replays a
//! run from that file without touching the network.

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use super::VkError;

/// Write the raw items array to `path`, replacing any previous contents.
pub fn save_metadata(path: &Path, items: &[Value]) -> Result<(), VkError> {
    let file = File::create(path)?;
    serde_json::to_writer(file, items)?;
    Ok(())
}

/// Load a previously saved items array.
pub fn load_metadata(path: &Path) -> Result<Vec<Value>, VkError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
