use crate::error::FetchError;
use crate::model::TrackDescriptor;

pub fn parse(path: &str, bytes: &[u8]) -> Result<Vec<TrackDescriptor>, FetchError> {
    let tracks: Vec<TrackDescriptor> =
        serde_json::from_slice(bytes).map_err(|err| FetchError::Parse {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
    if tracks.is_empty() {
        return Err(FetchError::EmptyManifest(path.to_string()));
    }
    Ok(tracks)
}
