pub mod config;
pub mod identifiers;
pub mod matching;
pub mod payload;
pub mod reference;
pub mod testing;
pub mod transport;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, CONFIG_ENV_PREFIX,
};
pub use identifiers::{FolderPath, Identifier};
pub use matching::{
    FolderMatch, MatchRequest, MatchedImage, MatchedPoint, MatchingApi, MatchingMatrix, Point,
    TopomatchClient,
};
pub use payload::{EncodedImage, ImageUpload};
pub use reference::{CragRecord, NewCrag, NewRegion, ReferenceImage};
pub use transport::{
    progress_channel, ApiError, BinaryResponse, Call, MatchResult, ProgressEvent,
    ProgressReceiver, ProgressReporter, RequestBody, ResponseKind, Transport,
};
