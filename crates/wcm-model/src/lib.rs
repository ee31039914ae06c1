pub mod error;
pub mod ids;
pub mod normalize;
pub mod options;
pub mod search;

pub use error::{MapperError, Result, ValidationError};
pub use ids::{ColumnId, TableName, UNKNOWN_TABLE, Word};
pub use normalize::{WORD_DELIMITER, is_delimiter, normalize};
pub use options::{EditDistancePolicy, SearchOptions};
pub use search::{MatchType, SearchResponse, SearchResult, SetOperation, SetOperationResult};
