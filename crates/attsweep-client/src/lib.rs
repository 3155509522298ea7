pub mod http;
pub mod mock;
pub mod traits;
pub mod types;

pub use http::HttpClient;
pub use mock::MockClient;
pub use traits::{ClientError, TrackerClient};
pub use types::{RemoteAttachment, RemoteComment, RemoteIssue, RemoteProject};
