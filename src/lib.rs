pub mod session_core;

pub use session_core::auth::{
    ImplicitCallback, RedirectInstruction, begin_implicit_login, complete_implicit_login,
};
pub use session_core::http_client::{
    HttpClient, HttpClientError, HttpRequest, HttpResponse, InMemoryHttpClient, ReqwestHttpClient,
};
pub use session_core::location::{LocationProvider, NoopLocation, StaticLocation};
pub use session_core::pipeline::{REQUEST_TIMEOUT, RequestPipeline};
pub use session_core::session::PureCloudSession;
pub use session_core::storage::{
    FileStore, InMemoryStore, NoopStore, PersistentStore, TokenStore,
};
pub use session_core::types::{
    AuthError, AuthStrategy, ConfigError, HttpError, Method, SessionConfig, SessionError,
};
